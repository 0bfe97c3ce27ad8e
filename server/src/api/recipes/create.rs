use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::media;
use crate::models::{NewRecipe, NewRecipeIngredient, NewRecipeTag, Recipe};
use crate::schema::{ingredients, recipe_ingredients, recipe_tags, recipes, tags};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::responses::{build_recipe_response, RecipeResponse};
use super::validate::{check_cooking_time, check_ingredients, check_tags, IngredientAmount};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateRecipeRequest {
    pub name: String,
    /// Recipe description
    pub text: String,
    /// Base64 image payload, with or without a data-URL prefix
    pub image: String,
    /// Cooking time in minutes, 1 to 1440
    pub cooking_time: i32,
    pub tags: Vec<Uuid>,
    pub ingredients: Vec<IngredientAmount>,
}

#[utoipa::path(
    post,
    path = "/api/recipes",
    tag = "recipes",
    request_body = CreateRecipeRequest,
    responses(
        (status = 201, description = "Recipe created successfully", body = RecipeResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Json(request): Json<CreateRecipeRequest>,
) -> impl IntoResponse {
    if request.name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Name cannot be empty".to_string(),
            }),
        )
            .into_response();
    }

    if let Err(message) = check_cooking_time(request.cooking_time) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: message.to_string(),
            }),
        )
            .into_response();
    }

    let mut conn = get_conn!(pool);

    let ingredient_ids: Vec<Uuid> = request.ingredients.iter().map(|i| i.id).collect();
    let known_ingredients: HashSet<Uuid> = match ingredients::table
        .filter(ingredients::id.eq_any(&ingredient_ids))
        .select(ingredients::id)
        .load::<Uuid>(&mut conn)
    {
        Ok(ids) => ids.into_iter().collect(),
        Err(e) => {
            tracing::error!("Failed to resolve ingredients: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to create recipe".to_string(),
                }),
            )
                .into_response();
        }
    };

    if let Err(message) = check_ingredients(&request.ingredients, &known_ingredients) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: message.to_string(),
            }),
        )
            .into_response();
    }

    let known_tags: HashSet<Uuid> = match tags::table
        .filter(tags::id.eq_any(&request.tags))
        .select(tags::id)
        .load::<Uuid>(&mut conn)
    {
        Ok(ids) => ids.into_iter().collect(),
        Err(e) => {
            tracing::error!("Failed to resolve tags: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to create recipe".to_string(),
                }),
            )
                .into_response();
        }
    };

    if let Err(message) = check_tags(&request.tags, &known_tags) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: message.to_string(),
            }),
        )
            .into_response();
    }

    let decoded = match media::parse_image_payload(&request.image) {
        Ok(d) => d,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    };

    let image_path = match media::save_recipe_image(&decoded) {
        Ok(p) => p,
        Err(e) => {
            tracing::error!("Failed to store recipe image: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to store image".to_string(),
                }),
            )
                .into_response();
        }
    };

    // One transaction for the recipe row and all its link rows: if anything
    // referenced at validation time vanished in the meantime, the whole
    // creation rolls back.
    let result: Result<Recipe, diesel::result::Error> = conn.transaction(|conn| {
        let new_recipe = NewRecipe {
            author_id: user.id,
            name: &request.name,
            description: &request.text,
            image: &image_path,
            cooking_time: request.cooking_time,
        };

        let recipe: Recipe = diesel::insert_into(recipes::table)
            .values(&new_recipe)
            .returning(Recipe::as_returning())
            .get_result(conn)?;

        let ingredient_links: Vec<NewRecipeIngredient> = request
            .ingredients
            .iter()
            .map(|item| NewRecipeIngredient {
                recipe_id: recipe.id,
                ingredient_id: item.id,
                amount: item.amount,
            })
            .collect();

        diesel::insert_into(recipe_ingredients::table)
            .values(&ingredient_links)
            .execute(conn)?;

        let tag_links: Vec<NewRecipeTag> = dedup_tags(&request.tags)
            .into_iter()
            .map(|tag_id| NewRecipeTag {
                recipe_id: recipe.id,
                tag_id,
            })
            .collect();

        diesel::insert_into(recipe_tags::table)
            .values(&tag_links)
            .execute(conn)?;

        Ok(recipe)
    });

    let recipe = match result {
        Ok(recipe) => recipe,
        Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)) => {
            // An ingredient or tag was deleted between validation and commit
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Ingredient missing".to_string(),
                }),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!("Failed to create recipe: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to create recipe".to_string(),
                }),
            )
                .into_response();
        }
    };

    match build_recipe_response(&mut conn, recipe, Some(&user)) {
        Ok(response) => (StatusCode::CREATED, Json(response)).into_response(),
        Err(e) => {
            tracing::error!("Failed to expand recipe: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to create recipe".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Tag lists may repeat an id; keep the first occurrence of each so the
/// unique (recipe, tag) constraint holds.
pub(super) fn dedup_tags(tag_ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::with_capacity(tag_ids.len());
    tag_ids
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_tags_keeps_first_occurrence() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(dedup_tags(&[a, b, a, b, a]), vec![a, b]);
    }

    #[test]
    fn test_dedup_tags_empty() {
        assert!(dedup_tags(&[]).is_empty());
    }
}
