use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::media;
use crate::models::{NewRecipeIngredient, NewRecipeTag, Recipe};
use crate::schema::{ingredients, recipe_ingredients, recipe_tags, recipes, tags};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::create::dedup_tags;
use super::responses::{build_recipe_response, RecipeResponse};
use super::validate::{check_cooking_time, check_ingredients, check_tags, IngredientAmount};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateRecipeRequest {
    pub name: String,
    /// Recipe description
    pub text: String,
    /// Base64 image payload; omit to keep the current image
    pub image: Option<String>,
    /// Cooking time in minutes, 1 to 1440
    pub cooking_time: i32,
    pub tags: Vec<Uuid>,
    pub ingredients: Vec<IngredientAmount>,
}

#[utoipa::path(
    patch,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    request_body = UpdateRecipeRequest,
    responses(
        (status = 200, description = "Recipe updated successfully", body = RecipeResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not the recipe author", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateRecipeRequest>,
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

    let recipe: Recipe = match recipes::table
        .find(id)
        .select(Recipe::as_select())
        .first(&mut conn)
    {
        Ok(r) => r,
        Err(diesel::NotFound) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Recipe not found".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to fetch recipe: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch recipe".to_string(),
                }),
            )
                .into_response();
        }
    };

    if recipe.author_id != Some(user.id) {
        return (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: "Only the author may modify this recipe".to_string(),
            }),
        )
            .into_response();
    }

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
                    error: "Failed to update recipe".to_string(),
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
                    error: "Failed to update recipe".to_string(),
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

    let image_path = match request.image.as_deref() {
        Some(payload) => {
            let decoded = match media::parse_image_payload(payload) {
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
            match media::save_recipe_image(&decoded) {
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
            }
        }
        None => recipe.image.clone(),
    };

    // Full replace of the link rows inside one transaction: the old sets are
    // deleted and recreated from the payload, never diffed.
    let result: Result<Recipe, diesel::result::Error> = conn.transaction(|conn| {
        diesel::delete(recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(id)))
            .execute(conn)?;
        diesel::delete(recipe_tags::table.filter(recipe_tags::recipe_id.eq(id))).execute(conn)?;

        let ingredient_links: Vec<NewRecipeIngredient> = request
            .ingredients
            .iter()
            .map(|item| NewRecipeIngredient {
                recipe_id: id,
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
                recipe_id: id,
                tag_id,
            })
            .collect();

        diesel::insert_into(recipe_tags::table)
            .values(&tag_links)
            .execute(conn)?;

        diesel::update(recipes::table.find(id))
            .set((
                recipes::name.eq(&request.name),
                recipes::description.eq(&request.text),
                recipes::image.eq(&image_path),
                recipes::cooking_time.eq(request.cooking_time),
            ))
            .returning(Recipe::as_returning())
            .get_result(conn)
    });

    let updated = match result {
        Ok(recipe) => recipe,
        Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Ingredient missing".to_string(),
                }),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!("Failed to update recipe: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to update recipe".to_string(),
                }),
            )
                .into_response();
        }
    };

    match build_recipe_response(&mut conn, updated, Some(&user)) {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            tracing::error!("Failed to expand recipe: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to update recipe".to_string(),
                }),
            )
                .into_response()
        }
    }
}
