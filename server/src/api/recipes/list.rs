use crate::api::{ErrorResponse, PaginationMetadata};
use crate::auth::MaybeAuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::Recipe;
use crate::schema::{cart_items, favorites, recipe_tags, recipes, tags};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum_extra::extract::Query;
use chrono::{DateTime, Utc};
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::responses::{build_recipe_responses, RecipeResponse};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListRecipesParams {
    /// Number of items to return (default: 20, max: 100)
    pub limit: Option<i64>,
    /// Number of items to skip (default: 0)
    pub offset: Option<i64>,
    /// Only recipes by this author
    pub author: Option<Uuid>,
    /// Tag slugs; repeatable, a recipe matches if it carries any of them
    #[serde(default)]
    pub tags: Vec<String>,
    /// Only recipes the requesting user has favorited. Ignored for
    /// anonymous requests.
    pub is_favorited: Option<bool>,
    /// Only recipes in the requesting user's shopping cart. Ignored for
    /// anonymous requests.
    pub is_in_shopping_cart: Option<bool>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListRecipesResponse {
    pub recipes: Vec<RecipeResponse>,
    pub pagination: PaginationMetadata,
}

// Type alias for query result row: recipe columns plus the window-function
// total count across all matching rows.
#[derive(Queryable)]
struct RecipeRow {
    id: Uuid,
    author_id: Option<Uuid>,
    name: String,
    description: String,
    image: String,
    cooking_time: i32,
    pub_date: DateTime<Utc>,
    total_count: i64,
}

#[utoipa::path(
    get,
    path = "/api/recipes",
    tag = "recipes",
    params(ListRecipesParams),
    responses(
        (status = 200, description = "Page of recipes, newest first", body = ListRecipesResponse),
    )
)]
pub async fn list_recipes(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(pool): State<Arc<DbPool>>,
    Query(params): Query<ListRecipesParams>,
) -> impl IntoResponse {
    let limit = params.limit.unwrap_or(20).clamp(1, 100);
    let offset = params.offset.unwrap_or(0).max(0);

    let mut conn = get_conn!(pool);

    let mut query = recipes::table.into_boxed();

    if let Some(author) = params.author {
        query = query.filter(recipes::author_id.eq(Some(author)));
    }

    if !params.tags.is_empty() {
        let tagged = recipe_tags::table
            .inner_join(tags::table)
            .filter(tags::slug.eq_any(&params.tags))
            .select(recipe_tags::recipe_id);
        query = query.filter(recipes::id.eq_any(tagged));
    }

    // Favorite/cart filters always scope to the requesting user and fall
    // away entirely for anonymous requests.
    if let Some(ref viewer) = viewer {
        if params.is_favorited == Some(true) {
            let favorited = favorites::table
                .filter(favorites::user_id.eq(viewer.id))
                .select(favorites::recipe_id);
            query = query.filter(recipes::id.eq_any(favorited));
        }
        if params.is_in_shopping_cart == Some(true) {
            let in_cart = cart_items::table
                .filter(cart_items::user_id.eq(viewer.id))
                .select(cart_items::recipe_id);
            query = query.filter(recipes::id.eq_any(in_cart));
        }
    }

    // Paginated results with total count using a window function:
    // COUNT(*) OVER() computes the total across all matching rows.
    let rows: Vec<RecipeRow> = match query
        .order((recipes::pub_date.desc(), recipes::id.desc()))
        .select((
            recipes::id,
            recipes::author_id,
            recipes::name,
            recipes::description,
            recipes::image,
            recipes::cooking_time,
            recipes::pub_date,
            sql::<BigInt>("COUNT(*) OVER()"),
        ))
        .limit(limit)
        .offset(offset)
        .load(&mut conn)
    {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Failed to fetch recipes: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch recipes".to_string(),
                }),
            )
                .into_response();
        }
    };

    let total = rows.first().map(|r| r.total_count).unwrap_or(0);

    let page: Vec<Recipe> = rows
        .into_iter()
        .map(|row| Recipe {
            id: row.id,
            author_id: row.author_id,
            name: row.name,
            description: row.description,
            image: row.image,
            cooking_time: row.cooking_time,
            pub_date: row.pub_date,
        })
        .collect();

    let recipes = match build_recipe_responses(&mut conn, page, viewer.as_ref()) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Failed to expand recipes: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch recipes".to_string(),
                }),
            )
                .into_response();
        }
    };

    (
        StatusCode::OK,
        Json(ListRecipesResponse {
            recipes,
            pagination: PaginationMetadata {
                total,
                limit,
                offset,
            },
        }),
    )
        .into_response()
}
