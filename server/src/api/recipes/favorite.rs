use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use super::relations::{add_relation, remove_relation, RecipeRelation, RelationError};
use super::responses::RecipeShortResponse;

#[utoipa::path(
    post,
    path = "/api/recipes/{id}/favorite",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 201, description = "Recipe added to favorites", body = RecipeShortResponse),
        (status = 400, description = "Recipe already added", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_favorite(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    match add_relation(&mut conn, RecipeRelation::Favorite, user.id, id) {
        Ok(recipe) => (
            StatusCode::CREATED,
            Json(RecipeShortResponse::from_recipe(&recipe)),
        )
            .into_response(),
        Err(e) => relation_error_response(e, "favorite"),
    }
}

#[utoipa::path(
    delete,
    path = "/api/recipes/{id}/favorite",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 204, description = "Recipe removed from favorites"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe or favorite not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn remove_favorite(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    match remove_relation(&mut conn, RecipeRelation::Favorite, user.id, id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => relation_error_response(e, "favorite"),
    }
}

/// Shared error mapping for both relation toggles.
pub(super) fn relation_error_response(
    error: RelationError,
    relation_name: &str,
) -> axum::response::Response {
    match error {
        RelationError::RecipeNotFound => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Recipe not found".to_string(),
            }),
        )
            .into_response(),
        RelationError::AlreadyExists(message) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: message.to_string(),
            }),
        )
            .into_response(),
        RelationError::RelationNotFound => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Recipe is not in {}", relation_name),
            }),
        )
            .into_response(),
        RelationError::Database(e) => {
            tracing::error!("Failed to toggle {}: {}", relation_name, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to update {}", relation_name),
                }),
            )
                .into_response()
        }
    }
}
