use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use axum::{http::StatusCode, response::IntoResponse, Json};

use super::responses::AuthorResponse;

#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "users",
    responses(
        (status = 200, description = "The authenticated user's own profile", body = AuthorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(AuthUser(user): AuthUser) -> impl IntoResponse {
    // Nobody follows themself, so is_subscribed is always false here
    (
        StatusCode::OK,
        Json(AuthorResponse::from_user(&user, false)),
    )
        .into_response()
}
