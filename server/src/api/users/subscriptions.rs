use crate::api::{ErrorResponse, PaginationMetadata};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::User;
use crate::schema::{follows, users};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use super::responses::{build_subscription_responses, SubscriptionResponse};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListSubscriptionsParams {
    /// Number of items to return (default: 20, max: 100)
    pub limit: Option<i64>,
    /// Number of items to skip (default: 0)
    pub offset: Option<i64>,
    /// Bound the recipe preview per author
    pub recipes_limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListSubscriptionsResponse {
    pub subscriptions: Vec<SubscriptionResponse>,
    pub pagination: PaginationMetadata,
}

#[utoipa::path(
    get,
    path = "/api/users/subscriptions",
    tag = "users",
    params(ListSubscriptionsParams),
    responses(
        (status = 200, description = "Authors the user follows, with recipe previews",
         body = ListSubscriptionsResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_subscriptions(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Query(params): Query<ListSubscriptionsParams>,
) -> impl IntoResponse {
    let limit = params.limit.unwrap_or(20).clamp(1, 100);
    let offset = params.offset.unwrap_or(0).max(0);

    let mut conn = get_conn!(pool);

    let total: i64 = match follows::table
        .filter(follows::follower_id.eq(user.id))
        .count()
        .get_result(&mut conn)
    {
        Ok(total) => total,
        Err(e) => {
            tracing::error!("Failed to count subscriptions: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch subscriptions".to_string(),
                }),
            )
                .into_response();
        }
    };

    let authors: Vec<User> = match follows::table
        .inner_join(users::table.on(users::id.eq(follows::author_id)))
        .filter(follows::follower_id.eq(user.id))
        .order(users::username.asc())
        .select(User::as_select())
        .limit(limit)
        .offset(offset)
        .load(&mut conn)
    {
        Ok(authors) => authors,
        Err(e) => {
            tracing::error!("Failed to fetch subscriptions: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch subscriptions".to_string(),
                }),
            )
                .into_response();
        }
    };

    let subscriptions =
        match build_subscription_responses(&mut conn, authors, params.recipes_limit) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!("Failed to expand subscriptions: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: "Failed to fetch subscriptions".to_string(),
                    }),
                )
                    .into_response();
            }
        };

    (
        StatusCode::OK,
        Json(ListSubscriptionsResponse {
            subscriptions,
            pagination: PaginationMetadata {
                total,
                limit,
                offset,
            },
        }),
    )
        .into_response()
}
