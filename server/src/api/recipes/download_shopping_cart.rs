use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::schema::{cart_items, ingredients, recipe_ingredients};
use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use diesel::dsl::{min, sum};
use diesel::prelude::*;
use std::sync::Arc;

/// Render the aggregated cart as one `name: amountunit` line per ingredient.
fn format_shopping_list(rows: &[(String, String, i64)]) -> String {
    let mut content = String::new();
    for (name, unit, total) in rows {
        content.push_str(&format!("{}: {}{}\n", name, total, unit));
    }
    content
}

#[utoipa::path(
    get,
    path = "/api/recipes/download_shopping_cart",
    tag = "recipes",
    responses(
        (status = 200, description = "Consolidated ingredient list as a text attachment",
         content_type = "text/plain"),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn download_shopping_cart(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    // One grouped aggregation over everything in the cart. Ingredients are
    // bucketed by name: rows sharing a name sum together, and the unit is
    // picked deterministically per bucket.
    let rows: Vec<(String, Option<String>, Option<i64>)> = match cart_items::table
        .inner_join(
            recipe_ingredients::table
                .on(recipe_ingredients::recipe_id.eq(cart_items::recipe_id)),
        )
        .inner_join(ingredients::table.on(ingredients::id.eq(recipe_ingredients::ingredient_id)))
        .filter(cart_items::user_id.eq(user.id))
        .group_by(ingredients::name)
        .order(ingredients::name.asc())
        .select((
            ingredients::name,
            min(ingredients::measurement_unit),
            sum(recipe_ingredients::amount),
        ))
        .load(&mut conn)
    {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Failed to aggregate shopping cart: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to build shopping list".to_string(),
                }),
            )
                .into_response();
        }
    };

    let rows: Vec<(String, String, i64)> = rows
        .into_iter()
        .map(|(name, unit, total)| (name, unit.unwrap_or_default(), total.unwrap_or(0)))
        .collect();

    let content = format_shopping_list(&rows);

    axum::response::Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"cart.txt\"",
        )
        .body(Body::from(content))
        .unwrap()
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_single_line() {
        let rows = vec![("Flour".to_string(), "g".to_string(), 350)];
        assert_eq!(format_shopping_list(&rows), "Flour: 350g\n");
    }

    #[test]
    fn test_format_preserves_row_order() {
        let rows = vec![
            ("Butter".to_string(), "g".to_string(), 200),
            ("Milk".to_string(), "ml".to_string(), 500),
        ];
        assert_eq!(format_shopping_list(&rows), "Butter: 200g\nMilk: 500ml\n");
    }

    #[test]
    fn test_format_empty_cart() {
        assert_eq!(format_shopping_list(&[]), "");
    }
}
