//! Response shaping for author payloads.

use crate::api::recipes::responses::RecipeShortResponse;
use crate::models::{Recipe, User};
use crate::schema::recipes;
use diesel::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthorResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Whether the viewer follows this author; false for anonymous viewers
    pub is_subscribed: bool,
}

impl AuthorResponse {
    pub fn from_user(user: &User, is_subscribed: bool) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_subscribed,
        }
    }
}

/// An author the viewer follows, with a bounded preview of their recipes.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubscriptionResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub recipes: Vec<RecipeShortResponse>,
    pub recipes_count: i64,
}

/// Expand followed authors into subscription payloads. All recipes for the
/// page of authors load in one query; `recipes_limit` bounds the preview
/// per author while `recipes_count` stays the full count.
pub fn build_subscription_responses(
    conn: &mut PgConnection,
    authors: Vec<User>,
    recipes_limit: Option<i64>,
) -> QueryResult<Vec<SubscriptionResponse>> {
    if authors.is_empty() {
        return Ok(Vec::new());
    }

    let author_ids: Vec<Option<Uuid>> = authors.iter().map(|a| Some(a.id)).collect();

    let all_recipes: Vec<Recipe> = recipes::table
        .filter(recipes::author_id.eq_any(&author_ids))
        .order((recipes::pub_date.desc(), recipes::id.desc()))
        .select(Recipe::as_select())
        .load(conn)?;

    let mut recipes_by_author: HashMap<Uuid, Vec<Recipe>> = HashMap::new();
    for recipe in all_recipes {
        if let Some(author_id) = recipe.author_id {
            recipes_by_author.entry(author_id).or_default().push(recipe);
        }
    }

    Ok(authors
        .into_iter()
        .map(|author| {
            let recipes = recipes_by_author.remove(&author.id).unwrap_or_default();
            let recipes_count = recipes.len() as i64;

            let preview: Vec<RecipeShortResponse> = match recipes_limit {
                Some(limit) => recipes
                    .iter()
                    .take(limit.max(0) as usize)
                    .map(RecipeShortResponse::from_recipe)
                    .collect(),
                None => recipes.iter().map(RecipeShortResponse::from_recipe).collect(),
            };

            SubscriptionResponse {
                id: author.id,
                username: author.username,
                email: author.email,
                first_name: author.first_name,
                last_name: author.last_name,
                is_subscribed: true,
                recipes: preview,
                recipes_count,
            }
        })
        .collect())
}
