//! Response shaping for recipe payloads.
//!
//! Every read of a recipe carries its tags, its ingredients with per-recipe
//! amounts, the author with the viewer's subscription flag, and the viewer's
//! favorite/cart flags. The loaders here work over a whole page of recipes
//! with a fixed number of queries, so listing endpoints never fan out one
//! query per row.

use crate::api::tags::list::TagResponse;
use crate::api::users::responses::AuthorResponse;
use crate::media;
use crate::models::{Recipe, User};
use crate::schema::{
    cart_items, favorites, follows, ingredients, recipe_ingredients, recipe_tags, tags, users,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeIngredientResponse {
    pub id: Uuid,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// Compact recipe payload used by relation toggles and subscription previews.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeShortResponse {
    pub id: Uuid,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl RecipeShortResponse {
    pub fn from_recipe(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name.clone(),
            image: media::media_url(&recipe.image),
            cooking_time: recipe.cooking_time,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeResponse {
    pub id: Uuid,
    pub tags: Vec<TagResponse>,
    /// Absent when the author account has been deleted
    pub author: Option<AuthorResponse>,
    pub ingredients: Vec<RecipeIngredientResponse>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub description: String,
    pub cooking_time: i32,
    pub pub_date: DateTime<Utc>,
}

/// Expand a page of recipes into full response payloads.
///
/// Viewer-dependent fields (`is_favorited`, `is_in_shopping_cart`, the
/// author's `is_subscribed`) are false for anonymous viewers; for
/// authenticated viewers they come from three set-membership queries over
/// the whole page.
pub fn build_recipe_responses(
    conn: &mut PgConnection,
    recipes: Vec<Recipe>,
    viewer: Option<&User>,
) -> QueryResult<Vec<RecipeResponse>> {
    if recipes.is_empty() {
        return Ok(Vec::new());
    }

    let recipe_ids: Vec<Uuid> = recipes.iter().map(|r| r.id).collect();
    let author_ids: Vec<Uuid> = recipes.iter().filter_map(|r| r.author_id).collect();

    let tag_rows: Vec<(Uuid, Uuid, String, String, String)> = recipe_tags::table
        .inner_join(tags::table)
        .filter(recipe_tags::recipe_id.eq_any(&recipe_ids))
        .order(tags::name.asc())
        .select((
            recipe_tags::recipe_id,
            tags::id,
            tags::name,
            tags::colour,
            tags::slug,
        ))
        .load(conn)?;

    let ingredient_rows: Vec<(Uuid, i32, Uuid, String, String)> = recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq_any(&recipe_ids))
        .order(ingredients::name.asc())
        .select((
            recipe_ingredients::recipe_id,
            recipe_ingredients::amount,
            ingredients::id,
            ingredients::name,
            ingredients::measurement_unit,
        ))
        .load(conn)?;

    let authors: HashMap<Uuid, User> = users::table
        .filter(users::id.eq_any(&author_ids))
        .select(User::as_select())
        .load::<User>(conn)?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let (followed, favorited, in_cart) = match viewer {
        Some(viewer) => {
            let followed: HashSet<Uuid> = follows::table
                .filter(follows::follower_id.eq(viewer.id))
                .filter(follows::author_id.eq_any(&author_ids))
                .select(follows::author_id)
                .load(conn)?
                .into_iter()
                .collect();
            let favorited: HashSet<Uuid> = favorites::table
                .filter(favorites::user_id.eq(viewer.id))
                .filter(favorites::recipe_id.eq_any(&recipe_ids))
                .select(favorites::recipe_id)
                .load(conn)?
                .into_iter()
                .collect();
            let in_cart: HashSet<Uuid> = cart_items::table
                .filter(cart_items::user_id.eq(viewer.id))
                .filter(cart_items::recipe_id.eq_any(&recipe_ids))
                .select(cart_items::recipe_id)
                .load(conn)?
                .into_iter()
                .collect();
            (followed, favorited, in_cart)
        }
        None => (HashSet::new(), HashSet::new(), HashSet::new()),
    };

    let mut tags_by_recipe: HashMap<Uuid, Vec<TagResponse>> = HashMap::new();
    for (recipe_id, id, name, colour, slug) in tag_rows {
        tags_by_recipe.entry(recipe_id).or_default().push(TagResponse {
            id,
            name,
            colour,
            slug,
        });
    }

    let mut ingredients_by_recipe: HashMap<Uuid, Vec<RecipeIngredientResponse>> = HashMap::new();
    for (recipe_id, amount, id, name, measurement_unit) in ingredient_rows {
        ingredients_by_recipe
            .entry(recipe_id)
            .or_default()
            .push(RecipeIngredientResponse {
                id,
                name,
                measurement_unit,
                amount,
            });
    }

    Ok(recipes
        .into_iter()
        .map(|recipe| {
            let author = recipe.author_id.and_then(|author_id| {
                authors
                    .get(&author_id)
                    .map(|user| AuthorResponse::from_user(user, followed.contains(&author_id)))
            });

            RecipeResponse {
                id: recipe.id,
                tags: tags_by_recipe.remove(&recipe.id).unwrap_or_default(),
                author,
                ingredients: ingredients_by_recipe.remove(&recipe.id).unwrap_or_default(),
                is_favorited: favorited.contains(&recipe.id),
                is_in_shopping_cart: in_cart.contains(&recipe.id),
                name: recipe.name,
                image: media::media_url(&recipe.image),
                description: recipe.description,
                cooking_time: recipe.cooking_time,
                pub_date: recipe.pub_date,
            }
        })
        .collect())
}

/// Single-recipe convenience over `build_recipe_responses`.
pub fn build_recipe_response(
    conn: &mut PgConnection,
    recipe: Recipe,
    viewer: Option<&User>,
) -> QueryResult<RecipeResponse> {
    let mut responses = build_recipe_responses(conn, vec![recipe], viewer)?;
    Ok(responses.remove(0))
}
