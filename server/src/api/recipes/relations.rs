//! One parameterized create/delete implementation for the user↔recipe
//! relation toggles (favorites and the shopping cart). Both relations are
//! plain uniqueness-constrained join rows, so the handlers differ only in
//! the target table and the conflict message.

use crate::models::{NewCartItem, NewFavorite, Recipe};
use crate::schema::{cart_items, favorites, recipes};
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
pub enum RecipeRelation {
    Favorite,
    ShoppingCart,
}

pub enum RelationError {
    RecipeNotFound,
    /// The (user, recipe) row already exists
    AlreadyExists(&'static str),
    /// Delete of a relation that was never created
    RelationNotFound,
    Database(diesel::result::Error),
}

impl RecipeRelation {
    fn conflict_message(self) -> &'static str {
        match self {
            RecipeRelation::Favorite => "Recipe already added to favorites",
            RecipeRelation::ShoppingCart => "Recipe already added to shopping cart",
        }
    }

    fn insert(
        self,
        conn: &mut PgConnection,
        user_id: Uuid,
        recipe_id: Uuid,
    ) -> QueryResult<usize> {
        match self {
            RecipeRelation::Favorite => diesel::insert_into(favorites::table)
                .values(&NewFavorite { user_id, recipe_id })
                .execute(conn),
            RecipeRelation::ShoppingCart => diesel::insert_into(cart_items::table)
                .values(&NewCartItem { user_id, recipe_id })
                .execute(conn),
        }
    }

    fn delete(
        self,
        conn: &mut PgConnection,
        user_id: Uuid,
        recipe_id: Uuid,
    ) -> QueryResult<usize> {
        match self {
            RecipeRelation::Favorite => diesel::delete(
                favorites::table
                    .filter(favorites::user_id.eq(user_id))
                    .filter(favorites::recipe_id.eq(recipe_id)),
            )
            .execute(conn),
            RecipeRelation::ShoppingCart => diesel::delete(
                cart_items::table
                    .filter(cart_items::user_id.eq(user_id))
                    .filter(cart_items::recipe_id.eq(recipe_id)),
            )
            .execute(conn),
        }
    }
}

fn find_recipe(conn: &mut PgConnection, recipe_id: Uuid) -> Result<Recipe, RelationError> {
    recipes::table
        .find(recipe_id)
        .select(Recipe::as_select())
        .first(conn)
        .map_err(|e| match e {
            diesel::NotFound => RelationError::RecipeNotFound,
            e => RelationError::Database(e),
        })
}

/// Create the relation row for (user, recipe) and return the recipe.
///
/// Conflicts are detected by inserting and catching the unique violation,
/// never by a read-then-write check: two concurrent calls race to the
/// constraint and exactly one of them sees `AlreadyExists`.
pub fn add_relation(
    conn: &mut PgConnection,
    relation: RecipeRelation,
    user_id: Uuid,
    recipe_id: Uuid,
) -> Result<Recipe, RelationError> {
    let recipe = find_recipe(conn, recipe_id)?;

    match relation.insert(conn, user_id, recipe_id) {
        Ok(_) => Ok(recipe),
        Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            Err(RelationError::AlreadyExists(relation.conflict_message()))
        }
        Err(e) => Err(RelationError::Database(e)),
    }
}

/// Delete the relation row for (user, recipe).
pub fn remove_relation(
    conn: &mut PgConnection,
    relation: RecipeRelation,
    user_id: Uuid,
    recipe_id: Uuid,
) -> Result<(), RelationError> {
    find_recipe(conn, recipe_id)?;

    match relation.delete(conn, user_id, recipe_id) {
        Ok(0) => Err(RelationError::RelationNotFound),
        Ok(_) => Ok(()),
        Err(e) => Err(RelationError::Database(e)),
    }
}
