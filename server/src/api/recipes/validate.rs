//! Recipe payload validation. Checks run in a fixed order and the first
//! failure wins, so clients get one stable error per bad payload.

use serde::Deserialize;
use std::collections::HashSet;
use utoipa::ToSchema;
use uuid::Uuid;

pub const MIN_COOKING_TIME: i32 = 1;
pub const MAX_COOKING_TIME: i32 = 1440;

/// One ingredient reference in a recipe write payload.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct IngredientAmount {
    pub id: Uuid,
    pub amount: i32,
}

pub fn check_cooking_time(minutes: i32) -> Result<(), &'static str> {
    if !(MIN_COOKING_TIME..=MAX_COOKING_TIME).contains(&minutes) {
        return Err("Cooking time must be between 1 and 1440 minutes");
    }
    Ok(())
}

/// Validate the ingredient list against the set of known ingredient ids.
/// Order matters: duplicates, then unknown ids, then amounts.
pub fn check_ingredients(
    items: &[IngredientAmount],
    known: &HashSet<Uuid>,
) -> Result<(), &'static str> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.id) {
            return Err("Ingredient repeated");
        }
    }
    for item in items {
        if !known.contains(&item.id) {
            return Err("Ingredient missing");
        }
    }
    for item in items {
        if item.amount < 1 {
            return Err("Amount must exceed 0");
        }
    }
    Ok(())
}

pub fn check_tags(tag_ids: &[Uuid], known: &HashSet<Uuid>) -> Result<(), &'static str> {
    for tag_id in tag_ids {
        if !known.contains(tag_id) {
            return Err("Tag missing");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: Uuid, amount: i32) -> IngredientAmount {
        IngredientAmount { id, amount }
    }

    #[test]
    fn test_cooking_time_bounds() {
        assert!(check_cooking_time(0).is_err());
        assert!(check_cooking_time(1).is_ok());
        assert!(check_cooking_time(1440).is_ok());
        assert!(check_cooking_time(1441).is_err());
        assert!(check_cooking_time(-5).is_err());
    }

    #[test]
    fn test_duplicate_ingredient_rejected() {
        let id = Uuid::new_v4();
        let known = HashSet::from([id]);
        let err = check_ingredients(&[item(id, 1), item(id, 2)], &known).unwrap_err();
        assert_eq!(err, "Ingredient repeated");
    }

    #[test]
    fn test_unknown_ingredient_rejected() {
        let known = HashSet::from([Uuid::new_v4()]);
        let err = check_ingredients(&[item(Uuid::new_v4(), 1)], &known).unwrap_err();
        assert_eq!(err, "Ingredient missing");
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        let id = Uuid::new_v4();
        let known = HashSet::from([id]);
        let err = check_ingredients(&[item(id, 0)], &known).unwrap_err();
        assert_eq!(err, "Amount must exceed 0");
    }

    #[test]
    fn test_duplicate_wins_over_unknown_and_amount() {
        // A payload that is wrong in every way reports the duplicate first.
        let id = Uuid::new_v4();
        let known = HashSet::new();
        let err = check_ingredients(&[item(id, 0), item(id, 0)], &known).unwrap_err();
        assert_eq!(err, "Ingredient repeated");
    }

    #[test]
    fn test_unknown_wins_over_amount() {
        let known_id = Uuid::new_v4();
        let known = HashSet::from([known_id]);
        let err = check_ingredients(
            &[item(Uuid::new_v4(), 5), item(known_id, 0)],
            &known,
        )
        .unwrap_err();
        assert_eq!(err, "Ingredient missing");
    }

    #[test]
    fn test_valid_ingredients_pass() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let known = HashSet::from([a, b]);
        assert!(check_ingredients(&[item(a, 2), item(b, 3)], &known).is_ok());
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let known = HashSet::from([Uuid::new_v4()]);
        assert!(check_tags(&[Uuid::new_v4()], &known).is_err());
        assert!(check_tags(&[], &known).is_ok());
    }
}
