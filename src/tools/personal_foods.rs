//! Personal Food MCP Tools
//!
//! Tools for managing the user's own foods.

use serde::Serialize;

use crate::catalog::CatalogFood;
use crate::db::Database;
use crate::models::{PersonalFood, PersonalFoodCreate};
use crate::nutrition::atwater_calories;

/// Response for create_personal_food
#[derive(Debug, Serialize)]
pub struct CreatePersonalFoodResponse {
    pub food: CatalogFood,
    /// True when calories were filled in from the macros
    pub calories_estimated: bool,
    pub created_at: String,
}

/// Response for list_personal_foods
#[derive(Debug, Serialize)]
pub struct ListPersonalFoodsResponse {
    pub foods: Vec<CatalogFood>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Response for delete_personal_food
#[derive(Debug, Serialize)]
pub struct DeletePersonalFoodResponse {
    pub success: bool,
    pub deleted_id: i64,
}

/// Add a personal food
///
/// Calories left at 0 are estimated from the macros when any are given.
pub fn create_personal_food(
    db: &Database,
    mut data: PersonalFoodCreate,
) -> Result<CreatePersonalFoodResponse, String> {
    data.name = data.name.trim().to_string();
    if data.name.is_empty() {
        return Err("Food name cannot be empty".to_string());
    }

    for (field, value) in [
        ("calories", data.calories),
        ("protein", data.protein),
        ("carbs", data.carbs),
        ("fat", data.fat),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(format!("{} cannot be negative", field));
        }
    }

    let has_macros = data.protein > 0.0 || data.carbs > 0.0 || data.fat > 0.0;
    let calories_estimated = data.calories == 0.0 && has_macros;
    if calories_estimated {
        data.calories = atwater_calories(data.protein, data.carbs, data.fat) as f64;
    }

    // Unusable weights are stored as absent
    data.piece_weight = data.piece_weight.filter(|w| w.is_finite() && *w > 0.0);
    data.cup_weight = data.cup_weight.filter(|w| w.is_finite() && *w > 0.0);

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let food = PersonalFood::create(&conn, &data)
        .map_err(|e| format!("Failed to create personal food: {}", e))?;

    tracing::info!(id = food.id, name = %food.name, "Created personal food");

    Ok(CreatePersonalFoodResponse {
        created_at: food.created_at.clone(),
        food: CatalogFood::from(&food),
        calories_estimated,
    })
}

/// List personal foods, newest first
pub fn list_personal_foods(
    db: &Database,
    limit: i64,
    offset: i64,
) -> Result<ListPersonalFoodsResponse, String> {
    let limit = limit.min(200).max(1);
    let offset = offset.max(0);

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let foods = PersonalFood::list(&conn, limit, offset)
        .map_err(|e| format!("Failed to list personal foods: {}", e))?;

    let total = PersonalFood::count(&conn)
        .map_err(|e| format!("Failed to count personal foods: {}", e))?;

    Ok(ListPersonalFoodsResponse {
        foods: foods.iter().map(CatalogFood::from).collect(),
        total,
        limit,
        offset,
    })
}

/// Delete a personal food
///
/// Logged entries keep their own copy of the totals and are unaffected.
pub fn delete_personal_food(db: &Database, id: i64) -> Result<DeletePersonalFoodResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let deleted = PersonalFood::delete(&conn, id)
        .map_err(|e| format!("Failed to delete personal food: {}", e))?;

    if !deleted {
        return Err(format!("Personal food not found with id: {}", id));
    }

    Ok(DeletePersonalFoodResponse {
        success: true,
        deleted_id: id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::nutrition::Unit;

    fn setup() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();
        db
    }

    fn chicken() -> PersonalFoodCreate {
        PersonalFoodCreate {
            name: "  Chicken Breast  ".to_string(),
            calories: 0.0,
            protein: 31.0,
            carbs: 0.0,
            fat: 3.6,
            default_unit: Unit::Gram,
            piece_weight: Some(0.0),
            cup_weight: None,
        }
    }

    #[test]
    fn test_create_estimates_calories() {
        let db = setup();
        let response = create_personal_food(&db, chicken()).unwrap();

        // 31 x 4 + 3.6 x 9 = 156.4
        assert!(response.calories_estimated);
        assert_eq!(response.food.nutrients.calories, 156.0);
        assert_eq!(response.food.name, "Chicken Breast");
        assert_eq!(response.food.piece_weight, None);
    }

    #[test]
    fn test_create_keeps_given_calories() {
        let db = setup();
        let response = create_personal_food(&db, PersonalFoodCreate {
            calories: 165.0,
            ..chicken()
        })
        .unwrap();

        assert!(!response.calories_estimated);
        assert_eq!(response.food.nutrients.calories, 165.0);
    }

    #[test]
    fn test_create_validates_input() {
        let db = setup();
        let unnamed = PersonalFoodCreate { name: " ".to_string(), ..chicken() };
        assert!(create_personal_food(&db, unnamed).is_err());

        let negative = PersonalFoodCreate { fat: -1.0, ..chicken() };
        assert!(create_personal_food(&db, negative).is_err());
    }

    #[test]
    fn test_list_and_delete() {
        let db = setup();
        let created = create_personal_food(&db, chicken()).unwrap();
        let id = created.food.personal_id.unwrap();

        let listed = list_personal_foods(&db, 50, 0).unwrap();
        assert_eq!(listed.total, 1);
        assert_eq!(listed.foods[0].code, format!("personal-{}", id));

        assert!(delete_personal_food(&db, id).unwrap().success);
        assert!(delete_personal_food(&db, id).is_err());
        assert_eq!(list_personal_foods(&db, 50, 0).unwrap().total, 0);
    }
}
