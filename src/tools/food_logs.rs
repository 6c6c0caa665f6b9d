//! Food Log MCP Tools
//!
//! Tools for logging servings, editing them and reading a day back.

use chrono::NaiveDate;
use serde::Serialize;

use crate::catalog::{Catalog, FoodSource};
use crate::db::Database;
use crate::models::{calculate_daily_totals, FoodLog, FoodLogCreate, NutrientTotals, UserGoals};
use crate::nutrition::{compute_totals, parse_quantity, rescale, GoalProgress, ServingAmount};

use super::foods::{resolve_unit, select_food, serving_for, FoodSelector};

/// Response for log_food
#[derive(Debug, Serialize)]
pub struct LogFoodResponse {
    pub entry: FoodLog,
    pub daily_totals: NutrientTotals,
}

/// Response for edit_food_log
#[derive(Debug, Serialize)]
pub struct EditFoodLogResponse {
    pub entry: FoodLog,
    pub previous_serving: ServingAmount,
    pub previous_totals: NutrientTotals,
}

/// Response for delete_food_log
#[derive(Debug, Serialize)]
pub struct DeleteFoodLogResponse {
    pub success: bool,
    pub deleted_id: i64,
}

/// Progress of each total against its goal
#[derive(Debug, Serialize)]
pub struct DailyProgress {
    pub calories: GoalProgress,
    pub protein: GoalProgress,
    pub carbs: GoalProgress,
    pub fat: GoalProgress,
}

impl DailyProgress {
    pub fn new(totals: &NutrientTotals, goals: &UserGoals) -> Self {
        Self {
            calories: GoalProgress::new(totals.calories, goals.calorie_target),
            protein: GoalProgress::new(totals.protein, goals.macros.protein),
            carbs: GoalProgress::new(totals.carbs, goals.macros.carbs),
            fat: GoalProgress::new(totals.fat, goals.macros.fat),
        }
    }
}

/// Response for get_daily_log
#[derive(Debug, Serialize)]
pub struct DailyLogResponse {
    pub date: String,
    pub entries: Vec<FoodLog>,
    pub entry_count: usize,
    pub totals: NutrientTotals,
    pub goals: UserGoals,
    pub progress: DailyProgress,
}

/// Validate an ISO date, defaulting to today
pub fn resolve_date(date: Option<&str>) -> Result<String, String> {
    match date.map(str::trim).filter(|d| !d.is_empty()) {
        Some(d) => NaiveDate::parse_from_str(d, "%Y-%m-%d")
            .map(|parsed| parsed.format("%Y-%m-%d").to_string())
            .map_err(|_| format!("Invalid date '{}', expected YYYY-MM-DD", d)),
        None => Ok(chrono::Local::now().format("%Y-%m-%d").to_string()),
    }
}

/// Log a serving of a food
///
/// The totals are computed once here and stored; the food's baseline is not.
pub async fn log_food(
    db: &Database,
    catalog: &Catalog,
    selector: FoodSelector,
    quantity: Option<&str>,
    unit: Option<&str>,
    date: Option<&str>,
) -> Result<LogFoodResponse, String> {
    let log_date = resolve_date(date)?;
    let food = select_food(db, catalog, selector).await?;
    let serving = serving_for(&food, quantity, unit)?;
    let totals = compute_totals(&food.reference(), &serving);

    let serving_size = match quantity.map(str::trim).filter(|q| !q.is_empty()) {
        Some(raw) => raw.to_string(),
        None => serving.quantity().to_string(),
    };
    let barcode = match food.source {
        FoodSource::OpenFoodFacts => Some(food.code.clone()),
        _ => None,
    };

    let data = FoodLogCreate {
        log_date,
        name: food.name,
        barcode,
        totals,
        serving_size,
        serving_unit: serving.unit,
    };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let entry = FoodLog::create(&conn, &data)
        .map_err(|e| format!("Failed to log food: {}", e))?;

    let daily_totals = calculate_daily_totals(&conn, &entry.log_date)
        .map_err(|e| format!("Failed to calculate daily totals: {}", e))?;

    tracing::info!(id = entry.id, date = %entry.log_date, calories = totals.calories, "Logged food");

    Ok(LogFoodResponse { entry, daily_totals })
}

/// Change the serving of a logged entry
///
/// Stored totals are rescaled in proportion to the new serving. A missing
/// unit keeps the entry's current unit.
pub fn edit_food_log(
    db: &Database,
    id: i64,
    quantity: &str,
    unit: Option<&str>,
) -> Result<EditFoodLogResponse, String> {
    let new_quantity = parse_quantity(quantity);
    if new_quantity <= 0.0 {
        return Err("quantity must be a number greater than 0".to_string());
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let entry = FoodLog::get_by_id(&conn, id)
        .map_err(|e| format!("Failed to get food log: {}", e))?
        .ok_or_else(|| format!("Food log not found with id: {}", id))?;

    let previous_serving = entry.serving();
    let new_unit = resolve_unit(unit, previous_serving.unit)?;
    let new_serving = ServingAmount::new(new_quantity, new_unit);
    let totals = rescale(&previous_serving, &entry.totals, &new_serving);

    let updated = FoodLog::update_serving(&conn, id, quantity.trim(), new_unit, &totals)
        .map_err(|e| format!("Failed to update food log: {}", e))?
        .ok_or_else(|| format!("Food log not found with id: {}", id))?;

    Ok(EditFoodLogResponse {
        entry: updated,
        previous_serving,
        previous_totals: entry.totals,
    })
}

/// Delete a logged entry
pub fn delete_food_log(db: &Database, id: i64) -> Result<DeleteFoodLogResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let deleted = FoodLog::delete(&conn, id)
        .map_err(|e| format!("Failed to delete food log: {}", e))?;

    if !deleted {
        return Err(format!("Food log not found with id: {}", id));
    }

    Ok(DeleteFoodLogResponse {
        success: true,
        deleted_id: id,
    })
}

/// A day's entries with totals measured against the goals
pub fn get_daily_log(db: &Database, date: Option<&str>) -> Result<DailyLogResponse, String> {
    let date = resolve_date(date)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let entries = FoodLog::list_for_date(&conn, &date)
        .map_err(|e| format!("Failed to list food logs: {}", e))?;

    let totals: NutrientTotals = entries.iter().map(|e| e.totals).sum();

    let goals = UserGoals::get_or_default(&conn)
        .map_err(|e| format!("Failed to get goals: {}", e))?;

    let progress = DailyProgress::new(&totals, &goals);

    Ok(DailyLogResponse {
        date,
        entry_count: entries.len(),
        entries,
        totals,
        goals,
        progress,
    })
}
