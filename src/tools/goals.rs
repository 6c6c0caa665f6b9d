//! Goal MCP Tools
//!
//! Tools for reading and setting daily calorie and macro goals.

use serde::Serialize;

use crate::db::Database;
use crate::models::UserGoals;
use crate::nutrition::goals::validate_manual_calorie_goal;
use crate::nutrition::{MacroRatios, Profile};

/// Response for get_goals
#[derive(Debug, Serialize)]
pub struct GetGoalsResponse {
    pub goals: UserGoals,
    /// False when the defaults are being reported
    pub stored: bool,
}

/// Response for save_profile
#[derive(Debug, Serialize)]
pub struct SaveProfileResponse {
    pub goals: UserGoals,
    pub bmr: i64,
    pub tdee: i64,
}

/// Current goals, or the defaults when none are stored
pub fn get_goals(db: &Database) -> Result<GetGoalsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let stored = UserGoals::get(&conn)
        .map_err(|e| format!("Failed to get goals: {}", e))?;

    Ok(GetGoalsResponse {
        stored: stored.is_some(),
        goals: stored.unwrap_or_default(),
    })
}

/// Save a profile and derive the goals from it
pub fn save_profile(
    db: &Database,
    profile: Profile,
    ratios: MacroRatios,
) -> Result<SaveProfileResponse, String> {
    profile.validate().map_err(|e| e.to_string())?;
    ratios.validate().map_err(|e| e.to_string())?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let goals = UserGoals::save_profile(&conn, &profile, &ratios)
        .map_err(|e| format!("Failed to save profile: {}", e))?;

    tracing::info!(calorie_target = goals.calorie_target, "Saved profile");

    Ok(SaveProfileResponse {
        goals,
        bmr: profile.bmr().round() as i64,
        tdee: profile.tdee().round() as i64,
    })
}

/// Set the calorie goal by hand
pub fn set_calorie_goal(db: &Database, calories: i64) -> Result<GetGoalsResponse, String> {
    let calories = validate_manual_calorie_goal(calories).map_err(|e| e.to_string())?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let goals = UserGoals::set_calorie_target(&conn, calories)
        .map_err(|e| format!("Failed to set calorie goal: {}", e))?;

    Ok(GetGoalsResponse { goals, stored: true })
}
