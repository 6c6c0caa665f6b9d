//! User Goals model
//!
//! A single row holding the body profile and the calorie and macro targets
//! derived from it (or typed in by hand).

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

use crate::db::DbResult;
use crate::nutrition::goals::DEFAULT_CALORIE_GOAL;
use crate::nutrition::{ActivityLevel, MacroGrams, MacroRatios, Profile, Sex, WeightGoal};

/// Stored daily goals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserGoals {
    /// Present once a full profile has been saved
    pub profile: Option<Profile>,
    pub ratios: MacroRatios,
    pub calorie_target: i64,
    pub macros: MacroGrams,
    /// None when nothing has been stored yet
    pub updated_at: Option<String>,
}

impl Default for UserGoals {
    fn default() -> Self {
        Self {
            profile: None,
            ratios: MacroRatios::default(),
            calorie_target: DEFAULT_CALORIE_GOAL,
            macros: MacroGrams::default(),
            updated_at: None,
        }
    }
}

impl UserGoals {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let weight: Option<f64> = row.get("current_weight")?;
        let target_weight: Option<f64> = row.get("target_weight")?;
        let height: Option<f64> = row.get("height")?;
        let age: Option<u32> = row.get("age")?;
        let gender: Option<String> = row.get("gender")?;
        let activity: Option<String> = row.get("activity_level")?;
        let goal: Option<String> = row.get("weight_goal")?;

        let profile = match (weight, target_weight, height, age) {
            (Some(weight_kg), Some(target_weight_kg), Some(height_cm), Some(age)) => Some(Profile {
                weight_kg,
                target_weight_kg,
                height_cm,
                age,
                sex: gender.as_deref().map(Sex::from_str).unwrap_or_default(),
                activity: activity.as_deref().map(ActivityLevel::from_str).unwrap_or_default(),
                goal: goal.as_deref().map(WeightGoal::from_str).unwrap_or_default(),
            }),
            _ => None,
        };

        Ok(Self {
            profile,
            ratios: MacroRatios::or_defaults(
                row.get("protein_ratio")?,
                row.get("carbs_ratio")?,
                row.get("fat_ratio")?,
            ),
            calorie_target: row.get("calorie_target")?,
            macros: MacroGrams {
                protein: row.get("protein_grams")?,
                carbs: row.get("carbs_grams")?,
                fat: row.get("fat_grams")?,
            },
            updated_at: row.get("updated_at")?,
        })
    }

    /// The stored goals, if any
    pub fn get(conn: &Connection) -> DbResult<Option<Self>> {
        let goals = conn
            .query_row("SELECT * FROM user_goals WHERE id = 1", [], Self::from_row)
            .optional()?;
        Ok(goals)
    }

    /// The stored goals, or the defaults when none exist
    pub fn get_or_default(conn: &Connection) -> DbResult<Self> {
        Ok(Self::get(conn)?.unwrap_or_default())
    }

    /// Store a profile with the calorie target and macro grams it implies
    ///
    /// Callers validate the profile and ratios first.
    pub fn save_profile(conn: &Connection, profile: &Profile, ratios: &MacroRatios) -> DbResult<Self> {
        let calorie_target = profile.calorie_target();
        let macros = ratios.grams_for(calorie_target);

        conn.execute(
            r#"
            INSERT INTO user_goals (
                id, current_weight, target_weight, height, age, gender, activity_level,
                weight_goal, calorie_target, protein_ratio, carbs_ratio, fat_ratio,
                protein_grams, carbs_grams, fat_grams, updated_at
            ) VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, datetime('now'))
            ON CONFLICT(id) DO UPDATE SET
                current_weight = excluded.current_weight,
                target_weight = excluded.target_weight,
                height = excluded.height,
                age = excluded.age,
                gender = excluded.gender,
                activity_level = excluded.activity_level,
                weight_goal = excluded.weight_goal,
                calorie_target = excluded.calorie_target,
                protein_ratio = excluded.protein_ratio,
                carbs_ratio = excluded.carbs_ratio,
                fat_ratio = excluded.fat_ratio,
                protein_grams = excluded.protein_grams,
                carbs_grams = excluded.carbs_grams,
                fat_grams = excluded.fat_grams,
                updated_at = excluded.updated_at
            "#,
            params![
                profile.weight_kg,
                profile.target_weight_kg,
                profile.height_cm,
                profile.age,
                profile.sex.as_str(),
                profile.activity.as_str(),
                profile.goal.as_str(),
                calorie_target,
                ratios.protein,
                ratios.carbs,
                ratios.fat,
                macros.protein,
                macros.carbs,
                macros.fat,
            ],
        )?;

        Self::get_or_default(conn)
    }

    /// Replace the calorie target, keeping the stored profile
    ///
    /// Macro grams follow the stored ratios. Without a stored row they stay
    /// at the defaults.
    pub fn set_calorie_target(conn: &Connection, calorie_target: i64) -> DbResult<Self> {
        match Self::get(conn)? {
            Some(existing) => {
                let macros = existing.ratios.grams_for(calorie_target);
                conn.execute(
                    r#"
                    UPDATE user_goals SET
                        calorie_target = ?1,
                        protein_grams = ?2,
                        carbs_grams = ?3,
                        fat_grams = ?4,
                        updated_at = datetime('now')
                    WHERE id = 1
                    "#,
                    params![calorie_target, macros.protein, macros.carbs, macros.fat],
                )?;
            }
            None => {
                let macros = MacroGrams::default();
                conn.execute(
                    r#"
                    INSERT INTO user_goals (id, calorie_target, protein_grams, carbs_grams, fat_grams)
                    VALUES (1, ?1, ?2, ?3, ?4)
                    "#,
                    params![calorie_target, macros.protein, macros.carbs, macros.fat],
                )?;
            }
        }

        Self::get_or_default(conn)
    }
}
