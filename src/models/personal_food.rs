//! Personal Food model
//!
//! A food the user created, with nutrients per 100 units of its default unit.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use crate::nutrition::Unit;
use super::NutrientProfile;

/// A user-created food
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalFood {
    pub id: i64,
    pub name: String,
    pub nutrients: NutrientProfile,
    pub default_unit: Unit,
    pub piece_weight: Option<f64>,
    pub cup_weight: Option<f64>,
    pub created_at: String,
}

/// Data for creating a personal food
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalFoodCreate {
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default)]
    pub default_unit: Unit,
    pub piece_weight: Option<f64>,
    pub cup_weight: Option<f64>,
}

impl PersonalFood {
    /// Create a PersonalFood from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let unit: String = row.get("default_unit")?;
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            nutrients: NutrientProfile {
                calories: row.get("calories")?,
                protein: row.get("protein")?,
                carbs: row.get("carbs")?,
                fat: row.get("fat")?,
            },
            default_unit: Unit::from_code_or_default(Some(&unit)),
            piece_weight: row.get("piece_weight")?,
            cup_weight: row.get("cup_weight")?,
            created_at: row.get("created_at")?,
        })
    }

    /// Insert a new personal food
    pub fn create(conn: &Connection, data: &PersonalFoodCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO personal_foods (
                name, calories, protein, carbs, fat, default_unit, piece_weight, cup_weight
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                data.name,
                data.calories,
                data.protein,
                data.carbs,
                data.fat,
                data.default_unit.code(),
                data.piece_weight,
                data.cup_weight,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get a personal food by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM personal_foods WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(food) => Ok(Some(food)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Search personal foods by name, case-insensitive
    ///
    /// The query is matched literally; `%` and `_` are not wildcards.
    pub fn search(conn: &Connection, query: &str, limit: i64) -> DbResult<Vec<Self>> {
        let search_pattern = format!("%{}%", escape_like(query.trim()));
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM personal_foods
            WHERE name LIKE ?1 ESCAPE '\'
            ORDER BY created_at DESC, id DESC
            LIMIT ?2
            "#,
        )?;

        let foods = stmt
            .query_map(params![search_pattern, limit], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(foods)
    }

    /// List personal foods, newest first
    pub fn list(conn: &Connection, limit: i64, offset: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM personal_foods ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2",
        )?;

        let foods = stmt
            .query_map(params![limit, offset], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(foods)
    }

    /// Count personal foods
    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM personal_foods", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Delete a personal food
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM personal_foods WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
