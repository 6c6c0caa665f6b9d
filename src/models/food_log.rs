//! Food Log model
//!
//! A consumed serving. Stores the computed whole totals alongside the raw
//! quantity text and unit code, never the baseline it was computed from.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use crate::nutrition::{ServingAmount, Unit};
use super::NutrientTotals;

/// Serving size assumed for entries logged without one
pub const DEFAULT_SERVING_SIZE: &str = "100";

/// A logged food entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodLog {
    pub id: i64,
    pub log_date: String, // ISO date: "2025-01-09"
    pub name: String,
    pub barcode: Option<String>,
    pub totals: NutrientTotals,
    pub serving_size: Option<String>,
    pub serving_unit: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a food log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodLogCreate {
    pub log_date: String,
    pub name: String,
    pub barcode: Option<String>,
    pub totals: NutrientTotals,
    pub serving_size: String,
    pub serving_unit: Unit,
}

impl FoodLog {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            log_date: row.get("log_date")?,
            name: row.get("name")?,
            barcode: row.get("barcode")?,
            totals: NutrientTotals {
                calories: row.get("calories")?,
                protein: row.get("protein")?,
                carbs: row.get("carbs")?,
                fat: row.get("fat")?,
            },
            serving_size: row.get("serving_size")?,
            serving_unit: row.get("serving_unit")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// The serving these totals were computed for
    ///
    /// Entries without a stored serving read as 100 g.
    pub fn serving(&self) -> ServingAmount {
        let size = self.serving_size.as_deref().unwrap_or(DEFAULT_SERVING_SIZE);
        let unit = Unit::from_code_or_default(self.serving_unit.as_deref());
        ServingAmount::parse(size, unit)
    }

    /// Insert a new entry
    pub fn create(conn: &Connection, data: &FoodLogCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO food_logs (
                log_date, name, barcode, calories, protein, carbs, fat, serving_size, serving_unit
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                data.log_date,
                data.name,
                data.barcode,
                data.totals.calories,
                data.totals.protein,
                data.totals.carbs,
                data.totals.fat,
                data.serving_size,
                data.serving_unit.code(),
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get an entry by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM food_logs WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All entries for a date, newest first
    pub fn list_for_date(conn: &Connection, date: &str) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM food_logs WHERE log_date = ?1 ORDER BY created_at DESC, id DESC",
        )?;

        let entries = stmt
            .query_map([date], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Replace an entry's serving and totals
    pub fn update_serving(
        conn: &Connection,
        id: i64,
        serving_size: &str,
        serving_unit: Unit,
        totals: &NutrientTotals,
    ) -> DbResult<Option<Self>> {
        let rows = conn.execute(
            r#"
            UPDATE food_logs SET
                serving_size = ?1,
                serving_unit = ?2,
                calories = ?3,
                protein = ?4,
                carbs = ?5,
                fat = ?6,
                updated_at = datetime('now')
            WHERE id = ?7
            "#,
            params![
                serving_size,
                serving_unit.code(),
                totals.calories,
                totals.protein,
                totals.carbs,
                totals.fat,
                id,
            ],
        )?;

        if rows == 0 {
            return Ok(None);
        }
        Self::get_by_id(conn, id)
    }

    /// Delete an entry
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM food_logs WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

/// Sum of all entries logged on a date
pub fn calculate_daily_totals(conn: &Connection, date: &str) -> DbResult<NutrientTotals> {
    let entries = FoodLog::list_for_date(conn, date)?;
    Ok(entries.iter().map(|e| e.totals).sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn entry(date: &str, calories: i64) -> FoodLogCreate {
        FoodLogCreate {
            log_date: date.to_string(),
            name: "Apple".to_string(),
            barcode: None,
            totals: NutrientTotals { calories, protein: 1, carbs: 20, fat: 0 },
            serving_size: "150".to_string(),
            serving_unit: Unit::Gram,
        }
    }

    #[test]
    fn test_create_and_serving() {
        let conn = setup();
        let log = FoodLog::create(&conn, &entry("2025-01-09", 78)).unwrap();

        assert_eq!(log.totals.calories, 78);
        assert_eq!(log.serving_unit.as_deref(), Some("g"));
        assert_eq!(log.serving(), ServingAmount::new(150.0, Unit::Gram));
    }

    #[test]
    fn test_missing_serving_reads_as_100_grams() {
        let conn = setup();
        conn.execute(
            "INSERT INTO food_logs (log_date, name, calories) VALUES ('2025-01-09', 'Legacy', 200)",
            [],
        )
        .unwrap();

        let logs = FoodLog::list_for_date(&conn, "2025-01-09").unwrap();
        assert_eq!(logs[0].serving(), ServingAmount::new(100.0, Unit::Gram));
    }

    #[test]
    fn test_daily_totals_only_include_date() {
        let conn = setup();
        FoodLog::create(&conn, &entry("2025-01-09", 78)).unwrap();
        FoodLog::create(&conn, &entry("2025-01-09", 120)).unwrap();
        FoodLog::create(&conn, &entry("2025-01-10", 500)).unwrap();

        let totals = calculate_daily_totals(&conn, "2025-01-09").unwrap();
        assert_eq!(totals, NutrientTotals { calories: 198, protein: 2, carbs: 40, fat: 0 });

        let empty = calculate_daily_totals(&conn, "2025-01-11").unwrap();
        assert_eq!(empty, NutrientTotals::zero());
    }

    #[test]
    fn test_update_serving() {
        let conn = setup();
        let log = FoodLog::create(&conn, &entry("2025-01-09", 78)).unwrap();
        let totals = NutrientTotals { calories: 15, protein: 0, carbs: 4, fat: 0 };

        let updated = FoodLog::update_serving(&conn, log.id, "1", Unit::Ounce, &totals)
            .unwrap()
            .unwrap();
        assert_eq!(updated.totals, totals);
        assert_eq!(updated.serving_size.as_deref(), Some("1"));
        assert_eq!(updated.serving_unit.as_deref(), Some("oz"));

        assert!(FoodLog::update_serving(&conn, 9999, "1", Unit::Gram, &totals)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_delete() {
        let conn = setup();
        let log = FoodLog::create(&conn, &entry("2025-01-09", 78)).unwrap();
        assert!(FoodLog::delete(&conn, log.id).unwrap());
        assert!(FoodLog::get_by_id(&conn, log.id).unwrap().is_none());
    }
}
