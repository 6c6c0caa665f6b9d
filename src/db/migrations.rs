//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
        tracing::info!(version = 1, "Applied schema migration");
    }

    Ok(())
}

/// Migration v1: Initial schema
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- PERSONAL FOODS
        -- User-created foods, nutrients per 100 units
        -- ============================================
        CREATE TABLE personal_foods (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            calories REAL NOT NULL DEFAULT 0,
            protein REAL NOT NULL DEFAULT 0,     -- grams
            carbs REAL NOT NULL DEFAULT 0,       -- grams
            fat REAL NOT NULL DEFAULT 0,         -- grams
            default_unit TEXT NOT NULL DEFAULT 'g',
            piece_weight REAL,                   -- grams per piece
            cup_weight REAL,                     -- grams per cup
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_personal_foods_name ON personal_foods(name);

        -- ============================================
        -- FOOD LOGS
        -- What was eaten; stores the computed totals, not a formula
        -- ============================================
        CREATE TABLE food_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            log_date TEXT NOT NULL,              -- ISO date: "2025-01-09"
            name TEXT NOT NULL,
            barcode TEXT,
            calories INTEGER NOT NULL DEFAULT 0,
            protein INTEGER NOT NULL DEFAULT 0,
            carbs INTEGER NOT NULL DEFAULT 0,
            fat INTEGER NOT NULL DEFAULT 0,
            serving_size TEXT,                   -- raw quantity as entered, e.g. "150"
            serving_unit TEXT,                   -- unit code, e.g. "g", "pc"
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_food_logs_date ON food_logs(log_date);

        -- ============================================
        -- USER GOALS
        -- Single row: profile and derived targets
        -- ============================================
        CREATE TABLE user_goals (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            current_weight REAL,
            target_weight REAL,
            height REAL,
            age INTEGER,
            gender TEXT,
            activity_level TEXT,
            weight_goal TEXT,
            calorie_target INTEGER NOT NULL,
            protein_ratio INTEGER,
            carbs_ratio INTEGER,
            fat_ratio INTEGER,
            protein_grams INTEGER NOT NULL,
            carbs_grams INTEGER NOT NULL,
            fat_grams INTEGER NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);
    Ok(version)
}

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let current = get_schema_version(conn)?;
    Ok(current < SCHEMA_VERSION)
}
