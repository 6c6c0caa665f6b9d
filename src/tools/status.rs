//! Status Tool
//!
//! Provides runtime status information about the macrotrack service.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

use crate::build_info::BuildInfo;
use crate::db::migrations::get_schema_version;
use crate::db::Database;

/// Usage notes for assistants driving the tools
pub const USAGE_GUIDE: &str = r#"
# macrotrack usage

1. `search_foods` with a name. Results list personal foods first, then
   generic foods, then Open Food Facts products. Each has a `code`.
2. `preview_serving` with that code, a quantity and a unit to see totals.
   An optional `step` nudges the serving like a +/- button.
3. `log_food` with the same arguments (plus an optional YYYY-MM-DD date)
   to store the entry. Totals are computed once and stored as whole numbers.
4. `edit_food_log` changes a logged quantity or unit; totals are rescaled
   proportionally from what was stored.
5. `get_daily_log` shows a day's entries against the goals.

Units: g, ml, oz, tsp, tbsp, cup, pc (other units are rejected). Nutrients are per 100 g (or 100 ml)
for every food; pc, cup, tbsp and tsp use the food's piece or cup weight
when it has one.
"#;

/// Status information
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,
    pub database_path: String,
    pub database_size_bytes: Option<u64>,
    pub schema_version: Option<i32>,
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub usage: &'static str,
}

/// Status tracker for the service
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    /// Get the current status
    pub fn get_status(&self, db: &Database) -> ServiceStatus {
        let build_info = BuildInfo::current();

        // Get database size if it exists
        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let schema_version = db.with_conn(get_schema_version).ok();

        ServiceStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            schema_version,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: std::process::id(),
            usage: USAGE_GUIDE.trim(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    #[test]
    fn test_status_reports_schema_version() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();

        let status = StatusTracker::new(PathBuf::from("/nonexistent/macrotrack.db")).get_status(&db);
        assert_eq!(status.schema_version, Some(1));
        assert_eq!(status.database_size_bytes, None);
        assert_eq!(status.version, env!("CARGO_PKG_VERSION"));
    }
}
