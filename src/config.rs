//! Runtime configuration
//!
//! Read once at startup from environment variables.

use std::path::PathBuf;
use std::time::Duration;

/// Default Open Food Facts host
pub const DEFAULT_OFF_BASE_URL: &str = "https://world.openfoodfacts.org";

/// Default generic food list
pub const DEFAULT_GIST_URL: &str =
    "https://gist.githubusercontent.com/towtu/893f53e31444ad9757f5c4fb6a7edf67/raw/foods.json";

/// Default HTTP timeout in seconds
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    pub off_base_url: String,
    pub gist_url: String,
    pub http_timeout: Duration,
}

impl Config {
    /// Build configuration from the environment
    pub fn from_env() -> Self {
        let http_timeout_secs = std::env::var("MACROTRACK_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);

        Self {
            database_path: database_path(),
            off_base_url: std::env::var("MACROTRACK_OFF_BASE_URL")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_OFF_BASE_URL.to_string()),
            gist_url: std::env::var("MACROTRACK_GIST_URL")
                .unwrap_or_else(|_| DEFAULT_GIST_URL.to_string()),
            http_timeout: Duration::from_secs(http_timeout_secs),
        }
    }
}

/// Get the database path from environment or use default
fn database_path() -> PathBuf {
    std::env::var("MACROTRACK_DATABASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let mut path = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()))
                .unwrap_or_else(|| PathBuf::from("."));

            // Go up from target/release or target/debug to project root
            if path.ends_with("release") || path.ends_with("debug") {
                if let Some(parent) = path.parent() {
                    if let Some(grandparent) = parent.parent() {
                        path = grandparent.to_path_buf();
                    }
                }
            }

            path.push("data");
            path.push("macrotrack.db");
            path
        })
}
