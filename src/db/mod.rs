//! Database module
//!
//! SQLite connection pool and schema migrations for foods, logs, and goals.

pub mod connection;
pub mod migrations;

pub use connection::{Database, DbError, DbResult};
