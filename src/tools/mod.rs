//! macrotrack Tools module
//!
//! MCP tool implementations for food search, logging and goals.

pub mod food_logs;
pub mod foods;
pub mod goals;
pub mod personal_foods;
pub mod status;
