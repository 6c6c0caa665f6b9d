//! macrotrack Library
//!
//! Calorie and macro tracking: serving conversion, food catalog, food log
//! and goals, served over MCP.

pub mod build_info;
pub mod catalog;
pub mod config;
pub mod db;
pub mod mcp;
pub mod models;
pub mod nutrition;
pub mod tools;
