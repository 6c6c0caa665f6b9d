//! Nutrition calculation module
//!
//! Handles serving conversions and goal calculations.

pub mod converter;
pub mod goals;
pub mod units;

pub use converter::{
    baseline_ratio, coerce_quantity, compute_totals, parse_quantity, rescale, rescale_ratio,
    FoodReference, ServingAmount,
};
pub use goals::{
    atwater_calories, ActivityLevel, GoalError, GoalProgress, MacroGrams, MacroRatios, Profile,
    Sex, WeightGoal,
};
pub use units::Unit;
