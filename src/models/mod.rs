//! Data models
//!
//! Rust structs representing database entities.

mod food_log;
mod nutrition;
mod personal_food;
mod user_goals;

pub use food_log::{calculate_daily_totals, FoodLog, FoodLogCreate, DEFAULT_SERVING_SIZE};
pub use nutrition::{round_nutrient, NutrientProfile, NutrientTotals};
pub use personal_food::{PersonalFood, PersonalFoodCreate};
pub use user_goals::UserGoals;
