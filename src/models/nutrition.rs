//! Shared nutrition data structures
//!
//! Used across the converter, personal foods, food logs, and daily totals.

use serde::{Deserialize, Serialize};

/// Nutrient values per 100 reference units of a food
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientProfile {
    pub calories: f64, // kcal
    pub protein: f64,  // grams
    pub carbs: f64,    // grams
    pub fat: f64,      // grams
}

impl NutrientProfile {
    pub fn new(calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        Self { calories, protein, carbs, fat }
    }

    /// Scale every nutrient by a ratio and round to whole totals
    pub fn scale_to_totals(&self, ratio: f64) -> NutrientTotals {
        NutrientTotals {
            calories: round_nutrient(self.calories * ratio),
            protein: round_nutrient(self.protein * ratio),
            carbs: round_nutrient(self.carbs * ratio),
            fat: round_nutrient(self.fat * ratio),
        }
    }
}

/// Absolute nutrient totals for a logged serving
///
/// Always whole, non-negative numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutrientTotals {
    pub calories: i64,
    pub protein: i64,
    pub carbs: i64,
    pub fat: i64,
}

impl NutrientTotals {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Scale stored totals by a ratio, rounding each result
    pub fn scale(&self, ratio: f64) -> Self {
        Self {
            calories: round_nutrient(self.calories as f64 * ratio),
            protein: round_nutrient(self.protein as f64 * ratio),
            carbs: round_nutrient(self.carbs as f64 * ratio),
            fat: round_nutrient(self.fat as f64 * ratio),
        }
    }
}

impl std::ops::Add for NutrientTotals {
    type Output = NutrientTotals;

    fn add(self, other: NutrientTotals) -> NutrientTotals {
        NutrientTotals {
            calories: self.calories + other.calories,
            protein: self.protein + other.protein,
            carbs: self.carbs + other.carbs,
            fat: self.fat + other.fat,
        }
    }
}

impl std::iter::Sum for NutrientTotals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(NutrientTotals::zero(), |acc, n| acc + n)
    }
}

/// Round half away from zero and clamp at zero
///
/// Non-finite values (from malformed upstream data) become 0.
pub fn round_nutrient(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    value.round().max(0.0) as i64
}
