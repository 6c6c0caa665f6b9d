//! Serving conversion
//!
//! Turns a serving amount of a food into whole nutrient totals, and rescales
//! the totals of an already-logged serving when its amount changes.
//!
//! Two separate algorithms live here. `compute_totals` works from
//! a food's per-100-unit baseline and can use the food's piece and cup
//! weights. `rescale` only has a log entry's previous result and serving, so
//! it scales those totals proportionally using fixed unit constants. Repeated
//! rescaling compounds rounding.

use serde::{Deserialize, Serialize};

use super::units::{Unit, BASELINE_UNITS, TBSP_PER_CUP, TSP_PER_CUP};
use crate::models::{NutrientProfile, NutrientTotals};

/// The conversion-relevant part of a catalog food
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FoodReference {
    /// Nutrients per 100 reference units (grams)
    pub profile: NutrientProfile,
    /// Grams in one piece
    pub piece_weight: Option<f64>,
    /// Grams in one cup
    pub cup_weight: Option<f64>,
}

impl FoodReference {
    pub fn new(profile: NutrientProfile) -> Self {
        Self { profile, piece_weight: None, cup_weight: None }
    }

    pub fn with_piece_weight(mut self, grams: Option<f64>) -> Self {
        self.piece_weight = grams;
        self
    }

    pub fn with_cup_weight(mut self, grams: Option<f64>) -> Self {
        self.cup_weight = grams;
        self
    }

    /// Piece weight, if declared and usable
    fn piece_grams(&self) -> Option<f64> {
        usable_weight(self.piece_weight)
    }

    /// Cup weight, if declared and usable
    fn cup_grams(&self) -> Option<f64> {
        usable_weight(self.cup_weight)
    }
}

/// A quantity of some unit
///
/// The quantity is never negative: construction coerces bad input to 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ServingAmount {
    quantity: f64,
    pub unit: Unit,
}

impl ServingAmount {
    pub fn new(quantity: f64, unit: Unit) -> Self {
        Self { quantity: coerce_quantity(quantity), unit }
    }

    /// Build from text typed into a quantity field
    pub fn parse(quantity: &str, unit: Unit) -> Self {
        Self::new(parse_quantity(quantity), unit)
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    /// Step the quantity up or down
    ///
    /// Weight-like units move by `step`; count and volume units move by one
    /// in the direction of `step`. Never goes below zero.
    pub fn adjusted(&self, step: f64) -> Self {
        let step = if self.unit.is_weight_like() {
            step
        } else if step > 0.0 {
            1.0
        } else if step < 0.0 {
            -1.0
        } else {
            0.0
        };
        Self::new(self.quantity + step, self.unit)
    }

    /// Fixed-constant gram equivalent, or None for pieces
    fn grams(&self) -> Option<f64> {
        self.unit.grams_per_unit().map(|factor| self.quantity * factor)
    }
}

/// Parse a quantity the way a numeric text field is read
///
/// Uses the leading number ("150g" reads as 150). Anything that is not a
/// number, negative, or not finite reads as 0.
pub fn parse_quantity(input: &str) -> f64 {
    let value = leading_number(input.trim()).parse::<f64>().unwrap_or(0.0);
    coerce_quantity(value)
}

/// The decimal number at the start of `text`: sign, digits, fraction, exponent
fn leading_number(text: &str) -> &str {
    let bytes = text.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i = 1;
    }

    let int_end = digits_from(i);
    let mut end = int_end;
    let mut has_digits = int_end > i;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        has_digits |= frac_end > end + 1;
        end = frac_end;
    }
    if !has_digits {
        return "";
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    &text[..end]
}

/// Clamp a quantity into the valid range
pub fn coerce_quantity(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Compute whole nutrient totals for a serving of a food
pub fn compute_totals(food: &FoodReference, amount: &ServingAmount) -> NutrientTotals {
    let ratio = baseline_ratio(food, amount);
    food.profile.scale_to_totals(ratio)
}

/// Multiplier against the food's per-100-unit baseline
///
/// Pieces and cup-derived units need the food's own weights. When those are
/// missing the quantity itself is used as the multiplier.
pub fn baseline_ratio(food: &FoodReference, amount: &ServingAmount) -> f64 {
    let quantity = amount.quantity();

    let grams = match amount.unit {
        Unit::Gram | Unit::Millilitre | Unit::Ounce => amount.grams(),
        Unit::Piece => food.piece_grams().map(|w| quantity * w),
        Unit::Cup => food.cup_grams().map(|w| quantity * w),
        Unit::Tablespoon => food.cup_grams().map(|w| quantity * (w / TBSP_PER_CUP)),
        Unit::Teaspoon => food.cup_grams().map(|w| quantity * (w / TSP_PER_CUP)),
    };

    match grams {
        Some(grams) => grams / BASELINE_UNITS,
        None => {
            tracing::debug!(
                unit = %amount.unit,
                quantity,
                "No weight declared for unit, using quantity as the multiplier"
            );
            quantity
        }
    }
}

/// Rescale the stored totals of a logged serving to a new amount
pub fn rescale(
    previous_amount: &ServingAmount,
    previous_totals: &NutrientTotals,
    new_amount: &ServingAmount,
) -> NutrientTotals {
    let ratio = rescale_ratio(previous_amount, new_amount);
    previous_totals.scale(ratio)
}

/// Multiplier from a previous serving to a new one
///
/// Same-unit edits, and any edit involving pieces, compare quantities
/// directly. Other unit changes go through fixed gram equivalents.
pub fn rescale_ratio(previous_amount: &ServingAmount, new_amount: &ServingAmount) -> f64 {
    let direct = previous_amount.unit == new_amount.unit
        || previous_amount.unit == Unit::Piece
        || new_amount.unit == Unit::Piece;

    let (new_value, old_value) = if direct {
        (new_amount.quantity(), previous_amount.quantity())
    } else {
        (
            new_amount.grams().unwrap_or_else(|| new_amount.quantity()),
            previous_amount.grams().unwrap_or_else(|| previous_amount.quantity()),
        )
    };

    if old_value > 0.0 {
        new_value / old_value
    } else {
        1.0
    }
}

fn usable_weight(weight: Option<f64>) -> Option<f64> {
    weight.filter(|w| w.is_finite() && *w > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apple() -> FoodReference {
        FoodReference::new(NutrientProfile::new(52.0, 0.3, 14.0, 0.2))
    }

    fn rice() -> FoodReference {
        FoodReference::new(NutrientProfile::new(130.0, 2.7, 28.0, 0.3))
            .with_cup_weight(Some(240.0))
            .with_piece_weight(Some(20.0))
    }

    fn totals(calories: i64, protein: i64, carbs: i64, fat: i64) -> NutrientTotals {
        NutrientTotals { calories, protein, carbs, fat }
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("150"), 150.0);
        assert_eq!(parse_quantity(" 2.5 "), 2.5);
        assert_eq!(parse_quantity("150g"), 150.0);
        assert_eq!(parse_quantity(".5"), 0.5);
        assert_eq!(parse_quantity("abc"), 0.0);
        assert_eq!(parse_quantity(""), 0.0);
        assert_eq!(parse_quantity("-5"), 0.0);
        assert_eq!(parse_quantity("inf"), 0.0);
        assert_eq!(parse_quantity("NaN"), 0.0);
        assert_eq!(parse_quantity("5."), 5.0);
        assert_eq!(parse_quantity("."), 0.0);
        assert_eq!(parse_quantity("+2.5cups"), 2.5);
    }

    #[test]
    fn test_parse_quantity_exponents() {
        assert_eq!(parse_quantity("1e2"), 100.0);
        assert_eq!(parse_quantity("2.5E-1g"), 0.25);
        assert_eq!(parse_quantity("3e"), 3.0);
        assert_eq!(parse_quantity("3e+x"), 3.0);
        assert_eq!(parse_quantity("1e999"), 0.0);
    }

    #[test]
    fn test_parse_quantity_long_input() {
        let input = format!("{}{}", "7".repeat(5), "x".repeat(200_000));
        assert_eq!(parse_quantity(&input), 77777.0);

        let digits = "1".repeat(100_000);
        assert!(parse_quantity(&format!("{}junk", digits)).is_finite());
    }

    #[test]
    fn test_serving_amount_coerces_negative() {
        assert_eq!(ServingAmount::new(-5.0, Unit::Gram).quantity(), 0.0);
        assert_eq!(ServingAmount::new(f64::NAN, Unit::Cup).quantity(), 0.0);
    }

    #[test]
    fn test_grams_match_formula() {
        let food = apple();
        for q in [0.0, 1.0, 33.0, 100.0, 150.0, 275.5] {
            let result = compute_totals(&food, &ServingAmount::new(q, Unit::Gram));
            assert_eq!(result.calories, (52.0 * q / 100.0_f64).round() as i64);
        }
    }

    #[test]
    fn test_apple_150g() {
        let result = compute_totals(&apple(), &ServingAmount::new(150.0, Unit::Gram));
        assert_eq!(result, totals(78, 0, 21, 0));
    }

    #[test]
    fn test_millilitres_equal_grams() {
        let food = apple();
        assert_eq!(
            compute_totals(&food, &ServingAmount::new(250.0, Unit::Millilitre)),
            compute_totals(&food, &ServingAmount::new(250.0, Unit::Gram)),
        );
    }

    #[test]
    fn test_ounce() {
        // 2 oz = 56.699 g
        let result = compute_totals(&apple(), &ServingAmount::new(2.0, Unit::Ounce));
        assert_eq!(result.calories, 29);
        assert_eq!(result.carbs, 8);
    }

    #[test]
    fn test_cup_matches_grams() {
        let food = rice();
        assert_eq!(
            compute_totals(&food, &ServingAmount::new(1.0, Unit::Cup)),
            compute_totals(&food, &ServingAmount::new(240.0, Unit::Gram)),
        );
    }

    #[test]
    fn test_spoons_derive_from_cup_weight() {
        let food = rice();
        // 16 tbsp and 48 tsp are a cup
        let cup = compute_totals(&food, &ServingAmount::new(1.0, Unit::Cup));
        assert_eq!(compute_totals(&food, &ServingAmount::new(16.0, Unit::Tablespoon)), cup);
        assert_eq!(compute_totals(&food, &ServingAmount::new(48.0, Unit::Teaspoon)), cup);

        // 2 tbsp = 30 g of rice
        let tbsp = compute_totals(&food, &ServingAmount::new(2.0, Unit::Tablespoon));
        assert_eq!(tbsp.calories, 39);
    }

    #[test]
    fn test_piece_weight() {
        // 3 pieces x 20 g = 60 g
        let result = compute_totals(&rice(), &ServingAmount::new(3.0, Unit::Piece));
        assert_eq!(result.calories, 78);
    }

    #[test]
    fn test_piece_fallback_without_weight() {
        let result = compute_totals(&apple(), &ServingAmount::new(2.0, Unit::Piece));
        assert_eq!(result, totals(104, 1, 28, 0));
        assert_eq!(baseline_ratio(&apple(), &ServingAmount::new(2.0, Unit::Piece)), 2.0);
    }

    #[test]
    fn test_cup_fallback_without_weight() {
        let food = apple();
        for unit in [Unit::Cup, Unit::Tablespoon, Unit::Teaspoon] {
            assert_eq!(baseline_ratio(&food, &ServingAmount::new(3.0, unit)), 3.0);
        }
    }

    #[test]
    fn test_zero_weight_is_undefined() {
        let food = apple().with_piece_weight(Some(0.0)).with_cup_weight(Some(-10.0));
        assert_eq!(baseline_ratio(&food, &ServingAmount::new(2.0, Unit::Piece)), 2.0);
        assert_eq!(baseline_ratio(&food, &ServingAmount::new(2.0, Unit::Cup)), 2.0);
    }

    #[test]
    fn test_negative_quantity_yields_zero() {
        let result = compute_totals(&apple(), &ServingAmount::new(-5.0, Unit::Gram));
        assert_eq!(result, NutrientTotals::zero());

        let result = compute_totals(&apple(), &ServingAmount::parse("garbage", Unit::Gram));
        assert_eq!(result, NutrientTotals::zero());
    }

    #[test]
    fn test_negative_baseline_is_clamped() {
        let food = FoodReference::new(NutrientProfile::new(-52.0, 1.0, 1.0, 1.0));
        let result = compute_totals(&food, &ServingAmount::new(100.0, Unit::Gram));
        assert_eq!(result.calories, 0);
    }

    #[test]
    fn test_rescale_same_amount_is_identity() {
        let stored = totals(200, 10, 20, 5);
        for unit in Unit::ALL {
            let amount = ServingAmount::new(3.0, unit);
            assert_eq!(rescale(&amount, &stored, &amount), stored);
        }
    }

    #[test]
    fn test_rescale_same_unit() {
        let stored = totals(200, 10, 20, 5);
        let result = rescale(
            &ServingAmount::new(100.0, Unit::Gram),
            &stored,
            &ServingAmount::new(250.0, Unit::Gram),
        );
        assert_eq!(result, totals(500, 25, 50, 13));
    }

    #[test]
    fn test_rescale_grams_to_ounce() {
        let result = rescale(
            &ServingAmount::new(100.0, Unit::Gram),
            &totals(200, 10, 20, 5),
            &ServingAmount::new(1.0, Unit::Ounce),
        );
        assert_eq!(result, totals(57, 3, 6, 1));
    }

    #[test]
    fn test_rescale_cup_to_tablespoons() {
        let result = rescale(
            &ServingAmount::new(1.0, Unit::Cup),
            &totals(320, 16, 32, 16),
            &ServingAmount::new(8.0, Unit::Tablespoon),
        );
        // 8 x 14.7868 / 236.588 = 0.5
        assert_eq!(result, totals(160, 8, 16, 8));
    }

    #[test]
    fn test_rescale_piece_compares_quantities() {
        let stored = totals(150, 12, 2, 10);
        // pieces have no fixed gram equivalent, so 2 pc -> 4 g doubles
        let result = rescale(
            &ServingAmount::new(2.0, Unit::Piece),
            &stored,
            &ServingAmount::new(4.0, Unit::Gram),
        );
        assert_eq!(result, totals(300, 24, 4, 20));
    }

    #[test]
    fn test_rescale_zero_previous_keeps_totals() {
        let stored = totals(200, 10, 20, 5);
        let result = rescale(
            &ServingAmount::new(0.0, Unit::Gram),
            &stored,
            &ServingAmount::new(50.0, Unit::Gram),
        );
        assert_eq!(result, stored);

        let result = rescale(
            &ServingAmount::new(0.0, Unit::Cup),
            &stored,
            &ServingAmount::new(2.0, Unit::Ounce),
        );
        assert_eq!(result, stored);
    }

    #[test]
    fn test_rescale_to_zero() {
        let result = rescale(
            &ServingAmount::new(100.0, Unit::Gram),
            &totals(200, 10, 20, 5),
            &ServingAmount::new(0.0, Unit::Ounce),
        );
        assert_eq!(result, NutrientTotals::zero());
    }

    #[test]
    fn test_adjusted_weight_units_step_by_amount() {
        let amount = ServingAmount::new(100.0, Unit::Gram).adjusted(10.0);
        assert_eq!(amount.quantity(), 110.0);

        let amount = ServingAmount::new(5.0, Unit::Gram).adjusted(-10.0);
        assert_eq!(amount.quantity(), 0.0);
    }

    #[test]
    fn test_adjusted_count_units_step_by_one() {
        let amount = ServingAmount::new(2.0, Unit::Cup).adjusted(10.0);
        assert_eq!(amount.quantity(), 3.0);

        let amount = ServingAmount::new(2.0, Unit::Piece).adjusted(-50.0);
        assert_eq!(amount.quantity(), 1.0);

        let amount = ServingAmount::new(0.0, Unit::Teaspoon).adjusted(-1.0);
        assert_eq!(amount.quantity(), 0.0);
    }
}
