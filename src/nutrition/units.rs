//! Unit types and conversion constants
//!
//! Provides the closed set of serving units and the fixed factors used to
//! turn them into gram equivalents.

use serde::{Deserialize, Serialize};

/// A serving unit
///
/// Serialized with the short codes used in storage ("g", "ml", "pc", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Unit {
    #[default]
    #[serde(rename = "g")]
    Gram,
    #[serde(rename = "ml")]
    Millilitre,
    #[serde(rename = "oz")]
    Ounce,
    #[serde(rename = "tsp")]
    Teaspoon,
    #[serde(rename = "tbsp")]
    Tablespoon,
    #[serde(rename = "cup")]
    Cup,
    #[serde(rename = "pc")]
    Piece,
}

// ============================================================================
// Conversion Constants
// ============================================================================

/// Grams per ounce
pub const G_PER_OZ: f64 = 28.3495;
/// Milliliters per teaspoon
pub const ML_PER_TSP: f64 = 4.92892;
/// Milliliters per tablespoon
pub const ML_PER_TBSP: f64 = 14.7868;
/// Milliliters per cup (US)
pub const ML_PER_CUP: f64 = 236.588;
/// Tablespoons in a cup
pub const TBSP_PER_CUP: f64 = 16.0;
/// Teaspoons in a cup
pub const TSP_PER_CUP: f64 = 48.0;
/// Nutrient profiles are stored per this many reference units
pub const BASELINE_UNITS: f64 = 100.0;

impl Unit {
    /// All units, in the order they are offered to the user
    pub const ALL: [Unit; 7] = [
        Unit::Gram,
        Unit::Millilitre,
        Unit::Ounce,
        Unit::Teaspoon,
        Unit::Tablespoon,
        Unit::Cup,
        Unit::Piece,
    ];

    /// Storage code for this unit
    pub fn code(&self) -> &'static str {
        match self {
            Unit::Gram => "g",
            Unit::Millilitre => "ml",
            Unit::Ounce => "oz",
            Unit::Teaspoon => "tsp",
            Unit::Tablespoon => "tbsp",
            Unit::Cup => "cup",
            Unit::Piece => "pc",
        }
    }

    /// Parse a unit code or spelling, returning None if unrecognised
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        let trimmed = lower.trim();

        match trimmed {
            "g" | "gram" | "grams" => Some(Unit::Gram),
            "ml" | "milliliter" | "milliliters" | "millilitre" | "millilitres" => {
                Some(Unit::Millilitre)
            }
            "oz" | "ounce" | "ounces" => Some(Unit::Ounce),
            "tsp" | "teaspoon" | "teaspoons" => Some(Unit::Teaspoon),
            "tbsp" | "tablespoon" | "tablespoons" => Some(Unit::Tablespoon),
            "cup" | "cups" => Some(Unit::Cup),
            "pc" | "pcs" | "piece" | "pieces" => Some(Unit::Piece),
            _ => None,
        }
    }

    /// Parse a stored unit code, falling back to grams
    pub fn from_code_or_default(s: Option<&str>) -> Self {
        s.and_then(Unit::parse).unwrap_or_default()
    }

    /// Fixed gram equivalent of one unit
    ///
    /// Volumes use water density and millilitres count 1:1 with grams.
    /// Pieces have no universal weight and return None.
    pub fn grams_per_unit(&self) -> Option<f64> {
        match self {
            Unit::Gram | Unit::Millilitre => Some(1.0),
            Unit::Ounce => Some(G_PER_OZ),
            Unit::Teaspoon => Some(ML_PER_TSP),
            Unit::Tablespoon => Some(ML_PER_TBSP),
            Unit::Cup => Some(ML_PER_CUP),
            Unit::Piece => None,
        }
    }

    /// Whether quantities in this unit are entered as continuous weights
    ///
    /// Steppers move weight-like units by the requested amount and every
    /// other unit by one.
    pub fn is_weight_like(&self) -> bool {
        matches!(self, Unit::Gram | Unit::Millilitre | Unit::Ounce)
    }

    /// Quantity a serving form opens at when this is the food's default unit
    pub fn default_quantity(&self) -> f64 {
        match self {
            Unit::Gram | Unit::Millilitre => BASELINE_UNITS,
            _ => 1.0,
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
