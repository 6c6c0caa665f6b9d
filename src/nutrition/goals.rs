//! Calorie and macro goals
//!
//! Mifflin-St Jeor BMR scaled by an activity factor, shifted by a weight
//! change offset, then split into macro grams by percentage.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lowest daily calorie target the calculator will produce
pub const MIN_CALORIE_TARGET: i64 = 1200;
/// Lowest calorie goal accepted when set by hand
pub const MIN_MANUAL_CALORIE_GOAL: i64 = 500;
/// Calorie goal used before any goal is stored
pub const DEFAULT_CALORIE_GOAL: i64 = 2000;

/// Energy per gram of protein and carbohydrate
const KCAL_PER_G_PROTEIN_CARB: f64 = 4.0;
/// Energy per gram of fat
const KCAL_PER_G_FAT: f64 = 9.0;

/// Goal validation errors
#[derive(Debug, Error, PartialEq)]
pub enum GoalError {
    #[error("Your macros sum to {0}%. They must equal exactly 100%.")]
    MacroSum(i64),

    #[error("Please enter a realistic {field} ({min} - {max}).")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
    },

    #[error("Please enter a valid calorie goal (at least 500 kcal).")]
    CalorieGoalTooLow,
}

/// Sex used by the BMR formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    #[default]
    Male,
    Female,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }

    /// Anything other than "male" reads as female
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().trim() {
            "male" | "m" => Sex::Male,
            _ => Sex::Female,
        }
    }
}

/// Activity level and its TDEE multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Desk job, little exercise
    #[default]
    Sedentary,
    /// 1-3 days a week
    LightlyActive,
    /// 3-5 days a week
    ModeratelyActive,
    /// 6-7 days a week
    VeryActive,
}

impl ActivityLevel {
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::LightlyActive => 1.375,
            ActivityLevel::ModeratelyActive => 1.55,
            ActivityLevel::VeryActive => 1.725,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::LightlyActive => "lightly_active",
            ActivityLevel::ModeratelyActive => "moderately_active",
            ActivityLevel::VeryActive => "very_active",
        }
    }

    /// Parse a level name or a bare multiplier ("1.55")
    pub fn from_str(s: &str) -> Self {
        let lower = s.to_lowercase();
        match lower.trim() {
            "lightly_active" | "light" | "1.375" => ActivityLevel::LightlyActive,
            "moderately_active" | "moderate" | "1.55" => ActivityLevel::ModeratelyActive,
            "very_active" | "very" | "1.725" => ActivityLevel::VeryActive,
            _ => ActivityLevel::Sedentary,
        }
    }
}

/// Weekly weight change goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeightGoal {
    LoseOneKg,
    LoseHalfKg,
    #[default]
    Maintain,
    GainHalfKg,
    GainOneKg,
}

impl WeightGoal {
    /// Daily calorie offset applied to TDEE
    pub fn calorie_offset(&self) -> f64 {
        match self {
            WeightGoal::LoseOneKg => -1100.0,
            WeightGoal::LoseHalfKg => -550.0,
            WeightGoal::Maintain => 0.0,
            WeightGoal::GainHalfKg => 550.0,
            WeightGoal::GainOneKg => 1100.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeightGoal::LoseOneKg => "lose_one_kg",
            WeightGoal::LoseHalfKg => "lose_half_kg",
            WeightGoal::Maintain => "maintain",
            WeightGoal::GainHalfKg => "gain_half_kg",
            WeightGoal::GainOneKg => "gain_one_kg",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().trim() {
            "lose_one_kg" => WeightGoal::LoseOneKg,
            "lose_half_kg" => WeightGoal::LoseHalfKg,
            "gain_half_kg" => WeightGoal::GainHalfKg,
            "gain_one_kg" => WeightGoal::GainOneKg,
            _ => WeightGoal::Maintain,
        }
    }
}

/// Body profile feeding the calorie calculation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub weight_kg: f64,
    pub target_weight_kg: f64,
    pub height_cm: f64,
    pub age: u32,
    pub sex: Sex,
    pub activity: ActivityLevel,
    pub goal: WeightGoal,
}

impl Profile {
    /// Reject values outside realistic human ranges
    pub fn validate(&self) -> Result<(), GoalError> {
        check_range("weight", self.weight_kg, 20.0, 300.0)?;
        check_range("target weight", self.target_weight_kg, 20.0, 300.0)?;
        check_range("height", self.height_cm, 50.0, 250.0)?;
        check_range("age", f64::from(self.age), 10.0, 100.0)?;
        Ok(())
    }

    /// Basal metabolic rate in kcal/day
    pub fn bmr(&self) -> f64 {
        bmr(self.weight_kg, self.height_cm, self.age, self.sex)
    }

    /// Total daily energy expenditure in kcal/day
    pub fn tdee(&self) -> f64 {
        self.bmr() * self.activity.multiplier()
    }

    /// Daily calorie target, never below [`MIN_CALORIE_TARGET`]
    pub fn calorie_target(&self) -> i64 {
        let target = (self.tdee() + self.goal.calorie_offset()).round() as i64;
        target.max(MIN_CALORIE_TARGET)
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), GoalError> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(GoalError::OutOfRange { field, min, max })
    }
}

/// Mifflin-St Jeor basal metabolic rate
///
/// BMR = 10 x weight_kg + 6.25 x height_cm - 5 x age, then +5 for men and
/// -161 for women.
pub fn bmr(weight_kg: f64, height_cm: f64, age: u32, sex: Sex) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age);
    match sex {
        Sex::Male => base + 5.0,
        Sex::Female => base - 161.0,
    }
}

/// Macro split as whole percentages of calories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroRatios {
    pub protein: i64,
    pub carbs: i64,
    pub fat: i64,
}

impl Default for MacroRatios {
    fn default() -> Self {
        Self { protein: 30, carbs: 35, fat: 35 }
    }
}

impl MacroRatios {
    /// Stored ratios, with unset or zero values replaced by the defaults
    pub fn or_defaults(protein: Option<i64>, carbs: Option<i64>, fat: Option<i64>) -> Self {
        let defaults = Self::default();
        let pick = |v: Option<i64>, d: i64| v.filter(|v| *v > 0).unwrap_or(d);
        Self {
            protein: pick(protein, defaults.protein),
            carbs: pick(carbs, defaults.carbs),
            fat: pick(fat, defaults.fat),
        }
    }

    pub fn validate(&self) -> Result<(), GoalError> {
        let sum = self.protein + self.carbs + self.fat;
        if sum != 100 {
            return Err(GoalError::MacroSum(sum));
        }
        Ok(())
    }

    /// Gram targets for a daily calorie goal
    pub fn grams_for(&self, calories: i64) -> MacroGrams {
        let share = |pct: i64| calories as f64 * pct as f64 / 100.0;
        MacroGrams {
            protein: (share(self.protein) / KCAL_PER_G_PROTEIN_CARB).round() as i64,
            carbs: (share(self.carbs) / KCAL_PER_G_PROTEIN_CARB).round() as i64,
            fat: (share(self.fat) / KCAL_PER_G_FAT).round() as i64,
        }
    }
}

/// Daily macro targets in grams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroGrams {
    pub protein: i64,
    pub carbs: i64,
    pub fat: i64,
}

impl Default for MacroGrams {
    fn default() -> Self {
        Self { protein: 150, carbs: 200, fat: 70 }
    }
}

/// Validate a calorie goal typed in by hand
pub fn validate_manual_calorie_goal(calories: i64) -> Result<i64, GoalError> {
    if calories < MIN_MANUAL_CALORIE_GOAL {
        return Err(GoalError::CalorieGoalTooLow);
    }
    Ok(calories)
}

/// Calories implied by macros (4/4/9 kcal per gram)
pub fn atwater_calories(protein: f64, carbs: f64, fat: f64) -> i64 {
    let kcal = protein * KCAL_PER_G_PROTEIN_CARB
        + carbs * KCAL_PER_G_PROTEIN_CARB
        + fat * KCAL_PER_G_FAT;
    crate::models::round_nutrient(kcal)
}

/// Progress of one consumed total against its goal
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GoalProgress {
    pub consumed: i64,
    pub goal: i64,
    /// Percent of goal reached, capped at 100
    pub percent: f64,
    /// Absolute distance to the goal
    pub remaining: i64,
    /// True when consumption exceeds the goal
    pub over: bool,
}

impl GoalProgress {
    pub fn new(consumed: i64, goal: i64) -> Self {
        let percent = if goal > 0 {
            (consumed as f64 / goal as f64 * 100.0).min(100.0)
        } else {
            0.0
        };
        let diff = goal - consumed;
        Self {
            consumed,
            goal,
            percent,
            remaining: diff.abs(),
            over: diff < 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> Profile {
        Profile {
            weight_kg: 80.0,
            target_weight_kg: 75.0,
            height_cm: 180.0,
            age: 30,
            sex: Sex::Male,
            activity: ActivityLevel::ModeratelyActive,
            goal: WeightGoal::LoseHalfKg,
        }
    }

    #[test]
    fn test_bmr_male_female() {
        // 800 + 1125 - 150 = 1775 before the sex constant
        assert_eq!(bmr(80.0, 180.0, 30, Sex::Male), 1780.0);
        assert_eq!(bmr(80.0, 180.0, 30, Sex::Female), 1614.0);
    }

    #[test]
    fn test_calorie_target() {
        // 1780 x 1.55 = 2759, minus 550
        assert_eq!(profile().calorie_target(), 2209);
    }

    #[test]
    fn test_calorie_target_floor() {
        let small = Profile {
            weight_kg: 40.0,
            target_weight_kg: 40.0,
            height_cm: 150.0,
            age: 70,
            sex: Sex::Female,
            activity: ActivityLevel::Sedentary,
            goal: WeightGoal::LoseOneKg,
        };
        assert_eq!(small.calorie_target(), MIN_CALORIE_TARGET);
    }

    #[test]
    fn test_profile_validation() {
        assert!(profile().validate().is_ok());

        let heavy = Profile { weight_kg: 301.0, ..profile() };
        assert!(matches!(heavy.validate(), Err(GoalError::OutOfRange { field: "weight", .. })));

        let short = Profile { height_cm: 40.0, ..profile() };
        assert!(matches!(short.validate(), Err(GoalError::OutOfRange { field: "height", .. })));

        let young = Profile { age: 9, ..profile() };
        assert!(matches!(young.validate(), Err(GoalError::OutOfRange { field: "age", .. })));
    }

    #[test]
    fn test_macro_ratios_must_sum_to_100() {
        assert!(MacroRatios::default().validate().is_ok());
        let bad = MacroRatios { protein: 40, carbs: 40, fat: 30 };
        assert_eq!(bad.validate(), Err(GoalError::MacroSum(110)));
    }

    #[test]
    fn test_macro_grams() {
        let grams = MacroRatios::default().grams_for(2000);
        assert_eq!(grams, MacroGrams { protein: 150, carbs: 175, fat: 78 });
    }

    #[test]
    fn test_ratios_or_defaults() {
        let ratios = MacroRatios::or_defaults(Some(40), None, Some(0));
        assert_eq!(ratios, MacroRatios { protein: 40, carbs: 35, fat: 35 });
    }

    #[test]
    fn test_manual_calorie_goal() {
        assert_eq!(validate_manual_calorie_goal(1800), Ok(1800));
        assert_eq!(validate_manual_calorie_goal(499), Err(GoalError::CalorieGoalTooLow));
    }

    #[test]
    fn test_atwater_calories() {
        assert_eq!(atwater_calories(10.0, 20.0, 5.0), 165);
        assert_eq!(atwater_calories(0.0, 0.0, 0.0), 0);
    }

    #[test]
    fn test_goal_progress() {
        let under = GoalProgress::new(1500, 2000);
        assert_eq!(under.percent, 75.0);
        assert_eq!(under.remaining, 500);
        assert!(!under.over);

        let over = GoalProgress::new(2300, 2000);
        assert_eq!(over.percent, 100.0);
        assert_eq!(over.remaining, 300);
        assert!(over.over);

        assert_eq!(GoalProgress::new(100, 0).percent, 0.0);
    }

    #[test]
    fn test_activity_parsing() {
        assert_eq!(ActivityLevel::from_str("1.55"), ActivityLevel::ModeratelyActive);
        assert_eq!(ActivityLevel::from_str("very_active"), ActivityLevel::VeryActive);
        assert_eq!(ActivityLevel::from_str("unknown"), ActivityLevel::Sedentary);
    }
}
