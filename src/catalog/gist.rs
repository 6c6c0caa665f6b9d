//! Generic food list
//!
//! A small hand-maintained JSON array of everyday foods, some of which know
//! how much one piece or one cup weighs.

use reqwest::Client;
use serde::Deserialize;

use super::{CatalogError, CatalogFood, CatalogResult, FoodSource};
use crate::models::NutrientProfile;
use crate::nutrition::Unit;

/// One entry of the list as published
#[derive(Debug, Deserialize)]
struct GistFood {
    name: String,
    unit: Option<String>,
    piece_weight: Option<f64>,
    cup_weight: Option<f64>,
    /// kcal
    c: Option<f64>,
    /// protein
    p: Option<f64>,
    /// carbohydrate
    cb: Option<f64>,
    /// fat
    f: Option<f64>,
}

impl From<GistFood> for CatalogFood {
    fn from(food: GistFood) -> Self {
        Self {
            code: format!("gist-{}", food.name),
            name: food.name,
            brand: "Generic".to_string(),
            source: FoodSource::Generic,
            default_unit: Unit::from_code_or_default(food.unit.as_deref()),
            nutrients: NutrientProfile::new(
                food.c.unwrap_or(0.0),
                food.p.unwrap_or(0.0),
                food.cb.unwrap_or(0.0),
                food.f.unwrap_or(0.0),
            ),
            piece_weight: food.piece_weight,
            cup_weight: food.cup_weight,
            personal_id: None,
        }
    }
}

/// Parse the published list
pub fn parse(body: &str) -> CatalogResult<Vec<CatalogFood>> {
    let foods: Vec<GistFood> = serde_json::from_str(body)?;
    Ok(foods.into_iter().map(CatalogFood::from).collect())
}

/// Download and parse the list
pub async fn fetch(client: &Client, url: &str) -> CatalogResult<Vec<CatalogFood>> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CatalogError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await?;
    parse(&body)
}

/// Shortest non-empty query that produces suggestions
pub const MIN_QUERY_CHARS: usize = 2;

/// First `limit` foods whose name contains the query, case-insensitive
///
/// An empty query matches everything; a one-character query matches nothing.
pub fn matching(foods: &[CatalogFood], query: &str, limit: usize) -> Vec<CatalogFood> {
    let needle = query.trim().to_lowercase();
    if !needle.is_empty() && needle.chars().count() < MIN_QUERY_CHARS {
        return Vec::new();
    }
    foods
        .iter()
        .filter(|f| f.name.to_lowercase().contains(&needle))
        .take(limit)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {"name": "Apple", "unit": "pc", "piece_weight": 182, "c": 52, "p": 0.3, "cb": 14, "f": 0.2},
        {"name": "White Rice (cooked)", "unit": "cup", "cup_weight": 158, "c": 130, "p": 2.7, "cb": 28, "f": 0.3},
        {"name": "Pineapple", "c": 50, "p": 0.5, "cb": 13},
        {"name": "Apricot", "unit": "parsec", "c": 48, "p": 1.4, "cb": 11, "f": 0.4}
    ]"#;

    #[test]
    fn test_parse_entries() {
        let foods = parse(SAMPLE).unwrap();
        assert_eq!(foods.len(), 4);

        let apple = &foods[0];
        assert_eq!(apple.code, "gist-Apple");
        assert_eq!(apple.brand, "Generic");
        assert_eq!(apple.default_unit, Unit::Piece);
        assert_eq!(apple.piece_weight, Some(182.0));
        assert_eq!(apple.nutrients.calories, 52.0);

        let rice = &foods[1];
        assert_eq!(rice.default_unit, Unit::Cup);
        assert_eq!(rice.cup_weight, Some(158.0));
    }

    #[test]
    fn test_missing_fields_default() {
        let foods = parse(SAMPLE).unwrap();

        let pineapple = &foods[2];
        assert_eq!(pineapple.default_unit, Unit::Gram);
        assert_eq!(pineapple.nutrients.fat, 0.0);

        // Unknown unit codes fall back to grams
        assert_eq!(foods[3].default_unit, Unit::Gram);
    }

    #[test]
    fn test_parse_rejects_non_array() {
        assert!(matches!(parse(r#"{"name": "Apple"}"#), Err(CatalogError::Decode(_))));
    }

    #[test]
    fn test_matching_is_case_insensitive_and_limited() {
        let foods = parse(SAMPLE).unwrap();

        let hits = matching(&foods, "APP", 5);
        let names: Vec<&str> = hits.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Apple", "Pineapple"]);

        assert_eq!(matching(&foods, "ap", 1).len(), 1);
        assert!(matching(&foods, "quinoa", 5).is_empty());
    }

    #[test]
    fn test_single_character_query_has_no_suggestions() {
        let foods = parse(SAMPLE).unwrap();
        assert!(matching(&foods, "a", 5).is_empty());
        assert!(matching(&foods, " p ", 5).is_empty());
        assert_eq!(matching(&foods, "pi", 5).len(), 1);
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let foods = parse(SAMPLE).unwrap();
        assert_eq!(matching(&foods, "", 3).len(), 3);
    }
}
