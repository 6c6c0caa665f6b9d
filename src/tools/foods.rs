//! Food Catalog MCP Tools
//!
//! Search, barcode lookup and serving previews across personal foods, the
//! generic food list and Open Food Facts.

use serde::Serialize;

use crate::catalog::{merge_results, parse_personal_code, Catalog, CatalogFood};
use crate::db::Database;
use crate::models::{NutrientProfile, NutrientTotals, PersonalFood};
use crate::nutrition::{compute_totals, ServingAmount, Unit};

/// Personal foods returned per search
const PERSONAL_SEARCH_LIMIT: i64 = 50;

/// How a tool call names a food
#[derive(Debug, Clone)]
pub enum FoodSelector {
    /// A catalog code from search results, or a bare barcode
    Code(String),
    /// Per-100-unit values given directly
    Inline {
        name: String,
        nutrients: NutrientProfile,
        piece_weight: Option<f64>,
        cup_weight: Option<f64>,
    },
}

/// Response for search_foods
#[derive(Debug, Serialize)]
pub struct SearchFoodsResponse {
    pub query: String,
    pub results: Vec<CatalogFood>,
    pub total: usize,
    /// Set when Open Food Facts could not be reached
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_search_error: Option<String>,
}

/// Response for lookup_barcode
#[derive(Debug, Serialize)]
pub struct LookupBarcodeResponse {
    pub barcode: String,
    pub found: bool,
    pub food: Option<CatalogFood>,
}

/// Response for preview_serving
#[derive(Debug, Serialize)]
pub struct PreviewServingResponse {
    pub food: CatalogFood,
    pub serving: ServingAmount,
    pub totals: NutrientTotals,
}

/// Search all food sources
///
/// An empty query only returns generic suggestions.
pub async fn search_foods(
    db: &Database,
    catalog: &Catalog,
    query: &str,
) -> Result<SearchFoodsResponse, String> {
    let query = query.trim();

    if query.is_empty() {
        let results = catalog.suggestions("").await;
        return Ok(SearchFoodsResponse {
            query: String::new(),
            total: results.len(),
            results,
            product_search_error: None,
        });
    }

    let personal: Vec<CatalogFood> = {
        let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
        PersonalFood::search(&conn, query, PERSONAL_SEARCH_LIMIT)
            .map_err(|e| format!("Search failed: {}", e))?
            .iter()
            .map(CatalogFood::from)
            .collect()
    };

    let suggestions = catalog.suggestions(query).await;

    let (products, product_search_error) = match catalog.search_products(query).await {
        Ok(products) => (products, None),
        Err(e) => {
            tracing::warn!("Open Food Facts search failed: {}", e);
            (Vec::new(), Some(e.to_string()))
        }
    };

    let results = merge_results(personal, suggestions, products);

    Ok(SearchFoodsResponse {
        query: query.to_string(),
        total: results.len(),
        results,
        product_search_error,
    })
}

/// Look up a packaged product by barcode
pub async fn lookup_barcode(catalog: &Catalog, barcode: &str) -> Result<LookupBarcodeResponse, String> {
    let barcode = barcode.trim();
    if barcode.is_empty() {
        return Err("barcode cannot be empty".to_string());
    }

    let food = catalog
        .lookup_barcode(barcode)
        .await
        .map_err(|e| format!("Barcode lookup failed: {}", e))?;

    Ok(LookupBarcodeResponse {
        barcode: barcode.to_string(),
        found: food.is_some(),
        food,
    })
}

/// Compute what a serving of a food amounts to, without logging it
///
/// `step` nudges the resolved serving the way a +/- stepper would.
pub async fn preview_serving(
    db: &Database,
    catalog: &Catalog,
    selector: FoodSelector,
    quantity: Option<&str>,
    unit: Option<&str>,
    step: Option<f64>,
) -> Result<PreviewServingResponse, String> {
    let food = select_food(db, catalog, selector).await?;
    let mut serving = serving_for(&food, quantity, unit)?;
    if let Some(step) = step.filter(|s| s.is_finite()) {
        serving = serving.adjusted(step);
    }
    let totals = compute_totals(&food.reference(), &serving);

    Ok(PreviewServingResponse { food, serving, totals })
}

/// Resolve a selector to a catalog food
pub async fn select_food(
    db: &Database,
    catalog: &Catalog,
    selector: FoodSelector,
) -> Result<CatalogFood, String> {
    match selector {
        FoodSelector::Inline { name, nutrients, piece_weight, cup_weight } => {
            let name = name.trim();
            if name.is_empty() {
                return Err("Food name cannot be empty".to_string());
            }
            Ok(CatalogFood::inline(name, nutrients, piece_weight, cup_weight))
        }
        FoodSelector::Code(code) => {
            let code = code.trim();
            if let Some(id) = parse_personal_code(code) {
                let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
                let food = PersonalFood::get_by_id(&conn, id)
                    .map_err(|e| format!("Failed to get personal food: {}", e))?
                    .ok_or_else(|| format!("Personal food not found with id: {}", id))?;
                return Ok(CatalogFood::from(&food));
            }

            if code.starts_with("gist-") {
                return catalog
                    .generic_by_code(code)
                    .await
                    .ok_or_else(|| format!("Generic food not found: {}", code));
            }

            catalog
                .lookup_barcode(code)
                .await
                .map_err(|e| format!("Barcode lookup failed: {}", e))?
                .ok_or_else(|| format!("No product found for barcode: {}", code))
        }
    }
}

/// Unit named by a tool call, or `fallback` when none was given
pub fn resolve_unit(code: Option<&str>, fallback: Unit) -> Result<Unit, String> {
    match code.map(str::trim).filter(|c| !c.is_empty()) {
        Some(code) => Unit::parse(code).ok_or_else(|| {
            format!("Unknown unit '{}', expected one of g, ml, oz, tsp, tbsp, cup, pc", code)
        }),
        None => Ok(fallback),
    }
}

/// The serving a tool call asks for, filling gaps from the food's defaults
///
/// A missing unit means the food's default unit; a missing quantity means
/// that unit's starting quantity.
pub fn serving_for(
    food: &CatalogFood,
    quantity: Option<&str>,
    unit: Option<&str>,
) -> Result<ServingAmount, String> {
    let unit = resolve_unit(unit, food.default_unit)?;

    Ok(match quantity {
        Some(q) => ServingAmount::parse(q, unit),
        None => ServingAmount::new(unit.default_quantity(), unit),
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::PersonalFoodCreate;

    /// A catalog whose remote sources are unreachable
    fn offline_catalog() -> Catalog {
        Catalog::with_urls(
            "http://127.0.0.1:9",
            "http://127.0.0.1:9/foods.json",
            Duration::from_secs(2),
        )
    }

    fn setup() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();
        db
    }

    fn add_banana(db: &Database) -> PersonalFood {
        let conn = db.get_conn().unwrap();
        PersonalFood::create(&conn, &PersonalFoodCreate {
            name: "Banana".to_string(),
            calories: 89.0,
            protein: 1.1,
            carbs: 22.8,
            fat: 0.3,
            default_unit: Unit::Piece,
            piece_weight: Some(118.0),
            cup_weight: None,
        })
        .unwrap()
    }

    fn apple() -> FoodSelector {
        FoodSelector::Inline {
            name: "Apple".to_string(),
            nutrients: NutrientProfile::new(52.0, 0.3, 14.0, 0.2),
            piece_weight: None,
            cup_weight: None,
        }
    }

    #[tokio::test]
    async fn test_preview_inline_food() {
        let db = setup();
        let preview = preview_serving(&db, &offline_catalog(), apple(), Some("150"), Some("g"), None)
            .await
            .unwrap();

        assert_eq!(preview.totals, NutrientTotals { calories: 78, protein: 0, carbs: 21, fat: 0 });
        assert_eq!(preview.food.name, "Apple");
    }

    #[tokio::test]
    async fn test_preview_personal_food_uses_defaults() {
        let db = setup();
        let banana = add_banana(&db);

        let preview = preview_serving(
            &db,
            &offline_catalog(),
            FoodSelector::Code(format!("personal-{}", banana.id)),
            None,
            None,
            None,
        )
        .await
        .unwrap();

        // One piece of 118 g: 89 x 1.18
        assert_eq!(preview.serving, ServingAmount::new(1.0, Unit::Piece));
        assert_eq!(preview.totals.calories, 105);
        assert_eq!(preview.totals.carbs, 27);
    }

    #[tokio::test]
    async fn test_preview_applies_step() {
        let db = setup();
        let catalog = offline_catalog();

        // Grams move by the step itself
        let preview = preview_serving(&db, &catalog, apple(), Some("150"), Some("g"), Some(50.0))
            .await
            .unwrap();
        assert_eq!(preview.serving, ServingAmount::new(200.0, Unit::Gram));
        assert_eq!(preview.totals.calories, 104);

        // Pieces move by one whatever the step size
        let banana = add_banana(&db);
        let preview = preview_serving(
            &db,
            &catalog,
            FoodSelector::Code(format!("personal-{}", banana.id)),
            None,
            None,
            Some(10.0),
        )
        .await
        .unwrap();
        assert_eq!(preview.serving, ServingAmount::new(2.0, Unit::Piece));
        assert_eq!(preview.totals.calories, 210);

        let preview = preview_serving(&db, &catalog, apple(), Some("20"), Some("g"), Some(-50.0))
            .await
            .unwrap();
        assert_eq!(preview.serving.quantity(), 0.0);
    }

    #[tokio::test]
    async fn test_select_missing_personal_food() {
        let db = setup();
        let err = select_food(&db, &offline_catalog(), FoodSelector::Code("personal-99".to_string()))
            .await
            .unwrap_err();
        assert!(err.contains("not found"));
    }

    #[tokio::test]
    async fn test_select_rejects_unnamed_inline_food() {
        let db = setup();
        let selector = FoodSelector::Inline {
            name: "  ".to_string(),
            nutrients: NutrientProfile::default(),
            piece_weight: None,
            cup_weight: None,
        };
        assert!(select_food(&db, &offline_catalog(), selector).await.is_err());
    }

    #[tokio::test]
    async fn test_search_keeps_personal_results_when_offline() {
        let db = setup();
        add_banana(&db);

        let response = search_foods(&db, &offline_catalog(), "bana").await.unwrap();
        assert_eq!(response.total, 1);
        assert_eq!(response.results[0].name, "Banana");
        assert!(response.product_search_error.is_some());
    }

    #[test]
    fn test_serving_for_defaults() {
        let food = CatalogFood::inline("Rice", NutrientProfile::default(), None, Some(158.0));

        assert_eq!(serving_for(&food, None, None).unwrap(), ServingAmount::new(100.0, Unit::Gram));
        assert_eq!(serving_for(&food, None, Some("cup")).unwrap(), ServingAmount::new(1.0, Unit::Cup));
        assert_eq!(
            serving_for(&food, Some("2.5"), Some("tbsp")).unwrap(),
            ServingAmount::new(2.5, Unit::Tablespoon)
        );
        assert_eq!(serving_for(&food, Some("abc"), Some(" ")).unwrap(), ServingAmount::new(0.0, Unit::Gram));
    }

    #[test]
    fn test_serving_for_rejects_unknown_unit() {
        let food = CatalogFood::inline("Steak", NutrientProfile::new(250.0, 26.0, 0.0, 15.0), None, None);

        for code in ["lb", "kg", "slice"] {
            let err = serving_for(&food, Some("1"), Some(code)).unwrap_err();
            assert!(err.contains("Unknown unit"), "{}", err);
        }
        assert_eq!(resolve_unit(Some("Cups"), Unit::Gram), Ok(Unit::Cup));
    }

    #[tokio::test]
    async fn test_preview_rejects_unknown_unit() {
        let db = setup();
        let result = preview_serving(&db, &offline_catalog(), apple(), Some("1"), Some("lb"), None).await;
        assert!(result.is_err());
    }
}
