//! Open Food Facts client
//!
//! Text search and barcode lookup against the public Open Food Facts API.
//! Nutrients are read per 100 g; products never carry piece or cup weights.

use reqwest::Client;
use serde_json::Value;

use super::{CatalogError, CatalogFood, CatalogResult, FoodSource};
use crate::models::NutrientProfile;
use crate::nutrition::Unit;

/// Products requested per search
pub const SEARCH_PAGE_SIZE: u32 = 10;

const UNKNOWN_NAME: &str = "Unknown Food";
const UNKNOWN_BRAND: &str = "Packaged";

// Nutriment keys in order of preference; older products only carry the bare names
const CALORIE_KEYS: &[&str] = &["energy-kcal_100g", "energy-kcal", "energy_value"];
const PROTEIN_KEYS: &[&str] = &["proteins_100g", "proteins"];
const CARB_KEYS: &[&str] = &["carbohydrates_100g", "carbohydrates"];
const FAT_KEYS: &[&str] = &["fat_100g", "fat"];

/// Search products by name
pub async fn search(client: &Client, base_url: &str, query: &str) -> CatalogResult<Vec<CatalogFood>> {
    let url = format!("{}/cgi/search.pl", base_url);
    let page_size = SEARCH_PAGE_SIZE.to_string();

    tracing::debug!(query, "Searching Open Food Facts");
    let body = get_json(
        client.get(&url).query(&[
            ("search_terms", query),
            ("search_simple", "1"),
            ("action", "process"),
            ("json", "1"),
            ("page_size", page_size.as_str()),
        ]),
        &url,
    )
    .await?;

    Ok(parse_search(&body))
}

/// Look up one product by barcode
pub async fn lookup(client: &Client, base_url: &str, barcode: &str) -> CatalogResult<Option<CatalogFood>> {
    let url = format!("{}/api/v0/product/{}.json", base_url, barcode.trim());

    tracing::debug!(barcode, "Looking up barcode");
    let body = get_json(client.get(&url), &url).await?;

    Ok(parse_product(&body))
}

async fn get_json(request: reqwest::RequestBuilder, url: &str) -> CatalogResult<Value> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CatalogError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

/// Products from a search response; entries without a code are skipped
pub fn parse_search(body: &Value) -> Vec<CatalogFood> {
    body.get("products")
        .and_then(Value::as_array)
        .map(|products| {
            products
                .iter()
                .filter_map(product_from_json)
                .filter(|food| !food.code.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// The product from a barcode response, when `status` is 1
pub fn parse_product(body: &Value) -> Option<CatalogFood> {
    if body.get("status").and_then(Value::as_i64) != Some(1) {
        return None;
    }
    let product = body.get("product")?;
    let mut food = product_from_json(product)?;

    // Some responses only carry the code at the top level
    if food.code.is_empty() {
        food.code = text(body, "code")?;
    }
    Some(food)
}

fn product_from_json(product: &Value) -> Option<CatalogFood> {
    if !product.is_object() {
        return None;
    }

    let code = text(product, "code").unwrap_or_default();
    let name = text(product, "product_name")
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_NAME.to_string());
    let brand = text(product, "brands")
        .filter(|b| !b.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_BRAND.to_string());

    let nutriments = product.get("nutriments");
    let nutrient = |keys: &[&str]| {
        nutriments
            .and_then(|n| keys.iter().find_map(|key| number(n, key)))
            .unwrap_or(0.0)
    };

    Some(CatalogFood {
        code,
        name,
        brand,
        source: FoodSource::OpenFoodFacts,
        default_unit: Unit::Gram,
        nutrients: NutrientProfile::new(
            nutrient(CALORIE_KEYS),
            nutrient(PROTEIN_KEYS),
            nutrient(CARB_KEYS),
            nutrient(FAT_KEYS),
        ),
        piece_weight: None,
        cup_weight: None,
        personal_id: None,
    })
}

/// A string field; numeric codes are rendered as text
fn text(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A numeric field; the API sometimes sends numbers as strings
fn number(value: &Value, key: &str) -> Option<f64> {
    let n = match value.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}
