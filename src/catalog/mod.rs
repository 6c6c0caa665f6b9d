//! Food catalog
//!
//! Everything a serving can be computed against: the user's personal foods,
//! the shared generic food list and Open Food Facts products.

pub mod gist;
pub mod open_food_facts;

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::config::Config;
use crate::models::{NutrientProfile, PersonalFood};
use crate::nutrition::{FoodReference, Unit};

/// Generic foods shown per search
pub const SUGGESTION_LIMIT: usize = 5;

/// Catalog error types
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Where a catalog entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodSource {
    Personal,
    Generic,
    OpenFoodFacts,
    Inline,
}

/// A food that servings can be computed against
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogFood {
    /// `personal-{id}`, `gist-{name}` or the product barcode
    pub code: String,
    pub name: String,
    pub brand: String,
    pub source: FoodSource,
    pub default_unit: Unit,
    /// Per 100 units of the default unit
    pub nutrients: NutrientProfile,
    pub piece_weight: Option<f64>,
    pub cup_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal_id: Option<i64>,
}

impl CatalogFood {
    /// The part of this food the serving converter needs
    pub fn reference(&self) -> FoodReference {
        FoodReference::new(self.nutrients)
            .with_piece_weight(self.piece_weight)
            .with_cup_weight(self.cup_weight)
    }

    /// A food described directly by the caller
    pub fn inline(
        name: &str,
        nutrients: NutrientProfile,
        piece_weight: Option<f64>,
        cup_weight: Option<f64>,
    ) -> Self {
        Self {
            code: format!("inline-{}", name),
            name: name.to_string(),
            brand: "Custom".to_string(),
            source: FoodSource::Inline,
            default_unit: Unit::Gram,
            nutrients,
            piece_weight,
            cup_weight,
            personal_id: None,
        }
    }
}

impl From<&PersonalFood> for CatalogFood {
    fn from(food: &PersonalFood) -> Self {
        Self {
            code: personal_code(food.id),
            name: food.name.clone(),
            brand: "My Food".to_string(),
            source: FoodSource::Personal,
            default_unit: food.default_unit,
            nutrients: food.nutrients,
            piece_weight: food.piece_weight,
            cup_weight: food.cup_weight,
            personal_id: Some(food.id),
        }
    }
}

/// Catalog code for a personal food
pub fn personal_code(id: i64) -> String {
    format!("personal-{}", id)
}

/// Personal food ID from a catalog code, if it is one
pub fn parse_personal_code(code: &str) -> Option<i64> {
    code.strip_prefix("personal-")?.parse().ok()
}

/// Search results in display order: personal, then generic, then products
pub fn merge_results(
    personal: Vec<CatalogFood>,
    suggestions: Vec<CatalogFood>,
    products: Vec<CatalogFood>,
) -> Vec<CatalogFood> {
    let mut results = Vec::with_capacity(personal.len() + suggestions.len() + products.len());
    results.extend(personal);
    results.extend(suggestions);
    results.extend(products);
    results
}

/// Remote food sources
pub struct Catalog {
    client: Client,
    off_base_url: String,
    gist_url: String,
    generic_foods: OnceCell<Vec<CatalogFood>>,
}

impl Catalog {
    pub fn new(config: &Config) -> Self {
        Self::with_urls(&config.off_base_url, &config.gist_url, config.http_timeout)
    }

    pub fn with_urls(off_base_url: &str, gist_url: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .user_agent(crate::build_info::user_agent())
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client: {}, using default", e);
                Client::new()
            });

        Self {
            client,
            off_base_url: off_base_url.trim_end_matches('/').to_string(),
            gist_url: gist_url.to_string(),
            generic_foods: OnceCell::new(),
        }
    }

    /// The generic food list, fetched on first use
    ///
    /// A failed fetch is logged and leaves the list empty for the rest of
    /// the process.
    pub async fn generic_foods(&self) -> &[CatalogFood] {
        self.generic_foods
            .get_or_init(|| async {
                match gist::fetch(&self.client, &self.gist_url).await {
                    Ok(foods) => {
                        tracing::info!(count = foods.len(), "Loaded generic food list");
                        foods
                    }
                    Err(e) => {
                        tracing::warn!("Generic food list unavailable: {}", e);
                        Vec::new()
                    }
                }
            })
            .await
    }

    /// Up to [`SUGGESTION_LIMIT`] generic foods whose name contains the query
    pub async fn suggestions(&self, query: &str) -> Vec<CatalogFood> {
        gist::matching(self.generic_foods().await, query, SUGGESTION_LIMIT)
    }

    /// Generic food by its catalog code
    pub async fn generic_by_code(&self, code: &str) -> Option<CatalogFood> {
        self.generic_foods()
            .await
            .iter()
            .find(|f| f.code == code)
            .cloned()
    }

    /// Open Food Facts text search
    pub async fn search_products(&self, query: &str) -> CatalogResult<Vec<CatalogFood>> {
        open_food_facts::search(&self.client, &self.off_base_url, query).await
    }

    /// Open Food Facts barcode lookup
    pub async fn lookup_barcode(&self, barcode: &str) -> CatalogResult<Option<CatalogFood>> {
        open_food_facts::lookup(&self.client, &self.off_base_url, barcode).await
    }
}
