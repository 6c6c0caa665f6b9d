//! macrotrack MCP Server Implementation
//!
//! Implements the MCP server with all macrotrack tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::db::Database;
use crate::models::{NutrientProfile, PersonalFoodCreate};
use crate::nutrition::{ActivityLevel, MacroRatios, Profile, Sex, Unit, WeightGoal};
use crate::tools::food_logs;
use crate::tools::foods::{self, FoodSelector};
use crate::tools::goals;
use crate::tools::personal_foods;
use crate::tools::status::StatusTracker;

/// macrotrack MCP Service
#[derive(Clone)]
pub struct MacrotrackService {
    status_tracker: Arc<StatusTracker>,
    database: Database,
    catalog: Arc<Catalog>,
    tool_router: ToolRouter<MacrotrackService>,
}

impl MacrotrackService {
    pub fn new(database_path: PathBuf, database: Database, catalog: Catalog) -> Self {
        Self {
            status_tracker: Arc::new(StatusTracker::new(database_path)),
            database,
            catalog: Arc::new(catalog),
            tool_router: Self::tool_router(),
        }
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Food Parameter Structs
// ============================================================================

/// Either a catalog code or an inline food described per 100 g
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct FoodArgs {
    /// Code from search results: personal-{id}, gist-{name} or a barcode
    pub code: Option<String>,
    /// Name of an inline food (used when no code is given)
    pub name: Option<String>,
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,
    pub piece_weight: Option<f64>,
    pub cup_weight: Option<f64>,
}

impl FoodArgs {
    fn into_selector(self) -> Result<FoodSelector, McpError> {
        if let Some(code) = self.code.filter(|c| !c.trim().is_empty()) {
            return Ok(FoodSelector::Code(code));
        }
        match self.name {
            Some(name) => Ok(FoodSelector::Inline {
                name,
                nutrients: NutrientProfile::new(self.calories, self.protein, self.carbs, self.fat),
                piece_weight: self.piece_weight,
                cup_weight: self.cup_weight,
            }),
            None => Err(McpError::invalid_params("Either code or name is required", None)),
        }
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchFoodsParams {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LookupBarcodeParams {
    pub barcode: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PreviewServingParams {
    #[serde(flatten)]
    pub food: FoodArgs,
    /// Amount as typed, e.g. "150" or "1.5"
    pub quantity: Option<String>,
    /// One of g, ml, oz, tsp, tbsp, cup, pc
    pub unit: Option<String>,
    /// Stepper nudge: g/ml/oz move by this amount, other units by one in its direction
    pub step: Option<f64>,
}

// ============================================================================
// Personal Food Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreatePersonalFoodParams {
    pub name: String,
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,
    pub default_unit: Option<String>,
    pub piece_weight: Option<f64>,
    pub cup_weight: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListPersonalFoodsParams {
    #[serde(default = "default_list_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_list_limit() -> i64 { 50 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct IdParams {
    pub id: i64,
}

// ============================================================================
// Food Log Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogFoodParams {
    #[serde(flatten)]
    pub food: FoodArgs,
    pub quantity: Option<String>,
    pub unit: Option<String>,
    /// YYYY-MM-DD, defaults to today
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct EditFoodLogParams {
    pub id: i64,
    pub quantity: String,
    /// Keeps the entry's unit when omitted
    pub unit: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetDailyLogParams {
    /// YYYY-MM-DD, defaults to today
    pub date: Option<String>,
}

// ============================================================================
// Goal Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SaveProfileParams {
    pub weight_kg: f64,
    pub target_weight_kg: f64,
    pub height_cm: f64,
    pub age: u32,
    /// male or female
    pub sex: String,
    /// sedentary, lightly_active, moderately_active or very_active
    #[serde(default = "default_activity")]
    pub activity_level: String,
    /// lose_one_kg, lose_half_kg, maintain, gain_half_kg or gain_one_kg
    #[serde(default = "default_weight_goal")]
    pub weight_goal: String,
    /// Percent of calories, defaults 30/35/35
    pub protein_ratio: Option<i64>,
    pub carbs_ratio: Option<i64>,
    pub fat_ratio: Option<i64>,
}

fn default_activity() -> String { "sedentary".to_string() }
fn default_weight_goal() -> String { "maintain".to_string() }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetCalorieGoalParams {
    pub calories: i64,
}

#[tool_router]
impl MacrotrackService {
    // --- Status ---

    #[tool(description = "Get the current status of the macrotrack service including build info, database status and a short usage guide")]
    fn status(&self) -> Result<CallToolResult, McpError> {
        let status = self.status_tracker.get_status(&self.database);
        json_result(&status)
    }

    // --- Catalog ---

    #[tool(description = "Search foods by name across personal foods, the generic food list and Open Food Facts. Each result has a code usable by preview_serving and log_food.")]
    async fn search_foods(&self, Parameters(p): Parameters<SearchFoodsParams>) -> Result<CallToolResult, McpError> {
        let result = foods::search_foods(&self.database, &self.catalog, &p.query)
            .await
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Look up a packaged product on Open Food Facts by barcode")]
    async fn lookup_barcode(&self, Parameters(p): Parameters<LookupBarcodeParams>) -> Result<CallToolResult, McpError> {
        let result = foods::lookup_barcode(&self.catalog, &p.barcode)
            .await
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Compute calories and macros for a serving of a food without logging it")]
    async fn preview_serving(&self, Parameters(p): Parameters<PreviewServingParams>) -> Result<CallToolResult, McpError> {
        let selector = p.food.into_selector()?;
        let result = foods::preview_serving(
            &self.database,
            &self.catalog,
            selector,
            p.quantity.as_deref(),
            p.unit.as_deref(),
            p.step,
        )
        .await
        .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Personal Foods ---

    #[tool(description = "Create a personal food with nutrients per 100 g. Calories left at 0 are estimated from the macros.")]
    fn create_personal_food(&self, Parameters(p): Parameters<CreatePersonalFoodParams>) -> Result<CallToolResult, McpError> {
        let data = PersonalFoodCreate {
            name: p.name,
            calories: p.calories,
            protein: p.protein,
            carbs: p.carbs,
            fat: p.fat,
            default_unit: Unit::from_code_or_default(p.default_unit.as_deref()),
            piece_weight: p.piece_weight,
            cup_weight: p.cup_weight,
        };
        let result = personal_foods::create_personal_food(&self.database, data)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "List personal foods, newest first")]
    fn list_personal_foods(&self, Parameters(p): Parameters<ListPersonalFoodsParams>) -> Result<CallToolResult, McpError> {
        let result = personal_foods::list_personal_foods(&self.database, p.limit, p.offset)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Delete a personal food. Logged entries are not affected.")]
    fn delete_personal_food(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = personal_foods::delete_personal_food(&self.database, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Food Logs ---

    #[tool(description = "Log a serving of a food for a date (default today). Totals are computed from the food and stored.")]
    async fn log_food(&self, Parameters(p): Parameters<LogFoodParams>) -> Result<CallToolResult, McpError> {
        let selector = p.food.into_selector()?;
        let result = food_logs::log_food(
            &self.database,
            &self.catalog,
            selector,
            p.quantity.as_deref(),
            p.unit.as_deref(),
            p.date.as_deref(),
        )
        .await
        .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Change the quantity and/or unit of a logged entry. Stored totals are rescaled proportionally.")]
    fn edit_food_log(&self, Parameters(p): Parameters<EditFoodLogParams>) -> Result<CallToolResult, McpError> {
        let result = food_logs::edit_food_log(&self.database, p.id, &p.quantity, p.unit.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Delete a logged entry")]
    fn delete_food_log(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = food_logs::delete_food_log(&self.database, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get a day's entries, totals and progress against the goals")]
    fn get_daily_log(&self, Parameters(p): Parameters<GetDailyLogParams>) -> Result<CallToolResult, McpError> {
        let result = food_logs::get_daily_log(&self.database, p.date.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Goals ---

    #[tool(description = "Get the daily calorie and macro goals (defaults when none are set)")]
    fn get_goals(&self) -> Result<CallToolResult, McpError> {
        let result = goals::get_goals(&self.database)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Save a body profile and derive calorie and macro goals from it (Mifflin-St Jeor). Macro ratios must sum to 100.")]
    fn save_profile(&self, Parameters(p): Parameters<SaveProfileParams>) -> Result<CallToolResult, McpError> {
        let profile = Profile {
            weight_kg: p.weight_kg,
            target_weight_kg: p.target_weight_kg,
            height_cm: p.height_cm,
            age: p.age,
            sex: Sex::from_str(&p.sex),
            activity: ActivityLevel::from_str(&p.activity_level),
            goal: WeightGoal::from_str(&p.weight_goal),
        };
        let defaults = MacroRatios::default();
        let ratios = MacroRatios {
            protein: p.protein_ratio.unwrap_or(defaults.protein),
            carbs: p.carbs_ratio.unwrap_or(defaults.carbs),
            fat: p.fat_ratio.unwrap_or(defaults.fat),
        };
        let result = goals::save_profile(&self.database, profile, ratios)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Set the daily calorie goal by hand (at least 500). Macro grams follow the stored ratios.")]
    fn set_calorie_goal(&self, Parameters(p): Parameters<SetCalorieGoalParams>) -> Result<CallToolResult, McpError> {
        let result = goals::set_calorie_goal(&self.database, p.calories)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }
}

#[tool_handler]
impl ServerHandler for MacrotrackService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "macrotrack".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("macrotrack".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "macrotrack - calorie and macro tracking. \
                 Call status for a usage guide. \
                 Catalog: search_foods, lookup_barcode, preview_serving. \
                 Personal foods: create/list/delete_personal_food. \
                 Log: log_food, edit_food_log, delete_food_log, get_daily_log. \
                 Goals: get_goals, save_profile, set_calorie_goal. \
                 Units: g, ml, oz, tsp, tbsp, cup, pc."
                    .into(),
            ),
        }
    }
}
