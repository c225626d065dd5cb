//! Barkeep MCP Server Implementation
//!
//! Implements the MCP server with all Barkeep tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::db::Database;
use crate::tools::charts;
use crate::tools::cocktails::{self, DoseInput};
use crate::tools::ingredients;
use crate::tools::status::StatusTracker;
use crate::tools::techniques;

/// Barkeep MCP Service
#[derive(Clone)]
pub struct BarkeepService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    tool_router: ToolRouter<BarkeepService>,
}

impl BarkeepService {
    pub fn new(database_path: PathBuf, database: Database) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            database,
            tool_router: Self::tool_router(),
        }
    }
}

/// Serialize a tool response as pretty JSON text content
fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn not_found(entity: &str, id: i64) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(format!(
        r#"{{"error": "{} not found", "id": {}}}"#,
        entity, id
    ))]))
}

// ============================================================================
// Ingredient Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddIngredientParams {
    /// Ingredient name
    pub name: String,
    /// Alcohol by volume, 0-100 (omit if not applicable)
    pub abv: Option<f64>,
    /// Sugar content, 0-100 (omit if not applicable)
    pub sugar: Option<f64>,
    /// Acid content, 0-100 (omit if not applicable)
    pub acid: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchParams {
    /// Text to match against names
    pub query: String,
    #[serde(default = "default_search_limit")]
    pub limit: i64,
}

fn default_search_limit() -> i64 { 20 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct IdParams {
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListParams {
    /// Optional name filter
    pub query: Option<String>,
    /// Maximum results (default 50, max 200)
    #[serde(default = "default_list_limit")]
    pub limit: i64,
    /// Offset for pagination (default 0)
    #[serde(default)]
    pub offset: i64,
}

fn default_list_limit() -> i64 { 50 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateIngredientParams {
    /// Ingredient ID to update
    pub id: i64,
    pub name: Option<String>,
    /// New ABV, 0-100; replaces the declared value
    pub abv: Option<f64>,
    /// New sugar content, 0-100
    pub sugar: Option<f64>,
    /// New acid content, 0-100
    pub acid: Option<f64>,
}

// ============================================================================
// Technique Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetTechniqueParams {
    /// Technique code: BUILT, STIRRED, SHAKEN, SHAKEN_WITH_EGG, BLENDED or CARBONATED
    pub code: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetTechniqueRangeParams {
    /// Technique code
    pub code: String,
    /// Range property: Ounce, ABV, Sugar, Acid or Dilution
    pub property: String,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ClearTechniqueRangeParams {
    /// Technique code
    pub code: String,
    /// Range property: Ounce, ABV, Sugar, Acid or Dilution
    pub property: String,
}

// ============================================================================
// Cocktail Parameter Structs
// ============================================================================

/// One dosed ingredient
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DoseParam {
    /// Ingredient ID
    pub ingredient_id: i64,
    /// Amount in `unit`
    pub amount: f64,
    /// Volume unit: oz, ml, cl, dash, drop or tsp
    pub unit: String,
    /// Added after the technique, e.g. a soda top-up (default false)
    #[serde(default)]
    pub after_technique: bool,
}

impl From<DoseParam> for DoseInput {
    fn from(p: DoseParam) -> Self {
        DoseInput {
            ingredient_id: p.ingredient_id,
            amount: p.amount,
            unit: p.unit,
            after_technique: p.after_technique,
        }
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateCocktailParams {
    /// Name of the cocktail
    pub name: String,
    /// Technique code
    pub technique_code: String,
    /// Ingredients in order
    #[serde(default)]
    pub ingredients: Vec<DoseParam>,
    /// Recipe steps in order
    #[serde(default)]
    pub steps: Vec<String>,
    pub garnish: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateCocktailParams {
    /// Cocktail ID to update
    pub id: i64,
    pub name: Option<String>,
    /// New technique code
    pub technique_code: Option<String>,
    /// New garnish; an empty string clears it
    pub garnish: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddCocktailIngredientParams {
    /// Cocktail to add the ingredient to
    pub cocktail_id: i64,
    #[serde(flatten)]
    pub dose: DoseParam,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateCocktailIngredientParams {
    /// Cocktail ingredient ID (not the ingredient ID)
    pub id: i64,
    pub amount: Option<f64>,
    pub unit: Option<String>,
    pub after_technique: Option<bool>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddRecipeStepParams {
    pub cocktail_id: i64,
    /// Step text
    pub description: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateRecipeStepParams {
    /// Recipe step ID
    pub id: i64,
    pub description: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PreviewProfileParams {
    /// Technique code
    pub technique_code: String,
    pub ingredients: Vec<DoseParam>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ExportBalanceChartParams {
    pub cocktail_id: i64,
    /// Full path of the PNG file to write
    pub output_path: String,
    /// Image width in pixels (default 900)
    pub width: Option<u32>,
    /// Image height in pixels (default 500)
    pub height: Option<u32>,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl BarkeepService {
    // --- Status ---

    #[tool(description = "Get the current status of the Barkeep service including build info, database status, and process information")]
    async fn barkeep_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status();
        json_result(&status)
    }

    #[tool(description = "Get instructions for building cocktails and reading their profiles. Call this when starting a session or when unsure how to use the tools.")]
    fn barkeep_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(INSTRUCTIONS)]))
    }

    // --- Units & Techniques ---

    #[tool(description = "List measurement units. Volume units dose ingredients; percentage units (ABV, Sugar, Acid) describe them")]
    fn list_units(&self) -> Result<CallToolResult, McpError> {
        let result = techniques::list_units(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "List preparation techniques with their balance ranges")]
    fn list_techniques(&self) -> Result<CallToolResult, McpError> {
        let result = techniques::list_techniques(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get one technique and its balance ranges by code")]
    fn get_technique(&self, Parameters(p): Parameters<GetTechniqueParams>) -> Result<CallToolResult, McpError> {
        let result = techniques::get_technique(&self.database, &p.code).map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(technique) => json_result(&technique),
            None => Ok(CallToolResult::success(vec![Content::text(format!(
                r#"{{"error": "Technique not found", "code": "{}"}}"#,
                p.code
            ))])),
        }
    }

    #[tool(description = "Set the min/max balance range of a technique for one property (Ounce, ABV, Sugar, Acid, Dilution)")]
    fn set_technique_range(&self, Parameters(p): Parameters<SetTechniqueRangeParams>) -> Result<CallToolResult, McpError> {
        let result = techniques::set_technique_range(&self.database, &p.code, &p.property, p.min, p.max)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Remove one balance range from a technique; balance checks then skip that property")]
    fn clear_technique_range(&self, Parameters(p): Parameters<ClearTechniqueRangeParams>) -> Result<CallToolResult, McpError> {
        let result = techniques::clear_technique_range(&self.database, &p.code, &p.property)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Ingredients ---

    #[tool(description = "Create a new ingredient with optional ABV, sugar and acid percentages")]
    fn add_ingredient(&self, Parameters(p): Parameters<AddIngredientParams>) -> Result<CallToolResult, McpError> {
        let result = ingredients::add_ingredient(&self.database, &p.name, p.abv, p.sugar, p.acid)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Search for ingredients by name")]
    fn search_ingredients(&self, Parameters(p): Parameters<SearchParams>) -> Result<CallToolResult, McpError> {
        let result = ingredients::search_ingredients(&self.database, &p.query, p.limit)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get full details for an ingredient including its ranges and the cocktails using it")]
    fn get_ingredient(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = ingredients::get_ingredient(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(item) => json_result(&item),
            None => not_found("Ingredient", p.id),
        }
    }

    #[tool(description = "List ingredients with an optional name filter and pagination")]
    fn list_ingredients(&self, Parameters(p): Parameters<ListParams>) -> Result<CallToolResult, McpError> {
        let result = ingredients::list_ingredients(&self.database, p.query.as_deref(), p.limit, p.offset)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Update an ingredient's name or ranges. Profiles of cocktails using it change on their next read.")]
    fn update_ingredient(&self, Parameters(p): Parameters<UpdateIngredientParams>) -> Result<CallToolResult, McpError> {
        let result = ingredients::update_ingredient(&self.database, p.id, p.name, p.abv, p.sugar, p.acid)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Delete an ingredient. Blocked while any cocktail uses it.")]
    fn delete_ingredient(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = ingredients::delete_ingredient(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Ok(success) => json_result(&success),
            Err(blocked) => json_result(&blocked),
        }
    }

    // --- Cocktails ---

    #[tool(description = "Create a cocktail with a technique, ordered ingredients, recipe steps and garnish. Returns the computed profile and balance checks.")]
    fn create_cocktail(&self, Parameters(p): Parameters<CreateCocktailParams>) -> Result<CallToolResult, McpError> {
        let doses = p.ingredients.into_iter().map(DoseInput::from).collect();
        let result = cocktails::create_cocktail(&self.database, &p.name, &p.technique_code, doses, p.steps, p.garnish)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Get a cocktail with ingredients, steps, its freshly computed profile and balance checks")]
    fn get_cocktail(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = cocktails::get_cocktail(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(cocktail) => json_result(&cocktail),
            None => not_found("Cocktail", p.id),
        }
    }

    #[tool(description = "Search for cocktails by name")]
    fn search_cocktails(&self, Parameters(p): Parameters<SearchParams>) -> Result<CallToolResult, McpError> {
        let result = cocktails::search_cocktails(&self.database, &p.query, p.limit)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "List cocktails with an optional name filter and pagination")]
    fn list_cocktails(&self, Parameters(p): Parameters<ListParams>) -> Result<CallToolResult, McpError> {
        let result = cocktails::list_cocktails(&self.database, p.query.as_deref(), p.limit, p.offset)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Update a cocktail's name, technique or garnish")]
    fn update_cocktail(&self, Parameters(p): Parameters<UpdateCocktailParams>) -> Result<CallToolResult, McpError> {
        let result = cocktails::update_cocktail(&self.database, p.id, p.name, p.technique_code, p.garnish)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Delete a cocktail with its ingredients and steps")]
    fn delete_cocktail(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = cocktails::delete_cocktail(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Add an ingredient to the end of a cocktail")]
    fn add_cocktail_ingredient(&self, Parameters(p): Parameters<AddCocktailIngredientParams>) -> Result<CallToolResult, McpError> {
        let result = cocktails::add_cocktail_ingredient(&self.database, p.cocktail_id, p.dose.into())
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Change the amount, unit or after-technique flag of a cocktail ingredient")]
    fn update_cocktail_ingredient(&self, Parameters(p): Parameters<UpdateCocktailIngredientParams>) -> Result<CallToolResult, McpError> {
        let result = cocktails::update_cocktail_ingredient(&self.database, p.id, p.amount, p.unit, p.after_technique)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Remove an ingredient from a cocktail by cocktail ingredient ID")]
    fn remove_cocktail_ingredient(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = cocktails::remove_cocktail_ingredient(&self.database, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Move a cocktail ingredient to the front of the list")]
    fn move_cocktail_ingredient_up(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = cocktails::move_cocktail_ingredient_up(&self.database, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Recipe Steps ---

    #[tool(description = "Append a recipe step to a cocktail")]
    fn add_recipe_step(&self, Parameters(p): Parameters<AddRecipeStepParams>) -> Result<CallToolResult, McpError> {
        let result = cocktails::add_recipe_step(&self.database, p.cocktail_id, &p.description)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Reword a recipe step")]
    fn update_recipe_step(&self, Parameters(p): Parameters<UpdateRecipeStepParams>) -> Result<CallToolResult, McpError> {
        let result = cocktails::update_recipe_step(&self.database, p.id, &p.description)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Remove a recipe step")]
    fn remove_recipe_step(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = cocktails::remove_recipe_step(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Swap a recipe step with the one before it. The first step stays in place.")]
    fn move_recipe_step_up(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = cocktails::move_recipe_step_up(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    // --- Profiles ---

    #[tool(description = "Compute the profile and balance of unsaved ingredient amounts without writing anything")]
    fn preview_cocktail_profile(&self, Parameters(p): Parameters<PreviewProfileParams>) -> Result<CallToolResult, McpError> {
        let doses = p.ingredients.into_iter().map(DoseInput::from).collect();
        let result = cocktails::preview_cocktail_profile(&self.database, &p.technique_code, doses)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }

    #[tool(description = "Export a PNG bar chart of a cocktail's balance against its technique's ranges")]
    fn export_balance_chart(&self, Parameters(p): Parameters<ExportBalanceChartParams>) -> Result<CallToolResult, McpError> {
        let result = charts::export_balance_chart(&self.database, p.cocktail_id, &p.output_path, p.width, p.height)
            .map_err(|e| McpError::internal_error(e, None))?;
        json_result(&result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for BarkeepService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "barkeep".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Barkeep".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Barkeep - Cocktail catalog with profile and dilution calculations. \
                 IMPORTANT: Call barkeep_instructions before building cocktails. \
                 Units & techniques: list_units, list_techniques, get_technique, set_technique_range, clear_technique_range. \
                 Ingredients: add/search/get/list/update/delete_ingredient. \
                 Cocktails: create/get/search/list/update/delete_cocktail, \
                 add/update/remove_cocktail_ingredient, move_cocktail_ingredient_up, \
                 add/update/remove_recipe_step, move_recipe_step_up. \
                 Profiles: preview_cocktail_profile, export_balance_chart."
                    .into(),
            ),
        }
    }
}
