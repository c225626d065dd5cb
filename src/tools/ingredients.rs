//! Ingredient MCP Tools
//!
//! Tools for managing ingredients and their declared chemical ranges.

use serde::Serialize;

use crate::db::Database;
use crate::mixology::{ChemicalContents, ChemicalProperty, NonNegative};
use crate::models::{Ingredient, IngredientCreate, IngredientUpdate};

/// Response for add_ingredient
#[derive(Debug, Serialize)]
pub struct AddIngredientResponse {
    pub id: i64,
    pub name: String,
    pub ranges_summary: String,
    pub created_at: String,
}

/// Summary of an ingredient for list/search results
#[derive(Debug, Serialize)]
pub struct IngredientSummary {
    pub id: i64,
    pub name: String,
    pub ranges_summary: String,
}

impl From<&Ingredient> for IngredientSummary {
    fn from(item: &Ingredient) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            ranges_summary: item.contents.to_string(),
        }
    }
}

/// Full ingredient detail response
#[derive(Debug, Serialize)]
pub struct IngredientDetail {
    pub id: i64,
    pub name: String,
    pub contents: ChemicalContents,
    pub ranges_summary: String,
    pub created_at: String,
    pub updated_at: String,
    pub usage_count: i64,
    pub used_in_cocktails: Vec<String>,
}

/// Response for search_ingredients
#[derive(Debug, Serialize)]
pub struct SearchIngredientsResponse {
    pub items: Vec<IngredientSummary>,
    pub total: usize,
}

/// Response for list_ingredients
#[derive(Debug, Serialize)]
pub struct ListIngredientsResponse {
    pub items: Vec<IngredientSummary>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Response for update_ingredient
#[derive(Debug, Serialize)]
pub struct UpdateIngredientResponse {
    pub success: bool,
    pub updated_at: String,
    pub ranges_summary: String,
    /// Cocktails whose profile changes with this ingredient
    pub affected_cocktails: Vec<String>,
}

/// Response for delete_ingredient blocked
#[derive(Debug, Serialize)]
pub struct DeleteIngredientBlockedResponse {
    pub error: String,
    pub usage_count: i64,
    pub used_in_cocktails: Vec<String>,
}

/// Response for successful delete_ingredient
#[derive(Debug, Serialize)]
pub struct DeleteIngredientSuccessResponse {
    pub success: bool,
    pub deleted_id: i64,
}

/// Validate one optional percentage input (0-100)
fn percentage_input(property: ChemicalProperty, value: Option<f64>) -> Result<Option<NonNegative>, String> {
    match value {
        None => Ok(None),
        Some(v) if (0.0..=100.0).contains(&v) => Ok(NonNegative::new(v)),
        Some(v) => Err(format!("{} must be between 0 and 100, got {}", property.name(), v)),
    }
}

/// Build declared contents from optional ABV/sugar/acid inputs
pub fn contents_from_inputs(
    abv: Option<f64>,
    sugar: Option<f64>,
    acid: Option<f64>,
) -> Result<ChemicalContents, String> {
    Ok(ChemicalContents {
        abv: percentage_input(ChemicalProperty::Abv, abv)?,
        sugar: percentage_input(ChemicalProperty::Sugar, sugar)?,
        acid: percentage_input(ChemicalProperty::Acid, acid)?,
    })
}

/// Add a new ingredient
pub fn add_ingredient(
    db: &Database,
    name: &str,
    abv: Option<f64>,
    sugar: Option<f64>,
    acid: Option<f64>,
) -> Result<AddIngredientResponse, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Ingredient name cannot be empty".to_string());
    }
    let contents = contents_from_inputs(abv, sugar, acid)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let data = IngredientCreate { name: name.to_string(), contents };
    let item = Ingredient::create(&conn, &data)
        .map_err(|e| format!("Failed to create ingredient: {}", e))?;

    tracing::info!(id = item.id, name = %item.name, "Added ingredient");

    Ok(AddIngredientResponse {
        id: item.id,
        name: item.name,
        ranges_summary: item.contents.to_string(),
        created_at: item.created_at,
    })
}

/// Search ingredients by name
pub fn search_ingredients(db: &Database, query: &str, limit: i64) -> Result<SearchIngredientsResponse, String> {
    let limit = limit.clamp(1, 100);
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let items = Ingredient::search(&conn, query, limit)
        .map_err(|e| format!("Search failed: {}", e))?;

    let summaries: Vec<IngredientSummary> = items.iter().map(IngredientSummary::from).collect();
    let total = summaries.len();

    Ok(SearchIngredientsResponse { items: summaries, total })
}

/// Get an ingredient by ID with usage information
pub fn get_ingredient(db: &Database, id: i64) -> Result<Option<IngredientDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let item = Ingredient::get_by_id(&conn, id)
        .map_err(|e| format!("Failed to get ingredient: {}", e))?;

    match item {
        Some(item) => {
            let usage_count = Ingredient::get_usage_count(&conn, id)
                .map_err(|e| format!("Failed to get usage count: {}", e))?;
            let used_in_cocktails = Ingredient::get_used_in_cocktails(&conn, id)
                .map_err(|e| format!("Failed to get cocktail usage: {}", e))?;

            Ok(Some(IngredientDetail {
                id: item.id,
                name: item.name,
                ranges_summary: item.contents.to_string(),
                contents: item.contents,
                created_at: item.created_at,
                updated_at: item.updated_at,
                usage_count,
                used_in_cocktails,
            }))
        }
        None => Ok(None),
    }
}

/// List ingredients with an optional name filter and pagination
pub fn list_ingredients(
    db: &Database,
    query: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<ListIngredientsResponse, String> {
    let limit = limit.clamp(1, 200);
    let offset = offset.max(0);

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let items = Ingredient::list(&conn, query, limit, offset)
        .map_err(|e| format!("Failed to list ingredients: {}", e))?;
    let total = Ingredient::count(&conn, query)
        .map_err(|e| format!("Failed to count ingredients: {}", e))?;

    Ok(ListIngredientsResponse {
        items: items.iter().map(IngredientSummary::from).collect(),
        total,
        limit,
        offset,
    })
}

/// Update an ingredient's name and/or declared ranges
pub fn update_ingredient(
    db: &Database,
    id: i64,
    name: Option<String>,
    abv: Option<f64>,
    sugar: Option<f64>,
    acid: Option<f64>,
) -> Result<UpdateIngredientResponse, String> {
    if let Some(ref n) = name {
        if n.trim().is_empty() {
            return Err("Ingredient name cannot be empty".to_string());
        }
    }
    let contents = contents_from_inputs(abv, sugar, acid)?;
    if name.is_none() && contents.is_empty() {
        return Err("Nothing to update: provide a name or at least one of abv, sugar, acid".to_string());
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let data = IngredientUpdate { name, contents };
    let updated = Ingredient::update(&conn, id, &data)
        .map_err(|e| format!("Failed to update ingredient: {}", e))?
        .ok_or_else(|| format!("Ingredient not found with id: {}", id))?;

    let affected_cocktails = Ingredient::get_used_in_cocktails(&conn, id)
        .map_err(|e| format!("Failed to get cocktail usage: {}", e))?;

    tracing::info!(id, affected = affected_cocktails.len(), "Updated ingredient");

    Ok(UpdateIngredientResponse {
        success: true,
        updated_at: updated.updated_at,
        ranges_summary: updated.contents.to_string(),
        affected_cocktails,
    })
}

/// Delete an ingredient (blocked while any cocktail uses it)
pub fn delete_ingredient(
    db: &Database,
    id: i64,
) -> Result<Result<DeleteIngredientSuccessResponse, DeleteIngredientBlockedResponse>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let item = Ingredient::get_by_id(&conn, id)
        .map_err(|e| format!("Database error: {}", e))?;
    if item.is_none() {
        return Err(format!("Ingredient not found with id: {}", id));
    }

    let usage_count = Ingredient::get_usage_count(&conn, id)
        .map_err(|e| format!("Failed to check usage: {}", e))?;

    if usage_count > 0 {
        let used_in_cocktails = Ingredient::get_used_in_cocktails(&conn, id)
            .map_err(|e| format!("Failed to get cocktail usage: {}", e))?;

        return Ok(Err(DeleteIngredientBlockedResponse {
            error: format!("Cannot delete ingredient: used in {} cocktail(s)", usage_count),
            usage_count,
            used_in_cocktails,
        }));
    }

    Ingredient::delete(&conn, id)
        .map_err(|e| format!("Failed to delete ingredient: {}", e))?;

    Ok(Ok(DeleteIngredientSuccessResponse {
        success: true,
        deleted_id: id,
    }))
}
