//! Cocktail MCP Tools
//!
//! Tools for building cocktails, editing their ingredients and recipe
//! steps, and reading back the computed profile with balance checks.

use std::collections::HashSet;

use rusqlite::Connection;
use serde::Serialize;

use crate::db::Database;
use crate::mixology::{
    check_balance, get_cocktail_profile, get_technique_ranges, BalanceCheck, BalanceVerdict,
    CocktailProfile, Dose, NonNegative, TechniqueCode, UnitKind,
};
use crate::models::{
    cocktail_profile, profile_of_details, Cocktail, CocktailCreate, CocktailIngredient, CocktailIngredientCreate,
    CocktailIngredientDetail, CocktailIngredientUpdate, CocktailStep, CocktailUpdate, Ingredient,
    Technique, Unit,
};

use super::techniques::parse_technique_code;

/// One ingredient dose as supplied by a caller
#[derive(Debug, Clone)]
pub struct DoseInput {
    pub ingredient_id: i64,
    pub amount: f64,
    /// Volume unit symbol or name (oz, ml, cl, dash, drop, tsp)
    pub unit: String,
    pub after_technique: bool,
}

/// Technique reference embedded in cocktail responses
#[derive(Debug, Serialize)]
pub struct TechniqueRef {
    pub code: TechniqueCode,
    pub name: String,
}

impl From<&Technique> for TechniqueRef {
    fn from(technique: &Technique) -> Self {
        Self {
            code: technique.code,
            name: technique.name.clone(),
        }
    }
}

/// Full cocktail with its freshly computed profile
#[derive(Debug, Serialize)]
pub struct CocktailDetail {
    pub id: i64,
    pub name: String,
    pub technique: TechniqueRef,
    pub garnish: Option<String>,
    pub ingredients: Vec<CocktailIngredientDetail>,
    pub steps: Vec<CocktailStep>,
    pub profile: CocktailProfile,
    pub profile_summary: String,
    pub balance: Vec<BalanceCheck>,
    /// True when every declared window is met
    pub balanced: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Summary of a cocktail for list/search results
#[derive(Debug, Serialize)]
pub struct CocktailSummary {
    pub id: i64,
    pub name: String,
    pub technique: TechniqueCode,
    pub profile_summary: String,
}

/// Response for list_cocktails
#[derive(Debug, Serialize)]
pub struct ListCocktailsResponse {
    pub cocktails: Vec<CocktailSummary>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Response for search_cocktails
#[derive(Debug, Serialize)]
pub struct SearchCocktailsResponse {
    pub cocktails: Vec<CocktailSummary>,
    pub total: usize,
}

/// Response for delete_cocktail
#[derive(Debug, Serialize)]
pub struct DeleteCocktailResponse {
    pub success: bool,
    pub deleted_id: i64,
    pub name: String,
}

/// Response for preview_cocktail_profile
#[derive(Debug, Serialize)]
pub struct PreviewProfileResponse {
    pub technique: TechniqueRef,
    pub profile: CocktailProfile,
    pub profile_summary: String,
    pub balance: Vec<BalanceCheck>,
    pub balanced: bool,
}

// ============================================================================
// Helpers
// ============================================================================

/// A caller dose checked against the catalog
struct ResolvedDose {
    ingredient_id: i64,
    unit_id: i64,
    amount: NonNegative,
    dose: Dose,
}

fn parse_amount(amount: f64) -> Result<NonNegative, String> {
    NonNegative::try_from(amount).map_err(|e| format!("Invalid amount: {}", e))
}

/// Resolve a volume unit by symbol or name
fn resolve_unit(conn: &Connection, unit: &str) -> Result<(Unit, NonNegative), String> {
    let found = Unit::find_volume(conn, unit)
        .map_err(|e| format!("Failed to look up unit: {}", e))?;

    match found.and_then(|u| u.ml_factor().map(|ml| (u, ml))) {
        Some(resolved) => Ok(resolved),
        None => {
            let symbols: Vec<String> = Unit::list(conn)
                .map_err(|e| format!("Failed to list units: {}", e))?
                .into_iter()
                .filter(|u| u.kind == UnitKind::Volume)
                .map(|u| u.symbol)
                .collect();
            Err(format!(
                "Unknown volume unit '{}'. Valid units: {}",
                unit,
                symbols.join(", ")
            ))
        }
    }
}

fn resolve_dose(conn: &Connection, input: &DoseInput) -> Result<ResolvedDose, String> {
    let amount = parse_amount(input.amount)?;

    let ingredient = Ingredient::get_by_id(conn, input.ingredient_id)
        .map_err(|e| format!("Failed to get ingredient: {}", e))?
        .ok_or_else(|| format!("Ingredient not found with id: {}", input.ingredient_id))?;

    let (unit, ml_per_unit) = resolve_unit(conn, &input.unit)?;

    Ok(ResolvedDose {
        ingredient_id: ingredient.id,
        unit_id: unit.id,
        amount,
        dose: Dose {
            amount,
            ml_per_unit,
            contents: ingredient.contents,
            after_technique: input.after_technique,
        },
    })
}

fn resolve_technique(conn: &Connection, code: &str) -> Result<Technique, String> {
    let code = parse_technique_code(code)?;
    Technique::get_by_code(conn, code)
        .map_err(|e| format!("Failed to get technique: {}", e))?
        .ok_or_else(|| format!("Technique not found: {}", code))
}

/// Balance checks for a profile, warning when the technique is missing windows
fn balance_for(technique: &Technique, profile: &CocktailProfile) -> (Vec<BalanceCheck>, bool) {
    if get_technique_ranges(&technique.balance).is_none() {
        tracing::warn!(technique = %technique.code, "Technique declares an incomplete set of balance ranges");
    }
    let checks = check_balance(profile, &technique.balance);
    let balanced = checks.iter().all(|c| c.verdict == BalanceVerdict::Balanced);
    (checks, balanced)
}

fn require_cocktail(conn: &Connection, id: i64) -> Result<Cocktail, String> {
    Cocktail::get_by_id(conn, id)
        .map_err(|e| format!("Failed to get cocktail: {}", e))?
        .ok_or_else(|| format!("Cocktail not found with id: {}", id))
}

fn require_cocktail_ingredient(conn: &Connection, id: i64) -> Result<CocktailIngredient, String> {
    CocktailIngredient::get_by_id(conn, id)
        .map_err(|e| format!("Failed to get cocktail ingredient: {}", e))?
        .ok_or_else(|| format!("Cocktail ingredient not found with id: {}", id))
}

fn require_step(conn: &Connection, id: i64) -> Result<CocktailStep, String> {
    CocktailStep::get_by_id(conn, id)
        .map_err(|e| format!("Failed to get recipe step: {}", e))?
        .ok_or_else(|| format!("Recipe step not found with id: {}", id))
}

fn require_description(description: &str) -> Result<&str, String> {
    let description = description.trim();
    if description.is_empty() {
        return Err("Step description cannot be empty".to_string());
    }
    Ok(description)
}

fn touch(conn: &Connection, cocktail_id: i64) -> Result<(), String> {
    Cocktail::touch(conn, cocktail_id).map_err(|e| format!("Failed to update cocktail: {}", e))
}

/// Load a cocktail with ingredients, steps and a freshly computed profile
fn load_detail(conn: &Connection, id: i64) -> Result<Option<CocktailDetail>, String> {
    let cocktail = match Cocktail::get_by_id(conn, id)
        .map_err(|e| format!("Failed to get cocktail: {}", e))?
    {
        Some(cocktail) => cocktail,
        None => return Ok(None),
    };

    let technique = Technique::get_by_id(conn, cocktail.technique_id)
        .map_err(|e| format!("Failed to get technique: {}", e))?
        .ok_or_else(|| format!("Technique not found with id: {}", cocktail.technique_id))?;

    let ingredients = CocktailIngredient::get_details_for_cocktail(conn, id)
        .map_err(|e| format!("Failed to get ingredients: {}", e))?;
    let steps = CocktailStep::get_for_cocktail(conn, id)
        .map_err(|e| format!("Failed to get recipe steps: {}", e))?;

    let profile = profile_of_details(technique.code, &ingredients);
    let (balance, balanced) = balance_for(&technique, &profile);

    Ok(Some(CocktailDetail {
        id: cocktail.id,
        name: cocktail.name,
        technique: TechniqueRef::from(&technique),
        garnish: cocktail.garnish,
        ingredients,
        steps,
        profile_summary: profile.to_string(),
        profile,
        balance,
        balanced,
        created_at: cocktail.created_at,
        updated_at: cocktail.updated_at,
    }))
}

fn require_detail(conn: &Connection, id: i64) -> Result<CocktailDetail, String> {
    load_detail(conn, id)?.ok_or_else(|| format!("Cocktail not found with id: {}", id))
}

fn summarize(conn: &Connection, cocktail: &Cocktail) -> Result<CocktailSummary, String> {
    let technique = Technique::get_by_id(conn, cocktail.technique_id)
        .map_err(|e| format!("Failed to get technique: {}", e))?
        .ok_or_else(|| format!("Technique not found with id: {}", cocktail.technique_id))?;
    let profile = cocktail_profile(conn, cocktail.id)
        .map_err(|e| format!("Failed to compute profile: {}", e))?
        .unwrap_or_default();

    Ok(CocktailSummary {
        id: cocktail.id,
        name: cocktail.name.clone(),
        technique: technique.code,
        profile_summary: profile.to_string(),
    })
}

// ============================================================================
// Cocktails
// ============================================================================

/// Create a cocktail with its ingredients and recipe steps
pub fn create_cocktail(
    db: &Database,
    name: &str,
    technique_code: &str,
    ingredients: Vec<DoseInput>,
    steps: Vec<String>,
    garnish: Option<String>,
) -> Result<CocktailDetail, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Cocktail name cannot be empty".to_string());
    }

    let mut seen = HashSet::new();
    for input in &ingredients {
        if !seen.insert(input.ingredient_id) {
            return Err(format!(
                "Ingredient {} is listed more than once; combine the amounts instead",
                input.ingredient_id
            ));
        }
    }

    let mut conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let tx = conn.transaction().map_err(|e| format!("Database error: {}", e))?;

    let technique = resolve_technique(&tx, technique_code)?;
    let resolved = ingredients
        .iter()
        .map(|input| resolve_dose(&tx, input))
        .collect::<Result<Vec<_>, _>>()?;

    let cocktail = Cocktail::create(
        &tx,
        &CocktailCreate {
            name: name.to_string(),
            technique_id: technique.id,
            garnish,
        },
    )
    .map_err(|e| format!("Failed to create cocktail: {}", e))?;

    for dose in &resolved {
        CocktailIngredient::create(
            &tx,
            &CocktailIngredientCreate {
                cocktail_id: cocktail.id,
                ingredient_id: dose.ingredient_id,
                unit_id: dose.unit_id,
                amount: dose.amount,
                after_technique: dose.dose.after_technique,
            },
        )
        .map_err(|e| format!("Failed to add ingredient: {}", e))?;
    }

    for step in &steps {
        let description = require_description(step)?;
        CocktailStep::create(&tx, cocktail.id, description)
            .map_err(|e| format!("Failed to add recipe step: {}", e))?;
    }

    tx.commit().map_err(|e| format!("Failed to commit: {}", e))?;

    tracing::info!(id = cocktail.id, name = %cocktail.name, technique = %technique.code, "Created cocktail");

    require_detail(&conn, cocktail.id)
}

/// Get a cocktail with its computed profile and balance checks
pub fn get_cocktail(db: &Database, id: i64) -> Result<Option<CocktailDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    load_detail(&conn, id)
}

/// List cocktails with an optional name filter and pagination
pub fn list_cocktails(
    db: &Database,
    query: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<ListCocktailsResponse, String> {
    let limit = limit.clamp(1, 200);
    let offset = offset.max(0);

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let cocktails = Cocktail::list(&conn, query, limit, offset)
        .map_err(|e| format!("Failed to list cocktails: {}", e))?;
    let total = Cocktail::count(&conn, query)
        .map_err(|e| format!("Failed to count cocktails: {}", e))?;

    let cocktails = cocktails
        .iter()
        .map(|c| summarize(&conn, c))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ListCocktailsResponse {
        cocktails,
        total,
        limit,
        offset,
    })
}

/// Search cocktails by name
pub fn search_cocktails(db: &Database, query: &str, limit: i64) -> Result<SearchCocktailsResponse, String> {
    let limit = limit.clamp(1, 100);
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let cocktails = Cocktail::list(&conn, Some(query), limit, 0)
        .map_err(|e| format!("Search failed: {}", e))?
        .iter()
        .map(|c| summarize(&conn, c))
        .collect::<Result<Vec<_>, _>>()?;
    let total = cocktails.len();

    Ok(SearchCocktailsResponse { cocktails, total })
}

/// Update a cocktail's name, technique or garnish
pub fn update_cocktail(
    db: &Database,
    id: i64,
    name: Option<String>,
    technique_code: Option<String>,
    garnish: Option<String>,
) -> Result<CocktailDetail, String> {
    if let Some(ref n) = name {
        if n.trim().is_empty() {
            return Err("Cocktail name cannot be empty".to_string());
        }
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let technique_id = match technique_code {
        Some(code) => Some(resolve_technique(&conn, &code)?.id),
        None => None,
    };

    let data = CocktailUpdate {
        name: name.map(|n| n.trim().to_string()),
        technique_id,
        garnish,
    };

    Cocktail::update(&conn, id, &data)
        .map_err(|e| format!("Failed to update cocktail: {}", e))?
        .ok_or_else(|| format!("Cocktail not found with id: {}", id))?;

    tracing::info!(id, "Updated cocktail");

    require_detail(&conn, id)
}

/// Delete a cocktail with its ingredients and steps
pub fn delete_cocktail(db: &Database, id: i64) -> Result<DeleteCocktailResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let cocktail = require_cocktail(&conn, id)?;
    Cocktail::delete(&conn, id).map_err(|e| format!("Failed to delete cocktail: {}", e))?;

    tracing::info!(id, name = %cocktail.name, "Deleted cocktail");

    Ok(DeleteCocktailResponse {
        success: true,
        deleted_id: id,
        name: cocktail.name,
    })
}

// ============================================================================
// Cocktail ingredients
// ============================================================================

/// Add an ingredient to the end of a cocktail
pub fn add_cocktail_ingredient(db: &Database, cocktail_id: i64, input: DoseInput) -> Result<CocktailDetail, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    require_cocktail(&conn, cocktail_id)?;
    let dose = resolve_dose(&conn, &input)?;

    let existing = CocktailIngredient::get_for_cocktail(&conn, cocktail_id)
        .map_err(|e| format!("Failed to get ingredients: {}", e))?;
    if existing.iter().any(|ci| ci.ingredient_id == dose.ingredient_id) {
        return Err(format!(
            "Ingredient {} is already in this cocktail; update its amount instead",
            dose.ingredient_id
        ));
    }

    CocktailIngredient::create(
        &conn,
        &CocktailIngredientCreate {
            cocktail_id,
            ingredient_id: dose.ingredient_id,
            unit_id: dose.unit_id,
            amount: dose.amount,
            after_technique: input.after_technique,
        },
    )
    .map_err(|e| format!("Failed to add ingredient: {}", e))?;
    touch(&conn, cocktail_id)?;

    require_detail(&conn, cocktail_id)
}

/// Change the amount, unit or timing of a cocktail ingredient
pub fn update_cocktail_ingredient(
    db: &Database,
    cocktail_ingredient_id: i64,
    amount: Option<f64>,
    unit: Option<String>,
    after_technique: Option<bool>,
) -> Result<CocktailDetail, String> {
    let amount = amount.map(parse_amount).transpose()?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let item = require_cocktail_ingredient(&conn, cocktail_ingredient_id)?;
    let unit_id = match unit {
        Some(unit) => Some(resolve_unit(&conn, &unit)?.0.id),
        None => None,
    };

    let data = CocktailIngredientUpdate {
        amount,
        unit_id,
        after_technique,
    };
    CocktailIngredient::update(&conn, cocktail_ingredient_id, &data)
        .map_err(|e| format!("Failed to update ingredient: {}", e))?;
    touch(&conn, item.cocktail_id)?;

    require_detail(&conn, item.cocktail_id)
}

/// Remove an ingredient from its cocktail
pub fn remove_cocktail_ingredient(db: &Database, cocktail_ingredient_id: i64) -> Result<CocktailDetail, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let item = require_cocktail_ingredient(&conn, cocktail_ingredient_id)?;
    CocktailIngredient::delete(&conn, cocktail_ingredient_id)
        .map_err(|e| format!("Failed to remove ingredient: {}", e))?;
    touch(&conn, item.cocktail_id)?;

    require_detail(&conn, item.cocktail_id)
}

/// Move an ingredient to the front of its cocktail
pub fn move_cocktail_ingredient_up(db: &Database, cocktail_ingredient_id: i64) -> Result<CocktailDetail, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let item = require_cocktail_ingredient(&conn, cocktail_ingredient_id)?;
    CocktailIngredient::move_to_front(&conn, cocktail_ingredient_id)
        .map_err(|e| format!("Failed to move ingredient: {}", e))?;
    touch(&conn, item.cocktail_id)?;

    require_detail(&conn, item.cocktail_id)
}

// ============================================================================
// Recipe steps
// ============================================================================

/// Append a recipe step to a cocktail
pub fn add_recipe_step(db: &Database, cocktail_id: i64, description: &str) -> Result<CocktailDetail, String> {
    let description = require_description(description)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    require_cocktail(&conn, cocktail_id)?;
    CocktailStep::create(&conn, cocktail_id, description)
        .map_err(|e| format!("Failed to add recipe step: {}", e))?;
    touch(&conn, cocktail_id)?;

    require_detail(&conn, cocktail_id)
}

/// Reword a recipe step
pub fn update_recipe_step(db: &Database, step_id: i64, description: &str) -> Result<CocktailDetail, String> {
    let description = require_description(description)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let step = require_step(&conn, step_id)?;
    CocktailStep::update(&conn, step_id, description)
        .map_err(|e| format!("Failed to update recipe step: {}", e))?;
    touch(&conn, step.cocktail_id)?;

    require_detail(&conn, step.cocktail_id)
}

/// Remove a recipe step; later steps close the gap
pub fn remove_recipe_step(db: &Database, step_id: i64) -> Result<CocktailDetail, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let step = require_step(&conn, step_id)?;
    CocktailStep::delete(&conn, step_id)
        .map_err(|e| format!("Failed to remove recipe step: {}", e))?;
    touch(&conn, step.cocktail_id)?;

    require_detail(&conn, step.cocktail_id)
}

/// Swap a recipe step with the one before it
pub fn move_recipe_step_up(db: &Database, step_id: i64) -> Result<CocktailDetail, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let step = require_step(&conn, step_id)?;
    CocktailStep::move_up(&conn, step_id)
        .map_err(|e| format!("Failed to move recipe step: {}", e))?;
    touch(&conn, step.cocktail_id)?;

    require_detail(&conn, step.cocktail_id)
}

// ============================================================================
// Preview
// ============================================================================

/// Compute a profile for an unsaved set of ingredients
pub fn preview_cocktail_profile(
    db: &Database,
    technique_code: &str,
    ingredients: Vec<DoseInput>,
) -> Result<PreviewProfileResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let technique = resolve_technique(&conn, technique_code)?;
    let doses = ingredients
        .iter()
        .map(|input| resolve_dose(&conn, input).map(|resolved| resolved.dose))
        .collect::<Result<Vec<_>, _>>()?;

    let profile = get_cocktail_profile(technique.code, &doses);
    let (balance, balanced) = balance_for(&technique, &profile);

    tracing::debug!(technique = %technique.code, doses = doses.len(), "Previewed profile");

    Ok(PreviewProfileResponse {
        technique: TechniqueRef::from(&technique),
        profile_summary: profile.to_string(),
        profile,
        balance,
        balanced,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mixology::{compute_dilution, BalanceProperty};
    use crate::tools::ingredients::add_ingredient;
    use crate::tools::test_support::test_db;

    fn dose(ingredient_id: i64, amount: f64, unit: &str) -> DoseInput {
        DoseInput {
            ingredient_id,
            amount,
            unit: unit.to_string(),
            after_technique: false,
        }
    }

    /// Gin and dry vermouth
    fn martini_inputs(db: &Database) -> Vec<DoseInput> {
        let gin = add_ingredient(db, "Gin", Some(40.0), None, None).unwrap();
        let vermouth = add_ingredient(db, "Dry Vermouth", Some(18.0), Some(3.0), Some(0.6)).unwrap();
        vec![dose(gin.id, 2.0, "oz"), dose(vermouth.id, 30.0, "ml")]
    }

    #[test]
    fn test_create_and_get_cocktail() {
        let db = test_db();
        let inputs = martini_inputs(&db);

        let created = create_cocktail(
            &db,
            " Martini ",
            "STIRRED",
            inputs,
            vec!["Stir with ice".to_string(), "Strain into a chilled coupe".to_string()],
            Some("Lemon twist".to_string()),
        )
        .unwrap();

        assert_eq!(created.name, "Martini");
        assert_eq!(created.technique.code, TechniqueCode::Stirred);
        assert_eq!(created.ingredients.len(), 2);
        assert_eq!(created.steps.len(), 2);

        // 24 ml + 5.4 ml alcohol in 90 ml
        let abv_before = NonNegative::new((24.0 + 5.4) / 90.0 * 100.0).unwrap();
        let dilution = compute_dilution(abv_before, TechniqueCode::Stirred).get();
        assert!((created.profile.dilution.get() - dilution).abs() < 1e-9);
        let final_volume = 90.0 * (1.0 + dilution / 100.0);
        assert!((created.profile.volume_ml.get() - final_volume).abs() < 1e-9);

        assert_eq!(created.balance.len(), 5);
        assert_eq!(created.balance[0].property, BalanceProperty::Volume);

        let fetched = get_cocktail(&db, created.id).unwrap().unwrap();
        assert_eq!(fetched.profile, created.profile);
        assert_eq!(fetched.garnish.as_deref(), Some("Lemon twist"));
        assert!(get_cocktail(&db, 999).unwrap().is_none());
    }

    #[test]
    fn test_create_rejects_bad_input() {
        let db = test_db();
        let inputs = martini_inputs(&db);

        let err = create_cocktail(&db, "Martini", "MUDDLED", inputs.clone(), vec![], None).unwrap_err();
        assert!(err.contains("Unknown technique"));

        let mut duplicated = inputs.clone();
        duplicated.push(inputs[0].clone());
        assert!(create_cocktail(&db, "Martini", "STIRRED", duplicated, vec![], None).is_err());

        let mut percentage_unit = inputs.clone();
        percentage_unit[0].unit = "ABV".to_string();
        let err = create_cocktail(&db, "Martini", "STIRRED", percentage_unit, vec![], None).unwrap_err();
        assert!(err.contains("Unknown volume unit"));

        let mut negative = inputs;
        negative[1].amount = -1.0;
        assert!(create_cocktail(&db, "Martini", "STIRRED", negative, vec![], None).is_err());

        // Nothing was written by the failed attempts
        assert_eq!(list_cocktails(&db, None, 50, 0).unwrap().total, 0);
    }

    #[test]
    fn test_preview_matches_stored_profile() {
        let db = test_db();
        let inputs = martini_inputs(&db);

        let preview = preview_cocktail_profile(&db, "stirred", inputs.clone()).unwrap();
        let created = create_cocktail(&db, "Martini", "STIRRED", inputs, vec![], None).unwrap();
        assert_eq!(preview.profile, created.profile);
        assert_eq!(preview.profile_summary, created.profile_summary);

        let empty = preview_cocktail_profile(&db, "BUILT", vec![]).unwrap();
        assert_eq!(empty.profile.volume_ml.get(), 0.0);
        assert_eq!(empty.profile.dilution.get(), 24.0);
    }

    #[test]
    fn test_ingredient_editing() {
        let db = test_db();
        let inputs = martini_inputs(&db);
        let bitters = add_ingredient(&db, "Orange Bitters", Some(28.0), None, None).unwrap();
        let created = create_cocktail(&db, "Martini", "STIRRED", inputs, vec![], None).unwrap();

        let added = add_cocktail_ingredient(&db, created.id, dose(bitters.id, 2.0, "dash")).unwrap();
        assert_eq!(added.ingredients.len(), 3);
        assert!(add_cocktail_ingredient(&db, created.id, dose(bitters.id, 1.0, "dash")).is_err());

        let bitters_row = added.ingredients[2].id;
        let moved = move_cocktail_ingredient_up(&db, bitters_row).unwrap();
        assert_eq!(moved.ingredients[0].ingredient_name, "Orange Bitters");

        let updated = update_cocktail_ingredient(&db, bitters_row, Some(3.0), None, Some(true)).unwrap();
        let row = updated.ingredients.iter().find(|i| i.id == bitters_row).unwrap();
        assert_eq!(row.amount.get(), 3.0);
        assert!(row.after_technique);
        assert!(update_cocktail_ingredient(&db, bitters_row, None, Some("Sugar".to_string()), None).is_err());

        let removed = remove_cocktail_ingredient(&db, bitters_row).unwrap();
        assert_eq!(removed.ingredients.len(), 2);
        assert!(remove_cocktail_ingredient(&db, bitters_row).is_err());
    }

    #[test]
    fn test_recipe_steps() {
        let db = test_db();
        let created = create_cocktail(&db, "Highball", "BUILT", vec![], vec!["Fill with ice".to_string()], None).unwrap();

        assert!(add_recipe_step(&db, created.id, "  ").is_err());
        let detail = add_recipe_step(&db, created.id, "Top with soda").unwrap();
        assert_eq!(detail.steps.len(), 2);

        let second = detail.steps[1].id;
        let moved = move_recipe_step_up(&db, second).unwrap();
        assert_eq!(moved.steps[0].description, "Top with soda");

        // Already first
        let unchanged = move_recipe_step_up(&db, second).unwrap();
        assert_eq!(unchanged.steps[0].id, second);

        let reworded = update_recipe_step(&db, second, "Top with club soda").unwrap();
        assert_eq!(reworded.steps[0].description, "Top with club soda");

        let removed = remove_recipe_step(&db, second).unwrap();
        assert_eq!(removed.steps.len(), 1);
        assert_eq!(removed.steps[0].description, "Fill with ice");
    }

    #[test]
    fn test_update_list_and_delete() {
        let db = test_db();
        let inputs = martini_inputs(&db);
        let created = create_cocktail(&db, "Martini", "STIRRED", inputs, vec![], None).unwrap();

        let shaken = update_cocktail(&db, created.id, None, Some("SHAKEN".to_string()), None).unwrap();
        assert_eq!(shaken.technique.code, TechniqueCode::Shaken);
        assert!(shaken.profile.dilution > created.profile.dilution);
        assert!(update_cocktail(&db, created.id, Some(" ".to_string()), None, None).is_err());

        let listed = list_cocktails(&db, Some("mart"), 10, 0).unwrap();
        assert_eq!(listed.total, 1);
        assert_eq!(listed.cocktails[0].technique, TechniqueCode::Shaken);
        assert_eq!(listed.cocktails[0].profile_summary, shaken.profile_summary);
        assert_eq!(search_cocktails(&db, "negroni", 10).unwrap().total, 0);

        let deleted = delete_cocktail(&db, created.id).unwrap();
        assert_eq!(deleted.name, "Martini");
        assert!(delete_cocktail(&db, created.id).is_err());
    }
}
