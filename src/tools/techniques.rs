//! Technique and Unit MCP Tools
//!
//! Read the unit catalog and the preparation techniques, and tune the
//! balance windows each technique declares.

use serde::Serialize;

use crate::db::Database;
use crate::mixology::{
    compute_dilution, get_technique_ranges, BalanceProperty, MinMax, NonNegative, TechniqueBalance,
    TechniqueCode,
};
use crate::models::{Technique, Unit};

/// Response for list_units
#[derive(Debug, Serialize)]
pub struct ListUnitsResponse {
    pub units: Vec<Unit>,
    pub total: usize,
}

/// A technique with its balance windows
#[derive(Debug, Serialize)]
pub struct TechniqueDetail {
    pub id: i64,
    pub name: String,
    pub code: TechniqueCode,
    pub balance: TechniqueBalance,
    /// True when all five windows are declared
    pub complete: bool,
    /// Dilution the technique adds to an alcohol-free mix
    pub base_dilution: NonNegative,
}

impl From<Technique> for TechniqueDetail {
    fn from(technique: Technique) -> Self {
        Self {
            id: technique.id,
            name: technique.name,
            code: technique.code,
            complete: get_technique_ranges(&technique.balance).is_some(),
            base_dilution: compute_dilution(NonNegative::ZERO, technique.code),
            balance: technique.balance,
        }
    }
}

/// Response for list_techniques
#[derive(Debug, Serialize)]
pub struct ListTechniquesResponse {
    pub techniques: Vec<TechniqueDetail>,
}

/// Response for set_technique_range
#[derive(Debug, Serialize)]
pub struct SetTechniqueRangeResponse {
    pub success: bool,
    pub code: TechniqueCode,
    pub property: BalanceProperty,
    pub range: MinMax,
}

/// Response for clear_technique_range
#[derive(Debug, Serialize)]
pub struct ClearTechniqueRangeResponse {
    pub success: bool,
    pub code: TechniqueCode,
    pub property: BalanceProperty,
    /// False when the range was not declared
    pub removed: bool,
}

/// Parse a technique code, listing the valid codes on failure
pub fn parse_technique_code(code: &str) -> Result<TechniqueCode, String> {
    TechniqueCode::from_str(code).ok_or_else(|| {
        let valid: Vec<&str> = TechniqueCode::ALL.iter().map(TechniqueCode::as_str).collect();
        format!("Unknown technique '{}'. Valid codes: {}", code, valid.join(", "))
    })
}

/// List every measurement unit
pub fn list_units(db: &Database) -> Result<ListUnitsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let units = Unit::list(&conn).map_err(|e| format!("Failed to list units: {}", e))?;
    let total = units.len();
    Ok(ListUnitsResponse { units, total })
}

/// List every technique with its windows
pub fn list_techniques(db: &Database) -> Result<ListTechniquesResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let techniques = Technique::list(&conn)
        .map_err(|e| format!("Failed to list techniques: {}", e))?;

    Ok(ListTechniquesResponse {
        techniques: techniques.into_iter().map(TechniqueDetail::from).collect(),
    })
}

/// Get one technique by code
pub fn get_technique(db: &Database, code: &str) -> Result<Option<TechniqueDetail>, String> {
    let code = parse_technique_code(code)?;
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let technique = Technique::get_by_code(&conn, code)
        .map_err(|e| format!("Failed to get technique: {}", e))?;

    Ok(technique.map(TechniqueDetail::from))
}

fn parse_range_property(property: &str) -> Result<BalanceProperty, String> {
    BalanceProperty::from_str(property).ok_or_else(|| {
        format!(
            "Unknown range property '{}'. Valid properties: Ounce, ABV, Sugar, Acid, Dilution",
            property
        )
    })
}

/// Declare or replace one balance window of a technique
pub fn set_technique_range(
    db: &Database,
    code: &str,
    property: &str,
    min: f64,
    max: f64,
) -> Result<SetTechniqueRangeResponse, String> {
    let code = parse_technique_code(code)?;
    let property = parse_range_property(property)?;
    let range = MinMax::new(min, max).ok_or_else(|| {
        format!("Invalid range {}..{}: bounds must be non-negative with min <= max", min, max)
    })?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let technique = Technique::get_by_code(&conn, code)
        .map_err(|e| format!("Failed to get technique: {}", e))?
        .ok_or_else(|| format!("Technique not found: {}", code))?;

    Technique::set_range(&conn, technique.id, property, range)
        .map_err(|e| format!("Failed to set range: {}", e))?;

    tracing::info!(technique = %code, property = property.as_str(), min, max, "Set technique range");

    Ok(SetTechniqueRangeResponse {
        success: true,
        code,
        property,
        range,
    })
}

/// Remove one balance window; the property is then skipped by balance checks
pub fn clear_technique_range(
    db: &Database,
    code: &str,
    property: &str,
) -> Result<ClearTechniqueRangeResponse, String> {
    let code = parse_technique_code(code)?;
    let property = parse_range_property(property)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let technique = Technique::get_by_code(&conn, code)
        .map_err(|e| format!("Failed to get technique: {}", e))?
        .ok_or_else(|| format!("Technique not found: {}", code))?;

    let removed = Technique::clear_range(&conn, technique.id, property)
        .map_err(|e| format!("Failed to clear range: {}", e))?;

    tracing::info!(technique = %code, property = property.as_str(), removed, "Cleared technique range");

    Ok(ClearTechniqueRangeResponse {
        success: true,
        code,
        property,
        removed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::test_db;

    #[test]
    fn test_list_units_and_techniques() {
        let db = test_db();
        let units = list_units(&db).unwrap();
        assert_eq!(units.total, 9);

        let techniques = list_techniques(&db).unwrap().techniques;
        assert_eq!(techniques.len(), 6);
        assert!(techniques.iter().all(|t| t.complete));

        let built = techniques.iter().find(|t| t.code == TechniqueCode::Built).unwrap();
        assert_eq!(built.base_dilution.get(), 24.0);
    }

    #[test]
    fn test_get_technique_by_code() {
        let db = test_db();
        let shaken = get_technique(&db, "shaken with egg").unwrap().unwrap();
        assert_eq!(shaken.code, TechniqueCode::ShakenWithEgg);
        assert!(get_technique(&db, "muddled").is_err());
    }

    #[test]
    fn test_set_technique_range() {
        let db = test_db();
        let err = set_technique_range(&db, "STIRRED", "ABV", 30.0, 20.0).unwrap_err();
        assert!(err.contains("min <= max"));
        assert!(set_technique_range(&db, "STIRRED", "Bitterness", 1.0, 2.0).is_err());
        assert!(set_technique_range(&db, "STIRRED", "Sugar", -1.0, 2.0).is_err());

        let set = set_technique_range(&db, "stirred", "ounce", 2.75, 3.5).unwrap();
        assert_eq!(set.property, BalanceProperty::Volume);

        let stirred = get_technique(&db, "STIRRED").unwrap().unwrap();
        assert_eq!(stirred.balance.volume_oz, MinMax::new(2.75, 3.5));
    }

    #[test]
    fn test_clear_technique_range() {
        let db = test_db();
        let cleared = clear_technique_range(&db, "BLENDED", "Dilution").unwrap();
        assert!(cleared.removed);
        assert!(!clear_technique_range(&db, "BLENDED", "Dilution").unwrap().removed);

        let blended = get_technique(&db, "BLENDED").unwrap().unwrap();
        assert!(blended.balance.dilution.is_none());
        assert!(!blended.complete);
    }
}
