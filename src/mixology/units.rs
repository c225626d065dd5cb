//! Unit types and conversion constants
//!
//! Volume units used to dose cocktail ingredients, with their milliliter
//! equivalents. Percentage units only label declared chemical ranges.

use serde::{Deserialize, Serialize};

/// Kind of a measurement unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitKind {
    /// Dosable liquid measure with a fixed ml factor
    Volume,
    /// Concentration label (ABV, Sugar, Acid); carries no ml factor
    Percentage,
}

impl UnitKind {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "VOLUME" => Some(UnitKind::Volume),
            "PERCENTAGE" => Some(UnitKind::Percentage),
            _ => None,
        }
    }

    /// Convert to database string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            UnitKind::Volume => "VOLUME",
            UnitKind::Percentage => "PERCENTAGE",
        }
    }
}

// ============================================================================
// Volume Conversion Constants (to milliliters)
// ============================================================================

/// Milliliters per ounce, bar convention (also the oz figure in profiles)
pub const ML_PER_OZ: f64 = 30.0;
/// Milliliters per centiliter
pub const ML_PER_CL: f64 = 10.0;
/// Milliliters per dash of bitters
pub const ML_PER_DASH: f64 = 0.9;
/// Milliliters per drop
pub const ML_PER_DROP: f64 = 0.05;
/// Milliliters per teaspoon, bar convention
pub const ML_PER_TSP: f64 = 5.0;

/// Get the conversion factor to milliliters for a volume unit symbol or name
pub fn ml_per_unit(unit: &str) -> Option<f64> {
    let lower = unit.to_lowercase();
    let trimmed = lower.trim();

    match trimmed {
        "ml" | "milliliter" | "milliliters" | "millilitre" | "millilitres" => Some(1.0),
        "oz" | "ounce" | "ounces" => Some(ML_PER_OZ),
        "cl" | "centiliter" | "centiliters" | "centilitre" | "centilitres" => Some(ML_PER_CL),
        "dash" | "dashes" => Some(ML_PER_DASH),
        "drop" | "drops" => Some(ML_PER_DROP),
        "tsp" | "teaspoon" | "teaspoons" => Some(ML_PER_TSP),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ml_per_unit() {
        assert_eq!(ml_per_unit("ml"), Some(1.0));
        assert_eq!(ml_per_unit("oz"), Some(ML_PER_OZ));
        assert_eq!(ml_per_unit(" Ounces "), Some(ML_PER_OZ));
        assert_eq!(ml_per_unit("cl"), Some(10.0));
        assert_eq!(ml_per_unit("dashes"), Some(ML_PER_DASH));
        assert_eq!(ml_per_unit("tsp"), Some(ML_PER_TSP));
        assert_eq!(ml_per_unit("%"), None);
        assert_eq!(ml_per_unit("cup"), None);
    }

    #[test]
    fn test_unit_kind_round_trip_through_db_str() {
        for kind in [UnitKind::Volume, UnitKind::Percentage] {
            assert_eq!(UnitKind::from_str(kind.to_db_str()), Some(kind));
        }
        assert_eq!(UnitKind::from_str("volume"), Some(UnitKind::Volume));
        assert_eq!(UnitKind::from_str("weight"), None);
    }
}
