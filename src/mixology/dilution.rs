//! Technique dilution model
//!
//! Empirical regression curves for how much ice melt each preparation style
//! adds, as a percentage of the pre-technique volume.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::quantity::NonNegative;

/// How a cocktail is prepared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TechniqueCode {
    Built,
    Stirred,
    Shaken,
    ShakenWithEgg,
    Blended,
    Carbonated,
}

impl TechniqueCode {
    pub const ALL: [TechniqueCode; 6] = [
        TechniqueCode::Built,
        TechniqueCode::Stirred,
        TechniqueCode::Shaken,
        TechniqueCode::ShakenWithEgg,
        TechniqueCode::Blended,
        TechniqueCode::Carbonated,
    ];

    /// Canonical code string, as stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            TechniqueCode::Built => "BUILT",
            TechniqueCode::Stirred => "STIRRED",
            TechniqueCode::Shaken => "SHAKEN",
            TechniqueCode::ShakenWithEgg => "SHAKEN_WITH_EGG",
            TechniqueCode::Blended => "BLENDED",
            TechniqueCode::Carbonated => "CARBONATED",
        }
    }

    /// Parse from string (case-insensitive, spaces or dashes accepted)
    pub fn from_str(s: &str) -> Option<Self> {
        let normalized = s.trim().to_uppercase().replace([' ', '-'], "_");
        Self::ALL.into_iter().find(|code| code.as_str() == normalized)
    }

    /// Default display name
    pub fn display_name(&self) -> &'static str {
        match self {
            TechniqueCode::Built => "Built",
            TechniqueCode::Stirred => "Stirred",
            TechniqueCode::Shaken => "Shaken",
            TechniqueCode::ShakenWithEgg => "Shaken with egg",
            TechniqueCode::Blended => "Blended",
            TechniqueCode::Carbonated => "Carbonated",
        }
    }
}

impl fmt::Display for TechniqueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Estimate dilution (percent) for a mixture of the given ABV (0-100 scale)
pub fn compute_dilution(abv_percent: NonNegative, technique: TechniqueCode) -> NonNegative {
    let a = abv_percent.get() / 100.0;

    let dilution = match technique {
        TechniqueCode::Built => 24.0,
        TechniqueCode::Stirred => (-1.21 * a.powi(2) + 1.246 * a + 0.145) * 100.0,
        TechniqueCode::Shaken | TechniqueCode::ShakenWithEgg | TechniqueCode::Carbonated => {
            (1.567 * a.powi(2) + 1.742 * a + 0.203) * 100.0
        }
        TechniqueCode::Blended => 90.0,
    };

    // Stirred curve turns negative past ~113% ABV
    NonNegative::saturating(dilution)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abv(value: f64) -> NonNegative {
        NonNegative::new(value).unwrap()
    }

    #[test]
    fn test_constant_techniques() {
        for value in [0.0, 12.0, 40.0, 75.5, 100.0] {
            assert_eq!(compute_dilution(abv(value), TechniqueCode::Built).get(), 24.0);
            assert_eq!(compute_dilution(abv(value), TechniqueCode::Blended).get(), 90.0);
        }
    }

    #[test]
    fn test_stirred_known_points() {
        let zero = compute_dilution(abv(0.0), TechniqueCode::Stirred).get();
        assert!((zero - 14.5).abs() < 1e-9);

        // a = 0.4: -1.21 * 0.16 + 1.246 * 0.4 + 0.145 = 0.4498
        let forty = compute_dilution(abv(40.0), TechniqueCode::Stirred).get();
        assert!((forty - 44.98).abs() < 1e-9);
    }

    #[test]
    fn test_shaken_family_shares_curve() {
        let zero = compute_dilution(abv(0.0), TechniqueCode::Shaken).get();
        assert!((zero - 20.3).abs() < 1e-9);

        // a = 0.2: 1.567 * 0.04 + 1.742 * 0.2 + 0.203 = 0.61408
        let shaken = compute_dilution(abv(20.0), TechniqueCode::Shaken).get();
        assert!((shaken - 61.408).abs() < 1e-9);
        assert_eq!(compute_dilution(abv(20.0), TechniqueCode::ShakenWithEgg).get(), shaken);
        assert_eq!(compute_dilution(abv(20.0), TechniqueCode::Carbonated).get(), shaken);
    }

    #[test]
    fn test_regression_curves_increase_over_plausible_range() {
        // Stirred curve peaks near 51.5% ABV
        for (technique, upper) in [(TechniqueCode::Stirred, 50), (TechniqueCode::Shaken, 60)] {
            let mut previous = compute_dilution(abv(0.0), technique).get();
            for step in 1..=upper {
                let current = compute_dilution(abv(step as f64), technique).get();
                assert!(current > previous, "{} not increasing at {}%", technique, step);
                previous = current;
            }
        }
    }

    #[test]
    fn test_stirred_never_negative() {
        assert_eq!(compute_dilution(abv(500.0), TechniqueCode::Stirred), NonNegative::ZERO);
    }

    #[test]
    fn test_code_parsing() {
        assert_eq!(TechniqueCode::from_str("SHAKEN_WITH_EGG"), Some(TechniqueCode::ShakenWithEgg));
        assert_eq!(TechniqueCode::from_str("shaken with egg"), Some(TechniqueCode::ShakenWithEgg));
        assert_eq!(TechniqueCode::from_str("stirred"), Some(TechniqueCode::Stirred));
        assert_eq!(TechniqueCode::from_str("THROWN"), None);
        for code in TechniqueCode::ALL {
            assert_eq!(TechniqueCode::from_str(code.as_str()), Some(code));
        }
    }

    #[test]
    fn test_serde_uses_screaming_codes() {
        let json = serde_json::to_string(&TechniqueCode::ShakenWithEgg).unwrap();
        assert_eq!(json, "\"SHAKEN_WITH_EGG\"");
    }
}
