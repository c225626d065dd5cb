//! Technique balance ranges
//!
//! Each technique declares a target window per profile property. A cocktail
//! is balanced when its profile falls inside every declared window.

use serde::{Deserialize, Serialize};

use super::profile::{ChemicalProperty, CocktailProfile};
use super::quantity::NonNegative;

/// A profile property a technique can declare a window for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceProperty {
    /// Final volume, in ounces
    Volume,
    Abv,
    Sugar,
    Acid,
    Dilution,
}

impl BalanceProperty {
    pub const ALL: [BalanceProperty; 5] = [
        BalanceProperty::Volume,
        BalanceProperty::Abv,
        BalanceProperty::Sugar,
        BalanceProperty::Acid,
        BalanceProperty::Dilution,
    ];

    /// Range name as stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            BalanceProperty::Volume => "Ounce",
            BalanceProperty::Abv => "ABV",
            BalanceProperty::Sugar => "Sugar",
            BalanceProperty::Acid => "Acid",
            BalanceProperty::Dilution => "Dilution",
        }
    }

    /// Parse a range name; accepts "Ounce" or "volume" for the volume window
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "ounce" | "oz" | "volume" => Some(BalanceProperty::Volume),
            "abv" => Some(BalanceProperty::Abv),
            "sugar" => Some(BalanceProperty::Sugar),
            "acid" => Some(BalanceProperty::Acid),
            "dilution" => Some(BalanceProperty::Dilution),
            _ => None,
        }
    }

    /// Human-readable column title
    pub fn title(&self) -> &'static str {
        match self {
            BalanceProperty::Volume => "Volume",
            BalanceProperty::Abv => "ABV",
            BalanceProperty::Sugar => "Sweetness",
            BalanceProperty::Acid => "Acidity",
            BalanceProperty::Dilution => "Dilution",
        }
    }

    /// The profile value compared against this property's window
    pub fn value_in(&self, profile: &CocktailProfile) -> NonNegative {
        match self {
            BalanceProperty::Volume => profile.volume_oz,
            BalanceProperty::Abv => profile.content(ChemicalProperty::Abv),
            BalanceProperty::Sugar => profile.content(ChemicalProperty::Sugar),
            BalanceProperty::Acid => profile.content(ChemicalProperty::Acid),
            BalanceProperty::Dilution => profile.dilution,
        }
    }
}

/// Inclusive min/max window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMax {
    pub min: NonNegative,
    pub max: NonNegative,
}

impl MinMax {
    /// Build a window, rejecting negative bounds or `min > max`
    pub fn new(min: f64, max: f64) -> Option<Self> {
        let min = NonNegative::new(min)?;
        let max = NonNegative::new(max)?;
        if min > max {
            return None;
        }
        Some(Self { min, max })
    }

    pub fn verdict(&self, value: NonNegative) -> BalanceVerdict {
        if value < self.min {
            BalanceVerdict::Low
        } else if value > self.max {
            BalanceVerdict::High
        } else {
            BalanceVerdict::Balanced
        }
    }
}

/// Windows declared by a technique; any of them may be missing
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TechniqueBalance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_oz: Option<MinMax>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abv: Option<MinMax>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugar: Option<MinMax>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acid: Option<MinMax>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dilution: Option<MinMax>,
}

impl TechniqueBalance {
    pub fn get(&self, property: BalanceProperty) -> Option<MinMax> {
        match property {
            BalanceProperty::Volume => self.volume_oz,
            BalanceProperty::Abv => self.abv,
            BalanceProperty::Sugar => self.sugar,
            BalanceProperty::Acid => self.acid,
            BalanceProperty::Dilution => self.dilution,
        }
    }

    pub fn set(&mut self, property: BalanceProperty, range: Option<MinMax>) {
        let slot = match property {
            BalanceProperty::Volume => &mut self.volume_oz,
            BalanceProperty::Abv => &mut self.abv,
            BalanceProperty::Sugar => &mut self.sugar,
            BalanceProperty::Acid => &mut self.acid,
            BalanceProperty::Dilution => &mut self.dilution,
        };
        *slot = range;
    }

    /// Declared windows in canonical order
    pub fn declared(&self) -> impl Iterator<Item = (BalanceProperty, MinMax)> + '_ {
        BalanceProperty::ALL
            .into_iter()
            .filter_map(move |property| self.get(property).map(|range| (property, range)))
    }
}

/// Complete set of windows (every property declared)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TechniqueRanges {
    pub volume_oz: MinMax,
    pub abv: MinMax,
    pub sugar: MinMax,
    pub acid: MinMax,
    pub dilution: MinMax,
}

/// All five windows, or None when the technique leaves any undeclared
pub fn get_technique_ranges(balance: &TechniqueBalance) -> Option<TechniqueRanges> {
    Some(TechniqueRanges {
        volume_oz: balance.volume_oz?,
        abv: balance.abv?,
        sugar: balance.sugar?,
        acid: balance.acid?,
        dilution: balance.dilution?,
    })
}

/// Where a profile value sits relative to its window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceVerdict {
    Low,
    Balanced,
    High,
}

/// Comparison of one profile value with its declared window
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BalanceCheck {
    pub property: BalanceProperty,
    pub min: NonNegative,
    pub max: NonNegative,
    pub value: NonNegative,
    pub verdict: BalanceVerdict,
}

/// Check a profile against every window the technique declares.
///
/// Undeclared windows are skipped rather than reported.
pub fn check_balance(profile: &CocktailProfile, balance: &TechniqueBalance) -> Vec<BalanceCheck> {
    balance
        .declared()
        .map(|(property, range)| {
            let value = property.value_in(profile);
            BalanceCheck {
                property,
                min: range.min,
                max: range.max,
                value,
                verdict: range.verdict(value),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(min: f64, max: f64) -> Option<MinMax> {
        MinMax::new(min, max)
    }

    fn full_balance() -> TechniqueBalance {
        TechniqueBalance {
            volume_oz: window(3.0, 4.0),
            abv: window(20.0, 30.0),
            sugar: window(4.0, 7.0),
            acid: window(0.0, 0.2),
            dilution: window(40.0, 50.0),
        }
    }

    fn profile() -> CocktailProfile {
        CocktailProfile {
            volume_ml: NonNegative::saturating(105.0),
            volume_oz: NonNegative::saturating(3.5),
            abv: NonNegative::saturating(32.0),
            sugar_content_pct: NonNegative::saturating(2.0),
            acid_content_pct: NonNegative::saturating(0.1),
            dilution: NonNegative::saturating(45.0),
        }
    }

    #[test]
    fn test_min_max_validation() {
        assert!(MinMax::new(1.0, 2.0).is_some());
        assert!(MinMax::new(2.0, 2.0).is_some());
        assert!(MinMax::new(3.0, 2.0).is_none());
        assert!(MinMax::new(-1.0, 2.0).is_none());
    }

    #[test]
    fn test_get_technique_ranges_requires_all() {
        let mut balance = full_balance();
        let ranges = get_technique_ranges(&balance).unwrap();
        assert_eq!(ranges.dilution, window(40.0, 50.0).unwrap());

        balance.set(BalanceProperty::Dilution, None);
        assert!(get_technique_ranges(&balance).is_none());
        assert!(get_technique_ranges(&TechniqueBalance::default()).is_none());
    }

    #[test]
    fn test_check_balance_verdicts() {
        let checks = check_balance(&profile(), &full_balance());
        let verdicts: Vec<_> = checks.iter().map(|c| (c.property, c.verdict)).collect();
        assert_eq!(
            verdicts,
            vec![
                (BalanceProperty::Volume, BalanceVerdict::Balanced),
                (BalanceProperty::Abv, BalanceVerdict::High),
                (BalanceProperty::Sugar, BalanceVerdict::Low),
                (BalanceProperty::Acid, BalanceVerdict::Balanced),
                (BalanceProperty::Dilution, BalanceVerdict::Balanced),
            ]
        );
        assert_eq!(checks[0].value.get(), 3.5);
    }

    #[test]
    fn test_check_balance_skips_undeclared() {
        let balance = TechniqueBalance { abv: window(20.0, 30.0), ..Default::default() };
        let checks = check_balance(&profile(), &balance);
        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0].property, BalanceProperty::Abv);
    }

    #[test]
    fn test_value_in_reads_profile() {
        let profile = profile();
        let values: Vec<_> = BalanceProperty::ALL
            .iter()
            .map(|property| property.value_in(&profile).get())
            .collect();
        assert_eq!(values, vec![3.5, 32.0, 2.0, 0.1, 45.0]);
        assert_eq!(BalanceProperty::Sugar.value_in(&profile), profile.content(ChemicalProperty::Sugar));
    }

    #[test]
    fn test_property_names() {
        for property in BalanceProperty::ALL {
            assert_eq!(BalanceProperty::from_str(property.as_str()), Some(property));
        }
        assert_eq!(BalanceProperty::from_str("volume"), Some(BalanceProperty::Volume));
        assert_eq!(BalanceProperty::from_str("bitterness"), None);
    }
}
