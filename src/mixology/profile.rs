//! Cocktail profile calculator
//!
//! Derives the final volume, ABV, sugar and acid content of a cocktail from
//! its dosed ingredients and the dilution its technique adds.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::dilution::{compute_dilution, TechniqueCode};
use super::quantity::{percentage_of, NonNegative};
use super::units::ML_PER_OZ;

/// A tracked chemical property of an ingredient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChemicalProperty {
    Abv,
    Sugar,
    Acid,
}

impl ChemicalProperty {
    pub const ALL: [ChemicalProperty; 3] =
        [ChemicalProperty::Abv, ChemicalProperty::Sugar, ChemicalProperty::Acid];

    /// Canonical range name
    pub fn name(&self) -> &'static str {
        match self {
            ChemicalProperty::Abv => "ABV",
            ChemicalProperty::Sugar => "Sugar",
            ChemicalProperty::Acid => "Acid",
        }
    }

    /// Parse a range name (case-insensitive)
    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "abv" => Some(ChemicalProperty::Abv),
            "sugar" => Some(ChemicalProperty::Sugar),
            "acid" => Some(ChemicalProperty::Acid),
            _ => None,
        }
    }
}

/// Declared percentage-by-volume contents of an ingredient.
///
/// An undeclared property contributes nothing to a mixture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ChemicalContents {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abv: Option<NonNegative>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugar: Option<NonNegative>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acid: Option<NonNegative>,
}

impl ChemicalContents {
    pub fn get(&self, property: ChemicalProperty) -> Option<NonNegative> {
        match property {
            ChemicalProperty::Abv => self.abv,
            ChemicalProperty::Sugar => self.sugar,
            ChemicalProperty::Acid => self.acid,
        }
    }

    pub fn set(&mut self, property: ChemicalProperty, amount: Option<NonNegative>) {
        let slot = match property {
            ChemicalProperty::Abv => &mut self.abv,
            ChemicalProperty::Sugar => &mut self.sugar,
            ChemicalProperty::Acid => &mut self.acid,
        };
        *slot = amount;
    }

    /// Record a declared range unless the property already has one.
    /// Returns false when the declaration was ignored.
    pub fn declare(&mut self, property: ChemicalProperty, amount: NonNegative) -> bool {
        if self.get(property).is_some() {
            return false;
        }
        self.set(property, Some(amount));
        true
    }

    /// Declared properties in canonical order
    pub fn declared(&self) -> impl Iterator<Item = (ChemicalProperty, NonNegative)> + '_ {
        ChemicalProperty::ALL
            .into_iter()
            .filter_map(move |property| self.get(property).map(|amount| (property, amount)))
    }

    pub fn is_empty(&self) -> bool {
        self.declared().next().is_none()
    }
}

impl fmt::Display for ChemicalContents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (property, amount)) in self.declared().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}% {}", amount, property.name())?;
        }
        Ok(())
    }
}

/// One dosed ingredient as the calculator sees it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dose {
    pub amount: NonNegative,
    /// Milliliters per unit of `amount`
    pub ml_per_unit: NonNegative,
    pub contents: ChemicalContents,
    /// Added after the technique (top-up, float); not part of the diluted mix
    #[serde(default)]
    pub after_technique: bool,
}

impl Dose {
    pub fn volume_ml(&self) -> f64 {
        self.amount.get() * self.ml_per_unit.get()
    }

    /// Milliliters of `property` carried by this dose
    fn content_ml(&self, property: ChemicalProperty) -> f64 {
        match self.contents.get(property) {
            Some(range) => range.get() / 100.0 * self.volume_ml(),
            None => 0.0,
        }
    }
}

/// Final physical profile of a cocktail
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CocktailProfile {
    pub volume_ml: NonNegative,
    pub volume_oz: NonNegative,
    pub abv: NonNegative,
    pub sugar_content_pct: NonNegative,
    pub acid_content_pct: NonNegative,
    pub dilution: NonNegative,
}

impl CocktailProfile {
    /// Final percentage content for a property
    pub fn content(&self, property: ChemicalProperty) -> NonNegative {
        match property {
            ChemicalProperty::Abv => self.abv,
            ChemicalProperty::Sugar => self.sugar_content_pct,
            ChemicalProperty::Acid => self.acid_content_pct,
        }
    }
}

impl fmt::Display for CocktailProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Volume {:.2} ml ({:.2} oz) | ABV {:.2}% | Sugar {:.2}% | Acid {:.2}% | Dilution {:.2}%",
            self.volume_ml.get(),
            self.volume_oz.get(),
            self.abv.get(),
            self.sugar_content_pct.get(),
            self.acid_content_pct.get(),
            self.dilution.get(),
        )
    }
}

/// Weighted percentage of `property` across `doses`, against `volume_ml`
fn content_pct<'a, I>(doses: I, volume_ml: f64, property: ChemicalProperty) -> NonNegative
where
    I: IntoIterator<Item = &'a Dose>,
{
    let content_ml: f64 = doses.into_iter().map(|dose| dose.content_ml(property)).sum();
    percentage_of(content_ml, volume_ml)
}

/// Compute the profile of a cocktail prepared with `technique`.
///
/// Steps run in a fixed order: initial volume, pre-technique ABV, dilution
/// and final volume, then final contents.
pub fn get_cocktail_profile(technique: TechniqueCode, ingredients: &[Dose]) -> CocktailProfile {
    let initial_volume_ml: f64 = ingredients.iter().map(Dose::volume_ml).sum();

    // Numerator covers pre-technique doses only; denominator is the full
    // initial volume, post-technique doses included.
    let abv_before_technique = content_pct(
        ingredients.iter().filter(|dose| !dose.after_technique),
        initial_volume_ml,
        ChemicalProperty::Abv,
    );

    let dilution = compute_dilution(abv_before_technique, technique);
    let dilution_addendum = 1.0 + dilution.get() / 100.0;
    let final_volume_ml = initial_volume_ml * dilution_addendum;

    tracing::trace!(
        technique = technique.as_str(),
        initial_volume_ml,
        abv_before_technique = abv_before_technique.get(),
        final_volume_ml,
        "Computed cocktail dilution"
    );

    CocktailProfile {
        volume_ml: NonNegative::saturating(final_volume_ml),
        volume_oz: NonNegative::saturating(final_volume_ml / ML_PER_OZ),
        abv: content_pct(ingredients, final_volume_ml, ChemicalProperty::Abv),
        sugar_content_pct: content_pct(ingredients, final_volume_ml, ChemicalProperty::Sugar),
        acid_content_pct: content_pct(ingredients, final_volume_ml, ChemicalProperty::Acid),
        dilution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nn(value: f64) -> NonNegative {
        NonNegative::new(value).unwrap()
    }

    fn dose(amount_ml: f64, contents: ChemicalContents, after_technique: bool) -> Dose {
        Dose {
            amount: nn(amount_ml),
            ml_per_unit: nn(1.0),
            contents,
            after_technique,
        }
    }

    fn spirit() -> ChemicalContents {
        ChemicalContents { abv: Some(nn(40.0)), ..Default::default() }
    }

    #[test]
    fn test_empty_cocktail() {
        for technique in TechniqueCode::ALL {
            let profile = get_cocktail_profile(technique, &[]);
            assert_eq!(profile.volume_ml, NonNegative::ZERO);
            assert_eq!(profile.volume_oz, NonNegative::ZERO);
            assert_eq!(profile.abv, NonNegative::ZERO);
            assert_eq!(profile.sugar_content_pct, NonNegative::ZERO);
            assert_eq!(profile.acid_content_pct, NonNegative::ZERO);
            assert_eq!(profile.dilution, compute_dilution(NonNegative::ZERO, technique));
        }
    }

    #[test]
    fn test_single_spirit_stirred() {
        let profile = get_cocktail_profile(TechniqueCode::Stirred, &[dose(60.0, spirit(), false)]);

        let dilution = compute_dilution(nn(40.0), TechniqueCode::Stirred).get();
        let final_volume = 60.0 * (1.0 + dilution / 100.0);

        assert!((profile.dilution.get() - dilution).abs() < 1e-9);
        assert!((profile.volume_ml.get() - final_volume).abs() < 1e-9);
        assert!((profile.volume_oz.get() - final_volume / 30.0).abs() < 1e-9);
        assert!((profile.abv.get() - 0.4 * 60.0 / final_volume * 100.0).abs() < 1e-9);
        assert_eq!(profile.sugar_content_pct, NonNegative::ZERO);
    }

    #[test]
    fn test_after_technique_volume_enters_pre_technique_denominator() {
        let soda = ChemicalContents { abv: Some(nn(0.0)), ..Default::default() };
        let ingredients = [dose(60.0, spirit(), false), dose(60.0, soda, true)];
        let profile = get_cocktail_profile(TechniqueCode::Stirred, &ingredients);

        // 24 ml ethanol over the full 120 ml gives 20% before the technique
        let expected_dilution = compute_dilution(nn(20.0), TechniqueCode::Stirred).get();
        assert!((profile.dilution.get() - expected_dilution).abs() < 1e-9);
        assert!((expected_dilution - 34.58).abs() < 1e-9);

        let final_volume = 120.0 * (1.0 + expected_dilution / 100.0);
        assert!((profile.volume_ml.get() - final_volume).abs() < 1e-9);
        assert!((profile.abv.get() - 24.0 / final_volume * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_after_technique_ethanol_excluded_from_dilution() {
        let ingredients = [dose(60.0, spirit(), true)];
        let profile = get_cocktail_profile(TechniqueCode::Shaken, &ingredients);

        assert!((profile.dilution.get() - 20.3).abs() < 1e-9);
        // Still counted in the final content
        let final_volume = 60.0 * 1.203;
        assert!((profile.abv.get() - 24.0 / final_volume * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_range_contributes_zero() {
        let syrup = ChemicalContents { sugar: Some(nn(50.0)), ..Default::default() };
        let ingredients = [dose(60.0, spirit(), false), dose(15.0, syrup, false)];
        let profile = get_cocktail_profile(TechniqueCode::Built, &ingredients);

        let final_volume = 75.0 * 1.24;
        assert_eq!(profile.dilution.get(), 24.0);
        assert!((profile.sugar_content_pct.get() - 7.5 / final_volume * 100.0).abs() < 1e-9);
        assert_eq!(profile.acid_content_pct, NonNegative::ZERO);
    }

    #[test]
    fn test_zero_amounts_stay_finite() {
        let ingredients = [dose(0.0, spirit(), false)];
        let profile = get_cocktail_profile(TechniqueCode::Blended, &ingredients);
        assert_eq!(profile.volume_ml, NonNegative::ZERO);
        assert_eq!(profile.abv, NonNegative::ZERO);
        assert_eq!(profile.dilution.get(), 90.0);
    }

    #[test]
    fn test_unit_factor_applies() {
        let ounce = Dose {
            amount: nn(2.0),
            ml_per_unit: nn(30.0),
            contents: spirit(),
            after_technique: false,
        };
        let profile = get_cocktail_profile(TechniqueCode::Built, &[ounce]);
        assert!((profile.volume_ml.get() - 60.0 * 1.24).abs() < 1e-9);
    }

    #[test]
    fn test_profile_is_deterministic() {
        let lime = ChemicalContents {
            sugar: Some(nn(1.6)),
            acid: Some(nn(6.0)),
            ..Default::default()
        };
        let ingredients = [
            dose(45.0, spirit(), false),
            dose(22.5, lime, false),
            dose(30.0, ChemicalContents::default(), true),
        ];
        let first = get_cocktail_profile(TechniqueCode::ShakenWithEgg, &ingredients);
        let second = get_cocktail_profile(TechniqueCode::ShakenWithEgg, &ingredients);
        assert_eq!(first.volume_ml.get().to_bits(), second.volume_ml.get().to_bits());
        assert_eq!(first.abv.get().to_bits(), second.abv.get().to_bits());
        assert_eq!(first.acid_content_pct.get().to_bits(), second.acid_content_pct.get().to_bits());
        assert_eq!(first, second);
    }

    #[test]
    fn test_contents_first_declaration_wins() {
        let mut contents = ChemicalContents::default();
        assert!(contents.declare(ChemicalProperty::Abv, nn(40.0)));
        assert!(!contents.declare(ChemicalProperty::Abv, nn(12.0)));
        assert_eq!(contents.abv, Some(nn(40.0)));
    }

    #[test]
    fn test_contents_display() {
        let contents = ChemicalContents {
            abv: Some(nn(40.0)),
            sugar: Some(nn(5.5)),
            acid: None,
        };
        assert_eq!(contents.to_string(), "40% ABV, 5.5% Sugar");
        assert_eq!(ChemicalContents::default().to_string(), "");
        assert!(ChemicalContents::default().is_empty());
    }

    #[test]
    fn test_property_names() {
        for property in ChemicalProperty::ALL {
            assert_eq!(ChemicalProperty::from_name(property.name()), Some(property));
        }
        assert_eq!(ChemicalProperty::from_name("abv"), Some(ChemicalProperty::Abv));
        assert_eq!(ChemicalProperty::from_name("Salt"), None);
    }

    #[test]
    fn test_profile_display() {
        let profile = get_cocktail_profile(TechniqueCode::Built, &[dose(60.0, spirit(), false)]);
        assert_eq!(
            profile.to_string(),
            "Volume 74.40 ml (2.48 oz) | ABV 32.26% | Sugar 0.00% | Acid 0.00% | Dilution 24.00%"
        );
    }
}
