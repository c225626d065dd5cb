//! Cocktail profile calculation module
//!
//! Handles dilution estimates, weighted mixture contents and technique balance.

pub mod balance;
pub mod dilution;
pub mod profile;
pub mod quantity;
pub mod units;

pub use balance::{
    check_balance, get_technique_ranges, BalanceCheck, BalanceProperty, BalanceVerdict,
    MinMax, TechniqueBalance, TechniqueRanges,
};
pub use dilution::{compute_dilution, TechniqueCode};
pub use profile::{
    get_cocktail_profile, ChemicalContents, ChemicalProperty, CocktailProfile, Dose,
};
pub use quantity::{percentage_of, NonNegative, QuantityError};
pub use units::{ml_per_unit, UnitKind, ML_PER_OZ};
