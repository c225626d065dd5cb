//! Validated numeric quantities
//!
//! Amounts, percentages and volumes are never negative. `NonNegative` carries
//! that constraint in the type instead of relying on callers.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when building a quantity from an unchecked number
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum QuantityError {
    #[error("{0} is not a non-negative number")]
    Negative(f64),
}

/// A finite or infinite number that is known to be `>= 0` (never NaN)
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct NonNegative(f64);

impl NonNegative {
    pub const ZERO: NonNegative = NonNegative(0.0);

    /// Validate a raw value, rejecting negatives and NaN
    pub fn new(value: f64) -> Option<Self> {
        if value >= 0.0 {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Clamp a raw value into range (negatives and NaN become zero)
    pub fn saturating(value: f64) -> Self {
        Self::new(value).unwrap_or(Self::ZERO)
    }

    /// The underlying value
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for NonNegative {
    type Error = QuantityError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(QuantityError::Negative(value))
    }
}

impl From<NonNegative> for f64 {
    fn from(value: NonNegative) -> f64 {
        value.0
    }
}

impl fmt::Display for NonNegative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Express `part_ml` as a percentage of `whole_ml`.
///
/// A zero whole yields 0 rather than NaN or infinity.
pub fn percentage_of(part_ml: f64, whole_ml: f64) -> NonNegative {
    if whole_ml == 0.0 {
        return NonNegative::ZERO;
    }
    NonNegative::saturating(part_ml / whole_ml * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_negative_and_nan() {
        assert_eq!(NonNegative::new(0.0), Some(NonNegative::ZERO));
        assert_eq!(NonNegative::new(12.5).map(NonNegative::get), Some(12.5));
        assert_eq!(NonNegative::new(-0.1), None);
        assert_eq!(NonNegative::new(f64::NAN), None);
    }

    #[test]
    fn test_try_from_reports_value() {
        let err = NonNegative::try_from(-3.0).unwrap_err();
        assert_eq!(err, QuantityError::Negative(-3.0));
        assert_eq!(err.to_string(), "-3 is not a non-negative number");
    }

    #[test]
    fn test_saturating_clamps() {
        assert_eq!(NonNegative::saturating(-5.0), NonNegative::ZERO);
        assert_eq!(NonNegative::saturating(f64::NAN), NonNegative::ZERO);
        assert_eq!(NonNegative::saturating(7.0).get(), 7.0);
    }

    #[test]
    fn test_deserialize_enforces_sign() {
        let ok: NonNegative = serde_json::from_str("2.5").unwrap();
        assert_eq!(ok.get(), 2.5);
        assert!(serde_json::from_str::<NonNegative>("-1").is_err());
        assert_eq!(serde_json::to_string(&ok).unwrap(), "2.5");
    }

    #[test]
    fn test_percentage_of_zero_whole() {
        assert_eq!(percentage_of(0.0, 0.0), NonNegative::ZERO);
        assert_eq!(percentage_of(5.0, 0.0), NonNegative::ZERO);
        assert!((percentage_of(24.0, 60.0).get() - 40.0).abs() < 1e-9);
    }
}
