// Refined fraction type for `percent_of_parent`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A finite fraction in the closed interval [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Percent(f64);

/// Rejected `Percent` construction.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("expected {0} to be a percentage in [0, 1]")]
pub struct PercentError(pub f64);

impl Percent {
    pub const ZERO: Self = Self(0.0);
    pub const ONE: Self = Self(1.0);

    /// Validate and wrap a fraction.
    pub fn new(value: f64) -> Result<Self, PercentError> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(PercentError(value))
        }
    }

    /// Clamp a computed value into range. NaN maps to zero.
    pub fn clamped(value: f64) -> Self {
        if value.is_nan() {
            Self::ZERO
        } else {
            Self(value.clamp(0.0, 1.0))
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for Percent {
    fn default() -> Self {
        Self::ONE
    }
}

impl TryFrom<f64> for Percent {
    type Error = PercentError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Percent> for f64 {
    fn from(p: Percent) -> Self {
        p.0
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}%", self.0 * 100.0)
    }
}
