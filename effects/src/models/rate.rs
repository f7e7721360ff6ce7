use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::config::constants::RATE_TOLERANCE;
use crate::core::error::DiscountingError;

/// A non-negative, finite discount rate.
///
/// Rates are used as map keys throughout the pipeline, so equality, ordering
/// and hashing all work on the bit pattern of the stored value. Two rates
/// parsed from the same decimal text are always equal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct DiscountRate(f64);

impl DiscountRate {
    pub const ZERO: DiscountRate = DiscountRate(0.0);

    pub fn new(value: f64) -> Result<Self, DiscountingError> {
        if !value.is_finite() || value < 0.0 {
            return Err(DiscountingError::InvalidRate(value.to_string()));
        }
        // normalise -0.0
        Ok(DiscountRate(if value == 0.0 { 0.0 } else { value }))
    }

    /// Parses a column-name token such as `0.025`.
    ///
    /// Only plain decimals qualify: the token must contain a `.` and nothing
    /// but ASCII digits otherwise, so tokens like `pm25` or `2027` never
    /// read as rates.
    pub fn from_token(token: &str) -> Option<Self> {
        let mut dots = 0;
        for c in token.chars() {
            match c {
                '.' => dots += 1,
                c if c.is_ascii_digit() => {}
                _ => return None,
            }
        }
        if dots != 1 || token.starts_with('.') || token.ends_with('.') {
            return None;
        }
        token.parse::<f64>().ok().and_then(|v| DiscountRate::new(v).ok())
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }

    /// Tolerant comparison for rates that came from different sources.
    pub fn approx_eq(self, other: DiscountRate) -> bool {
        (self.0 - other.0).abs() < RATE_TOLERANCE
    }
}

impl PartialEq for DiscountRate {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for DiscountRate {}

impl Hash for DiscountRate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl PartialOrd for DiscountRate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DiscountRate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl TryFrom<f64> for DiscountRate {
    type Error = DiscountingError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        DiscountRate::new(value)
    }
}

impl From<DiscountRate> for f64 {
    fn from(rate: DiscountRate) -> Self {
        rate.0
    }
}

impl fmt::Display for DiscountRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
