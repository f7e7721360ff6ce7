use std::fmt;

use super::rate::DiscountRate;
use crate::config::constants::{CRITERIA_SUBSTITUTION_SOURCE_RATE, RATE_TOLERANCE};

/// How a column of the effects table is treated by the discounting stages.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueCategory {
    /// Not dollar valued; copied through unchanged.
    Identifier,
    /// Dollar valued with no embedded rate; discounted at the sweep's social rate.
    Social,
    /// Social cost of a greenhouse gas, discounted only at its own rate.
    ScGhg { rate: DiscountRate, gas: String },
    /// Criteria pollutant benefit, discounted at its own rate subject to substitution.
    Criteria {
        rate: DiscountRate,
        study: String,
        pollutant: String,
    },
    /// Undiscounted baseline tagged with a zero rate; copied through unchanged.
    Nominal,
    /// Average dollar values; dropped from every series.
    Excluded,
}

impl ValueCategory {
    /// Whether the column is discounted, accumulated and annualized.
    pub fn is_monetized(&self) -> bool {
        matches!(
            self,
            ValueCategory::Social | ValueCategory::ScGhg { .. } | ValueCategory::Criteria { .. }
        )
    }

    /// Whether the column appears in the output series at all.
    pub fn is_retained(&self) -> bool {
        !matches!(self, ValueCategory::Excluded)
    }

    /// The rate this column is discounted and annualized at while the sweep
    /// visits `social_rate`. `None` for columns that are never discounted.
    pub fn effective_rate(
        &self,
        social_rate: DiscountRate,
        missing_criteria_rate: Option<DiscountRate>,
    ) -> Option<DiscountRate> {
        match self {
            ValueCategory::Social => Some(social_rate),
            ValueCategory::ScGhg { rate, .. } => Some(*rate),
            ValueCategory::Criteria { rate, .. } => {
                let substitute = missing_criteria_rate
                    .map(|missing| social_rate.approx_eq(missing))
                    .unwrap_or(false)
                    && (rate.value() - CRITERIA_SUBSTITUTION_SOURCE_RATE).abs() < RATE_TOLERANCE;
                if substitute {
                    Some(social_rate)
                } else {
                    Some(*rate)
                }
            }
            ValueCategory::Identifier | ValueCategory::Nominal | ValueCategory::Excluded => None,
        }
    }
}

impl fmt::Display for ValueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueCategory::Identifier => write!(f, "identifier"),
            ValueCategory::Social => write!(f, "social"),
            ValueCategory::ScGhg { rate, gas } => write!(f, "scghg:{}:{}", rate, gas),
            ValueCategory::Criteria {
                rate,
                study,
                pollutant,
            } => write!(f, "criteria:{}:{}:{}", rate, study, pollutant),
            ValueCategory::Nominal => write!(f, "nominal"),
            ValueCategory::Excluded => write!(f, "excluded"),
        }
    }
}
