use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::constants::{END_OF_YEAR, START_OF_YEAR};
use crate::core::error::DiscountingError;
use crate::models::rate::DiscountRate;

/// Whether a year's costs are booked at the start or the end of that year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CostAccrual {
    #[serde(rename = "start-of-year")]
    StartOfYear,
    #[serde(rename = "end-of-year")]
    EndOfYear,
}

impl CostAccrual {
    /// Shift applied to discount exponents and annuity periods.
    pub fn offset(&self) -> i32 {
        match self {
            CostAccrual::StartOfYear => 0,
            CostAccrual::EndOfYear => 1,
        }
    }
}

impl FromStr for CostAccrual {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            START_OF_YEAR => Ok(CostAccrual::StartOfYear),
            END_OF_YEAR => Ok(CostAccrual::EndOfYear),
            _ => Err(format!("Unknown cost accrual: {}", s)),
        }
    }
}

impl fmt::Display for CostAccrual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CostAccrual::StartOfYear => write!(f, "{}", START_OF_YEAR),
            CostAccrual::EndOfYear => write!(f, "{}", END_OF_YEAR),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralInputsForEffects {
    pub social_discount_rates: Vec<DiscountRate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScGhgCostFactors {
    #[serde(default)]
    pub scghg_rates: Vec<DiscountRate>,
    #[serde(default)]
    pub gases: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CriteriaCostFactors {
    #[serde(default)]
    pub calc_health_effects: bool,
    #[serde(default)]
    pub criteria_rates: Vec<DiscountRate>,
    #[serde(default)]
    pub studies: Vec<String>,
    #[serde(default)]
    pub pollutants: Vec<String>,
}

/// Settings of one effects batch that the discounting engine reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSettings {
    pub discount_values_to_year: i32,
    pub cost_accrual: CostAccrual,
    pub general_inputs_for_effects: GeneralInputsForEffects,
    #[serde(default)]
    pub scghg_cost_factors: ScGhgCostFactors,
    #[serde(default)]
    pub criteria_cost_factors: CriteriaCostFactors,
}

fn sorted_unique(rates: &[DiscountRate]) -> Vec<DiscountRate> {
    let mut rates = rates.to_vec();
    rates.sort();
    rates.dedup();
    rates
}

impl BatchSettings {
    /// Social rates in ascending order, duplicates removed.
    pub fn social_discount_rates(&self) -> Vec<DiscountRate> {
        sorted_unique(&self.general_inputs_for_effects.social_discount_rates)
    }

    /// SC-GHG rates in ascending order.
    pub fn scghg_rates(&self) -> Vec<DiscountRate> {
        sorted_unique(&self.scghg_cost_factors.scghg_rates)
    }

    /// Criteria rates in ascending order; empty when health effects are off.
    pub fn criteria_rates(&self) -> Vec<DiscountRate> {
        if !self.criteria_cost_factors.calc_health_effects {
            return Vec::new();
        }
        sorted_unique(&self.criteria_cost_factors.criteria_rates)
    }

    /// The social rate with no matching criteria cost factors, if any.
    pub fn missing_criteria_rate(&self) -> Result<Option<DiscountRate>, DiscountingError> {
        let criteria_rates = self.criteria_rates();
        if criteria_rates.is_empty() {
            return Ok(None);
        }
        let missing: Vec<DiscountRate> = self
            .social_discount_rates()
            .into_iter()
            .filter(|social| !criteria_rates.iter().any(|c| c.approx_eq(*social)))
            .collect();
        match missing.as_slice() {
            [] => Ok(None),
            [rate] => Ok(Some(*rate)),
            _ => Err(DiscountingError::AmbiguousCriteriaSubstitution(
                missing.iter().map(|r| r.value()).collect(),
            )),
        }
    }

    pub fn validate(&self) -> Result<(), DiscountingError> {
        if self.general_inputs_for_effects.social_discount_rates.is_empty() {
            return Err(DiscountingError::NoSocialRates);
        }

        let scghg = &self.scghg_cost_factors;
        if !scghg.scghg_rates.is_empty() && scghg.gases.is_empty() {
            return Err(DiscountingError::InvalidSettings(
                "scghg_cost_factors.gases is empty but SC-GHG rates are configured".to_string(),
            ));
        }

        let criteria = &self.criteria_cost_factors;
        if criteria.calc_health_effects {
            if criteria.criteria_rates.is_empty() {
                return Err(DiscountingError::InvalidSettings(
                    "criteria_cost_factors.criteria_rates is empty with calc_health_effects on".to_string(),
                ));
            }
            if criteria.studies.is_empty() || criteria.pollutants.is_empty() {
                return Err(DiscountingError::InvalidSettings(
                    "criteria_cost_factors needs studies and pollutants with calc_health_effects on"
                        .to_string(),
                ));
            }
        }

        self.missing_criteria_rate()?;
        Ok(())
    }
}

fn rates(values: &[f64]) -> Vec<DiscountRate> {
    values.iter().filter_map(|v| DiscountRate::new(*v).ok()).collect()
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            discount_values_to_year: 2027,
            cost_accrual: CostAccrual::EndOfYear,
            general_inputs_for_effects: GeneralInputsForEffects {
                social_discount_rates: rates(&[0.02, 0.03, 0.07]),
            },
            scghg_cost_factors: ScGhgCostFactors {
                scghg_rates: rates(&[0.025, 0.02, 0.015]),
                gases: vec![
                    "co2".to_string(),
                    "ch4".to_string(),
                    "n2o".to_string(),
                    "ghg".to_string(),
                ],
            },
            criteria_cost_factors: CriteriaCostFactors {
                calc_health_effects: true,
                criteria_rates: rates(&[0.03, 0.07]),
                studies: vec!["Wu".to_string(), "Pope".to_string()],
                pollutants: vec![
                    "pm25".to_string(),
                    "nox".to_string(),
                    "so2".to_string(),
                    "criteria".to_string(),
                ],
            },
        }
    }
}
