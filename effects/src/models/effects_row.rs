use indexmap::IndexMap;
use std::collections::BTreeMap;
use std::fmt;

use super::rate::DiscountRate;
use crate::config::constants::{ANNUALIZED_VALUE_LABEL, ANNUAL_VALUE_LABEL, PRESENT_VALUE_LABEL};

/// Identifies one row of the annual effects table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowKey {
    pub session_policy: String,
    pub calendar_year: i32,
    pub reg_class_id: String,
    pub in_use_fuel_id: String,
    pub fueling_class: String,
}

impl RowKey {
    pub fn new(
        session_policy: impl Into<String>,
        calendar_year: i32,
        reg_class_id: impl Into<String>,
        in_use_fuel_id: impl Into<String>,
        fueling_class: impl Into<String>,
    ) -> Self {
        Self {
            session_policy: session_policy.into(),
            calendar_year,
            reg_class_id: reg_class_id.into(),
            in_use_fuel_id: in_use_fuel_id.into(),
            fueling_class: fueling_class.into(),
        }
    }

    pub fn with_rate(&self, discount_rate: DiscountRate) -> SeriesKey {
        SeriesKey {
            session_policy: self.session_policy.clone(),
            reg_class_id: self.reg_class_id.clone(),
            in_use_fuel_id: self.in_use_fuel_id.clone(),
            fueling_class: self.fueling_class.clone(),
            discount_rate,
            calendar_year: self.calendar_year,
        }
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {}, {})",
            self.session_policy,
            self.calendar_year,
            self.reg_class_id,
            self.in_use_fuel_id,
            self.fueling_class
        )
    }
}

/// Everything in a [`SeriesKey`] except the calendar year.
///
/// Present values accumulate across years within one family; families never
/// interact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FamilyKey {
    pub session_policy: String,
    pub reg_class_id: String,
    pub in_use_fuel_id: String,
    pub fueling_class: String,
    pub discount_rate: DiscountRate,
}

impl fmt::Display for FamilyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {}, rate {})",
            self.session_policy,
            self.reg_class_id,
            self.in_use_fuel_id,
            self.fueling_class,
            self.discount_rate
        )
    }
}

/// Key of a discounted series row.
///
/// Field order drives the derived ordering: rows of one family sit next to
/// each other in a [`SeriesTable`], sorted by ascending calendar year.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeriesKey {
    pub session_policy: String,
    pub reg_class_id: String,
    pub in_use_fuel_id: String,
    pub fueling_class: String,
    pub discount_rate: DiscountRate,
    pub calendar_year: i32,
}

impl SeriesKey {
    pub fn family(&self) -> FamilyKey {
        FamilyKey {
            session_policy: self.session_policy.clone(),
            reg_class_id: self.reg_class_id.clone(),
            in_use_fuel_id: self.in_use_fuel_id.clone(),
            fueling_class: self.fueling_class.clone(),
            discount_rate: self.discount_rate,
        }
    }

    /// The same family one calendar year earlier.
    pub fn previous_year(&self) -> SeriesKey {
        SeriesKey {
            calendar_year: self.calendar_year - 1,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Series {
    AnnualValue,
    PresentValue,
    AnnualizedValue,
}

impl Series {
    pub fn label(&self) -> &'static str {
        match self {
            Series::AnnualValue => ANNUAL_VALUE_LABEL,
            Series::PresentValue => PRESENT_VALUE_LABEL,
            Series::AnnualizedValue => ANNUALIZED_VALUE_LABEL,
        }
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One row of the undiscounted annual effects table, as supplied upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectsRow {
    pub key: RowKey,
    pub values: IndexMap<String, f64>,
}

impl EffectsRow {
    pub fn new(key: RowKey, values: IndexMap<String, f64>) -> Self {
        Self { key, values }
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.values.get(column).copied()
    }
}

/// A row of one of the three discounted series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRow {
    pub key: SeriesKey,
    pub series: Series,
    pub values: IndexMap<String, f64>,
}

impl SeriesRow {
    pub fn get(&self, column: &str) -> Option<f64> {
        self.values.get(column).copied()
    }

    pub fn discount_rate(&self) -> DiscountRate {
        self.key.discount_rate
    }

    pub fn calendar_year(&self) -> i32 {
        self.key.calendar_year
    }
}

pub type SeriesTable = BTreeMap<SeriesKey, SeriesRow>;
