use csv::ReaderBuilder;
use indexmap::IndexMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use crate::config::constants::{
    CALENDAR_YEAR_COLUMN, FUELING_CLASS_COLUMN, IN_USE_FUEL_ID_COLUMN, KEY_COLUMNS, REG_CLASS_ID_COLUMN,
    RESERVED_COLUMNS, SESSION_POLICY_COLUMN,
};
use crate::models::effects_row::{EffectsRow, RowKey};
use crate::utils::logging::{self, FileIOType, OperationCategory};

#[derive(Debug)]
pub enum EffectsLoadError {
    IoError(std::io::Error),
    CsvError(csv::Error),
    MissingKeyColumn(String),
    InvalidYear { value: String, line: u64 },
    InvalidNumber { column: String, value: String, line: u64 },
}

impl From<std::io::Error> for EffectsLoadError {
    fn from(err: std::io::Error) -> Self {
        EffectsLoadError::IoError(err)
    }
}

impl From<csv::Error> for EffectsLoadError {
    fn from(err: csv::Error) -> Self {
        EffectsLoadError::CsvError(err)
    }
}

impl std::fmt::Display for EffectsLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EffectsLoadError::IoError(e) => write!(f, "IO error: {}", e),
            EffectsLoadError::CsvError(e) => write!(f, "CSV error: {}", e),
            EffectsLoadError::MissingKeyColumn(s) => write!(f, "Missing key column: {}", s),
            EffectsLoadError::InvalidYear { value, line } => {
                write!(f, "Invalid calendar year '{}' on line {}", value, line)
            }
            EffectsLoadError::InvalidNumber { column, value, line } => {
                write!(f, "Invalid number '{}' in column {} on line {}", value, column, line)
            }
        }
    }
}

impl std::error::Error for EffectsLoadError {}

fn parse_year(value: &str, line: u64) -> Result<i32, EffectsLoadError> {
    let trimmed = value.trim();
    if let Ok(year) = trimmed.parse::<i32>() {
        return Ok(year);
    }
    // pandas writes integer columns with missing values as floats
    match trimmed.parse::<f64>() {
        Ok(year) if year.fract() == 0.0 && year.abs() < i32::MAX as f64 => Ok(year as i32),
        _ => Err(EffectsLoadError::InvalidYear {
            value: value.to_string(),
            line,
        }),
    }
}

fn parse_value(column: &str, value: &str, line: u64) -> Result<f64, EffectsLoadError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    trimmed.parse::<f64>().map_err(|_| EffectsLoadError::InvalidNumber {
        column: column.to_string(),
        value: value.to_string(),
        line,
    })
}

/// Reads an annual effects table. Every non-key column must be numeric.
///
/// Any `series` or `discount_rate` column is dropped: each series row takes
/// its rate from the sweep, not from upstream.
pub fn read_effects<R: Read>(reader: R) -> Result<Vec<EffectsRow>, EffectsLoadError> {
    let mut reader = ReaderBuilder::new().has_headers(true).trim(csv::Trim::Headers).from_reader(reader);
    let headers = reader.headers()?.clone();

    let position = |name: &str| -> Result<usize, EffectsLoadError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| EffectsLoadError::MissingKeyColumn(name.to_string()))
    };
    let session_idx = position(SESSION_POLICY_COLUMN)?;
    let year_idx = position(CALENDAR_YEAR_COLUMN)?;
    let reg_class_idx = position(REG_CLASS_ID_COLUMN)?;
    let fuel_idx = position(IN_USE_FUEL_ID_COLUMN)?;
    let fueling_idx = position(FUELING_CLASS_COLUMN)?;

    let value_columns: Vec<(usize, &str)> = headers
        .iter()
        .enumerate()
        .filter(|(_, name)| !KEY_COLUMNS.contains(name))
        .filter(|(_, name)| {
            let reserved = RESERVED_COLUMNS.contains(name);
            if reserved {
                debug!("Ignoring input column {}", name);
            }
            !reserved
        })
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let field = |idx: usize| record.get(idx).unwrap_or("").trim().to_string();

        let key = RowKey {
            session_policy: field(session_idx),
            calendar_year: parse_year(record.get(year_idx).unwrap_or(""), line)?,
            reg_class_id: field(reg_class_idx),
            in_use_fuel_id: field(fuel_idx),
            fueling_class: field(fueling_idx),
        };

        let mut values = IndexMap::with_capacity(value_columns.len());
        for (idx, column) in &value_columns {
            let value = parse_value(column, record.get(*idx).unwrap_or(""), line)?;
            values.insert(column.to_string(), value);
        }
        rows.push(EffectsRow::new(key, values));
    }

    Ok(rows)
}

pub fn load_effects(csv_path: impl AsRef<Path>) -> Result<Vec<EffectsRow>, EffectsLoadError> {
    let _timing = logging::start_timing(
        "load_effects",
        OperationCategory::FileIO {
            subcategory: FileIOType::EffectsLoad,
        },
    );

    let file = File::open(csv_path.as_ref())?;
    let rows = read_effects(file)?;
    info!("Loaded {} effects rows from {}", rows.len(), csv_path.as_ref().display());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
session_policy,calendar_year,reg_class_id,in_use_fuel_id,fueling_class,vmt,fuel_cost_dollars
policy_a,2027,car,gasoline,ICE,100,12.5
policy_a,2028.0,car,gasoline,ICE,110,
";

    #[test]
    fn reads_keys_and_values_in_header_order() {
        let rows = read_effects(TABLE.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].key, RowKey::new("policy_a", 2027, "car", "gasoline", "ICE"));
        assert_eq!(rows[0].values.keys().collect::<Vec<_>>(), vec!["vmt", "fuel_cost_dollars"]);
        assert_eq!(rows[0].get("fuel_cost_dollars"), Some(12.5));
        assert_eq!(rows[1].key.calendar_year, 2028);
        assert_eq!(rows[1].get("fuel_cost_dollars"), Some(0.0));
    }

    #[test]
    fn upstream_rate_and_series_columns_are_dropped() {
        let table = "\
session_policy,calendar_year,reg_class_id,in_use_fuel_id,fueling_class,series,discount_rate,vmt,fuel_cost_dollars
p,2028,car,gasoline,ICE,AnnualValue,0,1000,100
";
        let rows = read_effects(table.as_bytes()).unwrap();
        assert_eq!(rows[0].values.keys().collect::<Vec<_>>(), vec!["vmt", "fuel_cost_dollars"]);
        assert_eq!(rows[0].get("discount_rate"), None);
    }

    #[test]
    fn missing_key_column_is_reported() {
        let table = "session_policy,calendar_year,vmt\np,2027,1\n";
        assert!(matches!(
            read_effects(table.as_bytes()),
            Err(EffectsLoadError::MissingKeyColumn(ref c)) if c == REG_CLASS_ID_COLUMN
        ));
    }

    #[test]
    fn non_numeric_value_is_reported() {
        let table = "\
session_policy,calendar_year,reg_class_id,in_use_fuel_id,fueling_class,vmt
p,2027,car,gasoline,ICE,lots
";
        match read_effects(table.as_bytes()) {
            Err(EffectsLoadError::InvalidNumber { column, value, .. }) => {
                assert_eq!(column, "vmt");
                assert_eq!(value, "lots");
            }
            other => panic!("expected InvalidNumber, got {:?}", other),
        }
    }
}
