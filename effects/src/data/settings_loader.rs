use std::fs;
use std::path::Path;
use tracing::info;

use crate::config::batch_settings::BatchSettings;
use crate::core::error::DiscountingError;
use crate::utils::logging::{self, FileIOType, OperationCategory};

#[derive(Debug)]
pub enum SettingsLoadError {
    IoError(std::io::Error),
    JsonError(serde_json::Error),
    Invalid(DiscountingError),
}

impl From<std::io::Error> for SettingsLoadError {
    fn from(err: std::io::Error) -> Self {
        SettingsLoadError::IoError(err)
    }
}

impl From<serde_json::Error> for SettingsLoadError {
    fn from(err: serde_json::Error) -> Self {
        SettingsLoadError::JsonError(err)
    }
}

impl From<DiscountingError> for SettingsLoadError {
    fn from(err: DiscountingError) -> Self {
        SettingsLoadError::Invalid(err)
    }
}

impl std::fmt::Display for SettingsLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsLoadError::IoError(e) => write!(f, "IO error: {}", e),
            SettingsLoadError::JsonError(e) => write!(f, "JSON error: {}", e),
            SettingsLoadError::Invalid(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SettingsLoadError {}

pub fn parse_batch_settings(json: &str) -> Result<BatchSettings, SettingsLoadError> {
    let settings: BatchSettings = serde_json::from_str(json)?;
    settings.validate()?;
    Ok(settings)
}

pub fn load_batch_settings(path: impl AsRef<Path>) -> Result<BatchSettings, SettingsLoadError> {
    let _timing = logging::start_timing(
        "load_batch_settings",
        OperationCategory::FileIO {
            subcategory: FileIOType::SettingsLoad,
        },
    );

    let contents = fs::read_to_string(path.as_ref())?;
    let settings = parse_batch_settings(&contents)?;
    info!(
        "Loaded batch settings from {}: discount to {}, {} accrual",
        path.as_ref().display(),
        settings.discount_values_to_year,
        settings.cost_accrual
    );
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_settings_are_rejected_after_parsing() {
        let json = r#"{
            "discount_values_to_year": 2027,
            "cost_accrual": "end-of-year",
            "general_inputs_for_effects": { "social_discount_rates": [] }
        }"#;
        assert!(matches!(
            parse_batch_settings(json),
            Err(SettingsLoadError::Invalid(DiscountingError::NoSocialRates))
        ));
    }

    #[test]
    fn unknown_accrual_is_a_json_error() {
        let json = r#"{
            "discount_values_to_year": 2027,
            "cost_accrual": "mid-year",
            "general_inputs_for_effects": { "social_discount_rates": [0.03] }
        }"#;
        assert!(matches!(parse_batch_settings(json), Err(SettingsLoadError::JsonError(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = load_batch_settings("/nonexistent/batch_settings.json");
        assert!(matches!(result, Err(SettingsLoadError::IoError(_))));
    }
}
