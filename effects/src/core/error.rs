use crate::models::effects_row::RowKey;

/// Failures that abort a discounting batch run.
#[derive(Debug, Clone, PartialEq)]
pub enum DiscountingError {
    NoSocialRates,
    NoMonetizedColumns,
    EmptyInput,
    DuplicateRow(RowKey),
    MissingColumn { column: String, key: RowKey },
    UnclassifiedColumn(String),
    InvalidRate(String),
    AmbiguousCriteriaSubstitution(Vec<f64>),
    InvalidSettings(String),
}

impl std::fmt::Display for DiscountingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscountingError::NoSocialRates => write!(f, "No social discount rates configured"),
            DiscountingError::NoMonetizedColumns => {
                write!(f, "No monetized columns found in the effects table")
            }
            DiscountingError::EmptyInput => write!(f, "The effects table has no rows"),
            DiscountingError::DuplicateRow(key) => write!(f, "Row {} appears more than once", key),
            DiscountingError::MissingColumn { column, key } => {
                write!(f, "Column {} missing from row {}", column, key)
            }
            DiscountingError::UnclassifiedColumn(column) => write!(
                f,
                "Column {} carries a discount rate that matches no configured SC-GHG or criteria category",
                column
            ),
            DiscountingError::InvalidRate(s) => write!(f, "Invalid discount rate: {}", s),
            DiscountingError::AmbiguousCriteriaSubstitution(rates) => write!(
                f,
                "More than one social discount rate is missing from the criteria rates: {:?}",
                rates
            ),
            DiscountingError::InvalidSettings(s) => write!(f, "Invalid batch settings: {}", s),
        }
    }
}

impl std::error::Error for DiscountingError {}
