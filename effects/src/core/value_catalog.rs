use indexmap::IndexMap;
use tracing::{debug, info};

use crate::config::batch_settings::BatchSettings;
use crate::config::constants::{AVERAGE_TAG, COLUMN_TOKEN_SEPARATOR, DOLLARS_TAG, KEY_COLUMNS, RESERVED_COLUMNS};
use crate::core::error::DiscountingError;
use crate::models::effects_row::EffectsRow;
use crate::models::rate::DiscountRate;
use crate::models::value_category::ValueCategory;

/// Vocabulary the classifier matches column-name tokens against.
struct Vocabulary<'a> {
    scghg_rates: Vec<DiscountRate>,
    gases: &'a [String],
    criteria_rates: Vec<DiscountRate>,
    studies: &'a [String],
    pollutants: &'a [String],
}

fn find_token<'a>(tokens: &[&str], candidates: &'a [String]) -> Option<&'a String> {
    candidates
        .iter()
        .find(|candidate| tokens.iter().any(|t| t.eq_ignore_ascii_case(candidate)))
}

impl<'a> Vocabulary<'a> {
    fn from_settings(settings: &'a BatchSettings) -> Self {
        Self {
            scghg_rates: settings.scghg_rates(),
            gases: &settings.scghg_cost_factors.gases,
            criteria_rates: settings.criteria_rates(),
            studies: &settings.criteria_cost_factors.studies,
            pollutants: &settings.criteria_cost_factors.pollutants,
        }
    }

    fn classify(&self, column: &str) -> Result<ValueCategory, DiscountingError> {
        if !column.contains(DOLLARS_TAG) {
            return Ok(ValueCategory::Identifier);
        }
        if column.contains(AVERAGE_TAG) {
            return Ok(ValueCategory::Excluded);
        }

        let tokens: Vec<&str> = column.split(COLUMN_TOKEN_SEPARATOR).collect();
        let embedded: Vec<DiscountRate> = tokens.iter().filter_map(|t| DiscountRate::from_token(t)).collect();

        let rate = match embedded.as_slice() {
            [] => return Ok(ValueCategory::Social),
            [rate] => *rate,
            _ => return Err(DiscountingError::UnclassifiedColumn(column.to_string())),
        };
        if rate.is_zero() {
            return Ok(ValueCategory::Nominal);
        }

        // exact token match, so 0.02 never claims a 0.025 column
        if self.scghg_rates.contains(&rate) {
            if let Some(gas) = find_token(&tokens, self.gases) {
                return Ok(ValueCategory::ScGhg {
                    rate,
                    gas: gas.clone(),
                });
            }
        }
        if self.criteria_rates.contains(&rate) {
            if let (Some(pollutant), Some(study)) = (
                find_token(&tokens, self.pollutants),
                find_token(&tokens, self.studies),
            ) {
                return Ok(ValueCategory::Criteria {
                    rate,
                    study: study.clone(),
                    pollutant: pollutant.clone(),
                });
            }
        }

        Err(DiscountingError::UnclassifiedColumn(column.to_string()))
    }
}

/// Classification of every column of one effects table.
///
/// Built once per batch run from the table's header and never changed
/// afterwards. Column order follows the input table.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueCatalog {
    columns: IndexMap<String, ValueCategory>,
}

impl ValueCatalog {
    pub fn from_columns<I, S>(columns: I, settings: &BatchSettings) -> Result<Self, DiscountingError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if settings.general_inputs_for_effects.social_discount_rates.is_empty() {
            return Err(DiscountingError::NoSocialRates);
        }

        let vocabulary = Vocabulary::from_settings(settings);
        let mut classified = IndexMap::new();
        for column in columns {
            let column = column.as_ref();
            if KEY_COLUMNS.contains(&column) || RESERVED_COLUMNS.contains(&column) {
                continue;
            }
            let category = vocabulary.classify(column)?;
            debug!("Column {} classified as {}", column, category);
            classified.insert(column.to_string(), category);
        }

        let catalog = Self { columns: classified };
        if catalog.monetized_columns().is_empty() {
            return Err(DiscountingError::NoMonetizedColumns);
        }

        info!(
            "Value catalog: {} identifier, {} social, {} SC-GHG, {} criteria columns",
            catalog.identifier_columns().len(),
            catalog.non_emission_monetized_columns().len(),
            catalog.scghg_columns().len(),
            catalog.criteria_columns().len()
        );
        Ok(catalog)
    }

    /// All rows share one schema, so the first row is enough.
    pub fn from_row(row: &EffectsRow, settings: &BatchSettings) -> Result<Self, DiscountingError> {
        Self::from_columns(row.values.keys(), settings)
    }

    pub fn category(&self, column: &str) -> Option<&ValueCategory> {
        self.columns.get(column)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ValueCategory)> {
        self.columns.iter().map(|(name, category)| (name.as_str(), category))
    }

    /// Columns that make it into the output series, in input order.
    pub fn retained_columns(&self) -> Vec<&str> {
        self.select(|c| c.is_retained())
    }

    pub fn identifier_columns(&self) -> Vec<&str> {
        self.select(|c| matches!(c, ValueCategory::Identifier))
    }

    pub fn monetized_columns(&self) -> Vec<&str> {
        self.select(|c| c.is_monetized())
    }

    pub fn non_emission_monetized_columns(&self) -> Vec<&str> {
        self.select(|c| matches!(c, ValueCategory::Social))
    }

    pub fn scghg_columns(&self) -> Vec<&str> {
        self.select(|c| matches!(c, ValueCategory::ScGhg { .. }))
    }

    pub fn criteria_columns(&self) -> Vec<&str> {
        self.select(|c| matches!(c, ValueCategory::Criteria { .. }))
    }

    fn select(&self, predicate: impl Fn(&ValueCategory) -> bool) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|(_, category)| predicate(category))
            .map(|(name, _)| name.as_str())
            .collect()
    }
}
