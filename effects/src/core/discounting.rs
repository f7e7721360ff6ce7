use tracing::info;

use crate::config::batch_settings::BatchSettings;
use crate::core::annualized_value::AnnualizedValueConverter;
use crate::core::discounter::{AnnualDiscounter, DiscountParameters};
use crate::core::error::DiscountingError;
use crate::core::present_value::{ContinuityGap, PresentValueAccumulator};
use crate::core::value_catalog::ValueCatalog;
use crate::models::effects_row::{EffectsRow, Series, SeriesRow, SeriesTable};
use crate::utils::logging::{self, DiscountingStage, OperationCategory};

/// Everything one batch run hands to the persistence layer.
#[derive(Debug, Clone)]
pub struct DiscountingOutputs {
    pub catalog: ValueCatalog,
    pub annual_values: SeriesTable,
    pub present_values: SeriesTable,
    pub annualized_values: SeriesTable,
    pub continuity_gaps: Vec<ContinuityGap>,
}

impl DiscountingOutputs {
    pub fn series(&self, series: Series) -> &SeriesTable {
        match series {
            Series::AnnualValue => &self.annual_values,
            Series::PresentValue => &self.present_values,
            Series::AnnualizedValue => &self.annualized_values,
        }
    }

    /// All rows of the three series, annual values first.
    pub fn rows(&self) -> impl Iterator<Item = &SeriesRow> {
        self.annual_values
            .values()
            .chain(self.present_values.values())
            .chain(self.annualized_values.values())
    }
}

/// The discount, accumulate and annualize pipeline for one batch run.
///
/// Each stage reads the previous stage's table and builds a new one; nothing
/// is shared between runs.
pub struct Discounting {
    settings: BatchSettings,
    params: DiscountParameters,
}

impl Discounting {
    pub fn new(settings: &BatchSettings) -> Result<Self, DiscountingError> {
        let params = DiscountParameters::from_settings(settings)?;
        Ok(Self {
            settings: settings.clone(),
            params,
        })
    }

    pub fn run(&self, rows: &[EffectsRow]) -> Result<DiscountingOutputs, DiscountingError> {
        let first = rows.first().ok_or(DiscountingError::EmptyInput)?;

        let catalog = {
            let _timing = logging::start_timing(
                "build_value_catalog",
                OperationCategory::Discounting {
                    subcategory: DiscountingStage::Catalog,
                },
            );
            ValueCatalog::from_row(first, &self.settings)?
        };

        info!(
            "Discounting {} rows to {} ({} accrual) at social rates {:?}",
            rows.len(),
            self.params.reference_year,
            self.params.cost_accrual,
            self.params.social_rates.iter().map(|r| r.value()).collect::<Vec<_>>()
        );

        let annual_values = AnnualDiscounter::new(&catalog, &self.params).discount_all(rows)?;
        let (present_values, continuity_gaps) =
            PresentValueAccumulator::new(&catalog, self.params.reference_year).accumulate(&annual_values);
        let annualized_values = AnnualizedValueConverter::new(&catalog, &self.params).annualize(&present_values);

        Ok(DiscountingOutputs {
            catalog,
            annual_values,
            present_values,
            annualized_values,
            continuity_gaps,
        })
    }
}
