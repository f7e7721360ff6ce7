use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::info;

use crate::config::batch_settings::{BatchSettings, CostAccrual};
use crate::core::error::DiscountingError;
use crate::core::value_catalog::ValueCatalog;
use crate::models::effects_row::{EffectsRow, Series, SeriesRow, SeriesTable};
use crate::models::rate::DiscountRate;
use crate::utils::logging::{self, DiscountingStage, OperationCategory};

/// Discounts `value` booked in `year` back to `reference_year`.
///
/// One-sided: years at or before the reference year are never compounded
/// forward, only later years are discounted.
pub fn discount_value(
    value: f64,
    rate: DiscountRate,
    year: i32,
    reference_year: i32,
    cost_accrual: CostAccrual,
) -> f64 {
    let exponent = (year - reference_year + cost_accrual.offset()).max(0);
    value / (1.0 + rate.value()).powi(exponent)
}

/// Batch-wide inputs shared by the discounting and annualizing stages.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountParameters {
    pub social_rates: Vec<DiscountRate>,
    pub reference_year: i32,
    pub cost_accrual: CostAccrual,
    pub missing_criteria_rate: Option<DiscountRate>,
}

impl DiscountParameters {
    pub fn from_settings(settings: &BatchSettings) -> Result<Self, DiscountingError> {
        settings.validate()?;
        Ok(Self {
            social_rates: settings.social_discount_rates(),
            reference_year: settings.discount_values_to_year,
            cost_accrual: settings.cost_accrual,
            missing_criteria_rate: settings.missing_criteria_rate()?,
        })
    }
}

/// Builds the annual-value series: one discounted row per input row and
/// social rate.
pub struct AnnualDiscounter<'a> {
    catalog: &'a ValueCatalog,
    params: &'a DiscountParameters,
}

impl<'a> AnnualDiscounter<'a> {
    pub fn new(catalog: &'a ValueCatalog, params: &'a DiscountParameters) -> Self {
        Self { catalog, params }
    }

    pub fn discount_row(&self, row: &EffectsRow, social_rate: DiscountRate) -> Result<SeriesRow, DiscountingError> {
        let year = row.key.calendar_year;
        let mut values = IndexMap::with_capacity(row.values.len());

        for (column, category) in self.catalog.iter() {
            if !category.is_retained() {
                continue;
            }
            let value = row.get(column).ok_or_else(|| DiscountingError::MissingColumn {
                column: column.to_string(),
                key: row.key.clone(),
            })?;

            let discounted = match category.effective_rate(social_rate, self.params.missing_criteria_rate) {
                Some(rate) => discount_value(
                    value,
                    rate,
                    year,
                    self.params.reference_year,
                    self.params.cost_accrual,
                ),
                None => value,
            };
            values.insert(column.to_string(), discounted);
        }

        Ok(SeriesRow {
            key: row.key.with_rate(social_rate),
            series: Series::AnnualValue,
            values,
        })
    }

    pub fn discount_all(&self, rows: &[EffectsRow]) -> Result<SeriesTable, DiscountingError> {
        let _timing = logging::start_timing(
            "discount_all",
            OperationCategory::Discounting {
                subcategory: DiscountingStage::AnnualValue,
            },
        );

        if rows.is_empty() {
            return Err(DiscountingError::EmptyInput);
        }
        if self.params.social_rates.is_empty() {
            return Err(DiscountingError::NoSocialRates);
        }

        let mut seen = HashSet::with_capacity(rows.len());
        for row in rows {
            if !seen.insert(&row.key) {
                return Err(DiscountingError::DuplicateRow(row.key.clone()));
            }
        }

        let mut annual_values = SeriesTable::new();
        for &social_rate in &self.params.social_rates {
            for row in rows {
                let discounted = self.discount_row(row, social_rate)?;
                annual_values.insert(discounted.key.clone(), discounted);
            }
        }

        info!(
            "Discounted {} rows at {} social rates into {} annual values",
            rows.len(),
            self.params.social_rates.len(),
            annual_values.len()
        );
        Ok(annual_values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::effects_row::RowKey;
    use rstest::{fixture, rstest};

    fn rate(v: f64) -> DiscountRate {
        DiscountRate::new(v).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * b.abs().max(1.0)
    }

    #[test]
    fn start_of_year_reference_year_is_undiscounted() {
        assert_eq!(discount_value(100.0, rate(0.03), 2025, 2025, CostAccrual::StartOfYear), 100.0);
    }

    #[test]
    fn end_of_year_lags_one_year() {
        let discounted = discount_value(100.0, rate(0.03), 2025, 2025, CostAccrual::EndOfYear);
        assert!(close(discounted, 100.0 / 1.03));
    }

    #[test]
    fn years_before_reference_are_not_compounded() {
        assert_eq!(discount_value(100.0, rate(0.07), 2020, 2025, CostAccrual::StartOfYear), 100.0);
        assert_eq!(discount_value(100.0, rate(0.07), 2020, 2025, CostAccrual::EndOfYear), 100.0);
    }

    #[rstest]
    #[case(CostAccrual::StartOfYear)]
    #[case(CostAccrual::EndOfYear)]
    fn discounting_is_monotone_in_elapsed_years(#[case] accrual: CostAccrual) {
        let mut previous = f64::INFINITY;
        for year in 2020..2060 {
            let discounted = discount_value(250.0, rate(0.03), year, 2027, accrual);
            assert!(discounted <= previous);
            previous = discounted;
        }
    }

    #[fixture]
    fn settings() -> BatchSettings {
        let mut settings = BatchSettings::default();
        settings.discount_values_to_year = 2027;
        settings.cost_accrual = CostAccrual::StartOfYear;
        settings
    }

    fn row(year: i32) -> EffectsRow {
        let mut values = IndexMap::new();
        values.insert("vmt".to_string(), 1000.0);
        values.insert("fuel_cost_dollars".to_string(), 100.0);
        values.insert("avg_fuel_price_dollars_per_gallon".to_string(), 3.5);
        values.insert("co2_global_0.0_cost_dollars".to_string(), 80.0);
        values.insert("co2_global_0.02_cost_dollars".to_string(), 100.0);
        values.insert("co2_global_0.025_cost_dollars".to_string(), 100.0);
        values.insert("pm25_Wu_0.03_cost_dollars".to_string(), 100.0);
        values.insert("pm25_Wu_0.07_cost_dollars".to_string(), 100.0);
        EffectsRow::new(RowKey::new("policy", year, "car", "gasoline", "ICE"), values)
    }

    #[rstest]
    fn routes_each_column_to_its_rate(settings: BatchSettings) {
        let catalog = ValueCatalog::from_row(&row(2029), &settings).unwrap();
        let params = DiscountParameters::from_settings(&settings).unwrap();
        let discounter = AnnualDiscounter::new(&catalog, &params);

        let at_7 = discounter.discount_row(&row(2029), rate(0.07)).unwrap();
        assert_eq!(at_7.get("vmt"), Some(1000.0));
        assert_eq!(at_7.get("co2_global_0.0_cost_dollars"), Some(80.0));
        assert_eq!(at_7.get("avg_fuel_price_dollars_per_gallon"), None);
        assert!(close(at_7.get("fuel_cost_dollars").unwrap(), 100.0 / 1.07f64.powi(2)));
        assert!(close(at_7.get("co2_global_0.02_cost_dollars").unwrap(), 100.0 / 1.02f64.powi(2)));
        assert!(close(at_7.get("co2_global_0.025_cost_dollars").unwrap(), 100.0 / 1.025f64.powi(2)));
        assert!(close(at_7.get("pm25_Wu_0.03_cost_dollars").unwrap(), 100.0 / 1.03f64.powi(2)));
        assert_eq!(at_7.discount_rate(), rate(0.07));
        assert_eq!(at_7.series, Series::AnnualValue);
    }

    #[rstest]
    fn criteria_substitution_applies_only_at_missing_rate(settings: BatchSettings) {
        let catalog = ValueCatalog::from_row(&row(2029), &settings).unwrap();
        let params = DiscountParameters::from_settings(&settings).unwrap();
        let discounter = AnnualDiscounter::new(&catalog, &params);

        let at_2 = discounter.discount_row(&row(2029), rate(0.02)).unwrap();
        assert!(close(at_2.get("pm25_Wu_0.03_cost_dollars").unwrap(), 100.0 / 1.02f64.powi(2)));
        assert!(close(at_2.get("pm25_Wu_0.07_cost_dollars").unwrap(), 100.0 / 1.07f64.powi(2)));

        let at_3 = discounter.discount_row(&row(2029), rate(0.03)).unwrap();
        assert!(close(at_3.get("pm25_Wu_0.03_cost_dollars").unwrap(), 100.0 / 1.03f64.powi(2)));
    }

    #[rstest]
    fn output_cardinality_multiplies_by_social_rates(settings: BatchSettings) {
        let rows: Vec<EffectsRow> = (2025..2031).map(row).collect();
        let catalog = ValueCatalog::from_row(&rows[0], &settings).unwrap();
        let params = DiscountParameters::from_settings(&settings).unwrap();
        let annual = AnnualDiscounter::new(&catalog, &params).discount_all(&rows).unwrap();
        assert_eq!(annual.len(), rows.len() * params.social_rates.len());
    }

    #[rstest]
    fn missing_column_aborts(settings: BatchSettings) {
        let catalog = ValueCatalog::from_row(&row(2029), &settings).unwrap();
        let params = DiscountParameters::from_settings(&settings).unwrap();
        let mut broken = row(2030);
        broken.values.shift_remove("fuel_cost_dollars");

        let result = AnnualDiscounter::new(&catalog, &params).discount_all(&[row(2029), broken]);
        assert!(matches!(
            result,
            Err(DiscountingError::MissingColumn { ref column, .. }) if column == "fuel_cost_dollars"
        ));
    }

    #[rstest]
    fn duplicate_rows_are_rejected(settings: BatchSettings) {
        let catalog = ValueCatalog::from_row(&row(2029), &settings).unwrap();
        let params = DiscountParameters::from_settings(&settings).unwrap();
        let result = AnnualDiscounter::new(&catalog, &params).discount_all(&[row(2029), row(2029)]);
        assert!(matches!(result, Err(DiscountingError::DuplicateRow(_))));
    }

    #[rstest]
    fn empty_input_is_rejected(settings: BatchSettings) {
        let catalog = ValueCatalog::from_row(&row(2029), &settings).unwrap();
        let params = DiscountParameters::from_settings(&settings).unwrap();
        let result = AnnualDiscounter::new(&catalog, &params).discount_all(&[]);
        assert_eq!(result, Err(DiscountingError::EmptyInput));
    }
}
