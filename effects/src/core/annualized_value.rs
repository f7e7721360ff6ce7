use tracing::{debug, info};

use crate::config::batch_settings::CostAccrual;
use crate::core::discounter::DiscountParameters;
use crate::core::value_catalog::ValueCatalog;
use crate::models::effects_row::{Series, SeriesRow, SeriesTable};
use crate::models::rate::DiscountRate;
use crate::utils::logging::{self, DiscountingStage, OperationCategory};

/// Number of annuity periods between the reference year and `calendar_year`.
pub fn annuity_periods(calendar_year: i32, reference_year: i32, cost_accrual: CostAccrual) -> i32 {
    calendar_year - reference_year + cost_accrual.offset()
}

/// Constant payment over `periods` whose present value at `rate` is `present_value`.
///
/// Callers guarantee `rate > 0` and `periods >= 1`.
pub fn annualize_value(present_value: f64, rate: DiscountRate, periods: i32, cost_accrual: CostAccrual) -> f64 {
    let r = rate.value();
    let growth = (1.0 + r).powi(periods);
    match cost_accrual {
        CostAccrual::StartOfYear => present_value * r * growth / ((1.0 + r).powi(periods + 1) - 1.0),
        CostAccrual::EndOfYear => present_value * r * growth / (growth - 1.0),
    }
}

/// Converts present values into equivalent annualized values.
pub struct AnnualizedValueConverter<'a> {
    catalog: &'a ValueCatalog,
    params: &'a DiscountParameters,
}

impl<'a> AnnualizedValueConverter<'a> {
    pub fn new(catalog: &'a ValueCatalog, params: &'a DiscountParameters) -> Self {
        Self { catalog, params }
    }

    pub fn annualize_row(&self, present_value: &SeriesRow) -> SeriesRow {
        let social_rate = present_value.discount_rate();
        let periods = annuity_periods(
            present_value.calendar_year(),
            self.params.reference_year,
            self.params.cost_accrual,
        );

        let mut values = present_value.values.clone();
        if periods >= 1 {
            for (column, category) in self.catalog.iter() {
                let rate = match category.effective_rate(social_rate, self.params.missing_criteria_rate) {
                    Some(rate) if !rate.is_zero() => rate,
                    _ => continue,
                };
                if let Some(value) = values.get_mut(column) {
                    *value = annualize_value(*value, rate, periods, self.params.cost_accrual);
                }
            }
        }

        SeriesRow {
            key: present_value.key.clone(),
            series: Series::AnnualizedValue,
            values,
        }
    }

    /// Rows of the undiscounted zero-rate series have no annuity and are left out.
    pub fn annualize(&self, present_values: &SeriesTable) -> SeriesTable {
        let _timing = logging::start_timing(
            "annualize_present_values",
            OperationCategory::Discounting {
                subcategory: DiscountingStage::AnnualizedValue,
            },
        );

        let mut annualized = SeriesTable::new();
        let mut skipped = 0usize;
        for (key, row) in present_values {
            if key.discount_rate.is_zero() {
                skipped += 1;
                continue;
            }
            annualized.insert(key.clone(), self.annualize_row(row));
        }

        if skipped > 0 {
            debug!("Skipped {} zero-rate present values", skipped);
        }
        info!("Annualized {} present values", annualized.len());
        annualized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::batch_settings::BatchSettings;
    use crate::models::effects_row::RowKey;
    use indexmap::IndexMap;
    use rstest::rstest;

    fn rate(v: f64) -> DiscountRate {
        DiscountRate::new(v).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * b.abs().max(1.0)
    }

    #[test]
    fn end_of_year_annuity_reconstructs_present_value() {
        let pv = 1_000_000.0;
        let payment = annualize_value(pv, rate(0.03), 10, CostAccrual::EndOfYear);
        let rebuilt: f64 = (1..=10).map(|t| payment / 1.03f64.powi(t)).sum();
        assert!(close(rebuilt, pv));
    }

    #[test]
    fn start_of_year_formula() {
        let pv = 500.0;
        let expected = pv * 0.07 * 1.07f64.powi(5) / (1.07f64.powi(6) - 1.0);
        assert!(close(annualize_value(pv, rate(0.07), 5, CostAccrual::StartOfYear), expected));
    }

    #[rstest]
    #[case(CostAccrual::StartOfYear, 2030, 3)]
    #[case(CostAccrual::EndOfYear, 2030, 4)]
    #[case(CostAccrual::StartOfYear, 2027, 0)]
    #[case(CostAccrual::EndOfYear, 2026, 0)]
    fn periods_follow_accrual(#[case] accrual: CostAccrual, #[case] year: i32, #[case] expected: i32) {
        assert_eq!(annuity_periods(year, 2027, accrual), expected);
    }

    fn present_value_row(year: i32, social: f64) -> SeriesRow {
        let mut values = IndexMap::new();
        values.insert("vmt".to_string(), 10.0);
        values.insert("fuel_cost_dollars".to_string(), 100.0);
        values.insert("co2_global_0.025_cost_dollars".to_string(), 100.0);
        values.insert("pm25_Wu_0.03_cost_dollars".to_string(), 100.0);
        SeriesRow {
            key: RowKey::new("policy", year, "car", "gasoline", "ICE").with_rate(rate(social)),
            series: Series::PresentValue,
            values,
        }
    }

    fn fixture_parts(accrual: CostAccrual) -> (ValueCatalog, DiscountParameters) {
        let mut settings = BatchSettings::default();
        settings.cost_accrual = accrual;
        let row = present_value_row(2030, 0.02);
        let catalog = ValueCatalog::from_columns(row.values.keys(), &settings).unwrap();
        let params = DiscountParameters::from_settings(&settings).unwrap();
        (catalog, params)
    }

    #[test]
    fn uses_each_columns_own_rate() {
        let (catalog, params) = fixture_parts(CostAccrual::EndOfYear);
        let converter = AnnualizedValueConverter::new(&catalog, &params);
        let eav = converter.annualize_row(&present_value_row(2030, 0.07));
        let periods = 4;

        assert_eq!(eav.get("vmt"), Some(10.0));
        assert!(close(
            eav.get("fuel_cost_dollars").unwrap(),
            annualize_value(100.0, rate(0.07), periods, CostAccrual::EndOfYear)
        ));
        assert!(close(
            eav.get("co2_global_0.025_cost_dollars").unwrap(),
            annualize_value(100.0, rate(0.025), periods, CostAccrual::EndOfYear)
        ));
        assert!(close(
            eav.get("pm25_Wu_0.03_cost_dollars").unwrap(),
            annualize_value(100.0, rate(0.03), periods, CostAccrual::EndOfYear)
        ));
        assert_eq!(eav.series, Series::AnnualizedValue);
    }

    #[test]
    fn criteria_substitution_carries_into_annualizing() {
        let (catalog, params) = fixture_parts(CostAccrual::EndOfYear);
        let converter = AnnualizedValueConverter::new(&catalog, &params);
        let eav = converter.annualize_row(&present_value_row(2030, 0.02));
        assert!(close(
            eav.get("pm25_Wu_0.03_cost_dollars").unwrap(),
            annualize_value(100.0, rate(0.02), 4, CostAccrual::EndOfYear)
        ));
    }

    #[rstest]
    #[case(CostAccrual::StartOfYear, 2027)]
    #[case(CostAccrual::EndOfYear, 2026)]
    fn boundary_rows_pass_present_value_through(#[case] accrual: CostAccrual, #[case] year: i32) {
        let (catalog, params) = fixture_parts(accrual);
        let converter = AnnualizedValueConverter::new(&catalog, &params);
        let pv = present_value_row(year, 0.03);
        let eav = converter.annualize_row(&pv);
        assert_eq!(eav.values, pv.values);
    }

    #[test]
    fn end_of_year_reference_year_is_one_period() {
        let (catalog, params) = fixture_parts(CostAccrual::EndOfYear);
        let converter = AnnualizedValueConverter::new(&catalog, &params);
        let eav = converter.annualize_row(&present_value_row(2027, 0.03));
        assert!(close(eav.get("fuel_cost_dollars").unwrap(), 103.0));
    }

    #[test]
    fn zero_rate_rows_are_excluded() {
        let (catalog, params) = fixture_parts(CostAccrual::EndOfYear);
        let converter = AnnualizedValueConverter::new(&catalog, &params);
        let mut table = SeriesTable::new();
        for row in [present_value_row(2030, 0.0), present_value_row(2030, 0.03)] {
            table.insert(row.key.clone(), row);
        }
        let eav = converter.annualize(&table);
        assert_eq!(eav.len(), 1);
        assert!(eav.keys().all(|key| !key.discount_rate.is_zero()));
    }
}
