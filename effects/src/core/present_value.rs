use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::core::value_catalog::ValueCatalog;
use crate::models::effects_row::{FamilyKey, Series, SeriesRow, SeriesTable};
use crate::utils::logging::{self, DiscountingStage, OperationCategory};

/// A year after the reference year whose family has earlier years but not
/// the immediately preceding one. Its carry-forward was taken as zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuityGap {
    pub family: FamilyKey,
    pub calendar_year: i32,
}

/// Running cumulative present values per family, built from annual values.
pub struct PresentValueAccumulator<'a> {
    catalog: &'a ValueCatalog,
    reference_year: i32,
}

impl<'a> PresentValueAccumulator<'a> {
    pub fn new(catalog: &'a ValueCatalog, reference_year: i32) -> Self {
        Self {
            catalog,
            reference_year,
        }
    }

    pub fn accumulate(&self, annual_values: &SeriesTable) -> (SeriesTable, Vec<ContinuityGap>) {
        let _timing = logging::start_timing(
            "accumulate_present_values",
            OperationCategory::Discounting {
                subcategory: DiscountingStage::PresentValue,
            },
        );

        let mut families: BTreeMap<FamilyKey, Vec<&SeriesRow>> = BTreeMap::new();
        for (key, row) in annual_values {
            families.entry(key.family()).or_default().push(row);
        }
        let family_count = families.len();

        // families are independent of each other
        let results: Vec<(Vec<SeriesRow>, Vec<ContinuityGap>)> = families
            .into_par_iter()
            .map(|(family, rows)| self.accumulate_family(&family, rows))
            .collect();

        let mut present_values = SeriesTable::new();
        let mut gaps = Vec::new();
        for (rows, family_gaps) in results {
            for row in rows {
                present_values.insert(row.key.clone(), row);
            }
            gaps.extend(family_gaps);
        }

        info!(
            "Accumulated {} present values across {} families ({} continuity gaps)",
            present_values.len(),
            family_count,
            gaps.len()
        );
        (present_values, gaps)
    }

    fn accumulate_family(&self, family: &FamilyKey, mut rows: Vec<&SeriesRow>) -> (Vec<SeriesRow>, Vec<ContinuityGap>) {
        rows.sort_by_key(|row| row.calendar_year());

        let monetized = self.catalog.monetized_columns();
        let first_year = rows.first().map(|row| row.calendar_year());
        let mut present_values: Vec<SeriesRow> = Vec::with_capacity(rows.len());
        let mut gaps = Vec::new();

        for row in rows {
            let year = row.calendar_year();
            let mut present_value = SeriesRow {
                key: row.key.clone(),
                series: Series::PresentValue,
                values: row.values.clone(),
            };

            if !family.discount_rate.is_zero() && year > self.reference_year {
                let predecessor = present_values
                    .last()
                    .filter(|previous| previous.calendar_year() == year - 1);

                match predecessor {
                    Some(previous) => {
                        for column in &monetized {
                            if let (Some(value), Some(carry)) =
                                (present_value.values.get_mut(*column), previous.get(column))
                            {
                                *value += carry;
                            }
                        }
                    }
                    None if Some(year) != first_year => {
                        warn!(
                            "No present value for {} in {}; carrying forward zero into {}",
                            family,
                            year - 1,
                            year
                        );
                        gaps.push(ContinuityGap {
                            family: family.clone(),
                            calendar_year: year,
                        });
                    }
                    None => {
                        debug!("Family {} starts in {}, after the reference year", family, year);
                    }
                }
            }

            present_values.push(present_value);
        }

        (present_values, gaps)
    }
}
