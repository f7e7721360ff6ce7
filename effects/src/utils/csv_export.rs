use chrono::Local;
use csv::Writer;
use std::error::Error;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::constants::{
    ANNUALIZED_VALUES_FILE, ANNUAL_VALUES_FILE, COMBINED_VALUES_FILE, DISCOUNT_RATE_COLUMN, KEY_COLUMNS,
    PRESENT_VALUES_FILE, SERIES_COLUMN,
};
use crate::core::discounting::DiscountingOutputs;
use crate::core::value_catalog::ValueCatalog;
use crate::models::effects_row::{Series, SeriesRow};
use crate::utils::logging::{self, FileIOType, OperationCategory};

/// Writes rows of any series as a flat table: key columns, series label,
/// discount rate, then the catalog's retained columns in input order.
pub fn write_series<'a, W, I>(writer: W, catalog: &ValueCatalog, rows: I) -> Result<usize, Box<dyn Error>>
where
    W: Write,
    I: IntoIterator<Item = &'a SeriesRow>,
{
    let mut writer = Writer::from_writer(writer);
    let value_columns = catalog.retained_columns();

    let mut header: Vec<&str> = KEY_COLUMNS.to_vec();
    header.push(SERIES_COLUMN);
    header.push(DISCOUNT_RATE_COLUMN);
    header.extend(value_columns.iter().copied());
    writer.write_record(&header)?;

    let mut count = 0;
    for row in rows {
        let key = &row.key;
        let mut record: Vec<String> = vec![
            key.session_policy.clone(),
            key.calendar_year.to_string(),
            key.reg_class_id.clone(),
            key.in_use_fuel_id.clone(),
            key.fueling_class.clone(),
            row.series.label().to_string(),
            key.discount_rate.to_string(),
        ];
        for column in &value_columns {
            record.push(row.get(column).map(|v| v.to_string()).unwrap_or_default());
        }
        writer.write_record(&record)?;
        count += 1;
    }

    writer.flush()?;
    Ok(count)
}

/// Main struct for handling CSV export
pub struct CsvExporter {
    output_dir: PathBuf,
    verbose_logging: bool,
}

impl CsvExporter {
    /// Creates a timestamped run directory under `output_dir`.
    pub fn new(output_dir: impl AsRef<Path>, verbose_logging: bool) -> std::io::Result<Self> {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let full_path = output_dir.as_ref().join(timestamp);
        std::fs::create_dir_all(&full_path)?;

        Ok(Self {
            output_dir: full_path,
            verbose_logging,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Export all three series, separately and combined
    pub fn export_discounting_results(&self, outputs: &DiscountingOutputs) -> Result<(), Box<dyn Error>> {
        let _timing = logging::start_timing(
            "export_discounting_results",
            OperationCategory::FileIO {
                subcategory: FileIOType::ResultsSave,
            },
        );

        for (series, file_name) in [
            (Series::AnnualValue, ANNUAL_VALUES_FILE),
            (Series::PresentValue, PRESENT_VALUES_FILE),
            (Series::AnnualizedValue, ANNUALIZED_VALUES_FILE),
        ] {
            self.export_rows(file_name, &outputs.catalog, outputs.series(series).values())?;
        }
        self.export_rows(COMBINED_VALUES_FILE, &outputs.catalog, outputs.rows())?;

        if self.verbose_logging {
            info!("CSV export completed successfully to: {}", self.output_dir.display());
        }
        Ok(())
    }

    fn export_rows<'a>(
        &self,
        file_name: &str,
        catalog: &ValueCatalog,
        rows: impl IntoIterator<Item = &'a SeriesRow>,
    ) -> Result<(), Box<dyn Error>> {
        let path = self.output_dir.join(file_name);
        let file = std::fs::File::create(&path)?;
        let count = write_series(file, catalog, rows)?;
        if self.verbose_logging {
            info!("Wrote {} rows to {}", count, path.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::batch_settings::BatchSettings;
    use crate::models::effects_row::RowKey;
    use crate::models::rate::DiscountRate;
    use indexmap::IndexMap;

    #[test]
    fn writes_flat_table_with_series_column() {
        let settings = BatchSettings::default();
        let catalog = ValueCatalog::from_columns(["vmt", "fuel_cost_dollars", "avg_cost_dollars"], &settings).unwrap();

        let mut values = IndexMap::new();
        values.insert("vmt".to_string(), 10.0);
        values.insert("fuel_cost_dollars".to_string(), 2.5);
        let row = SeriesRow {
            key: RowKey::new("p", 2030, "car", "gasoline", "ICE").with_rate(DiscountRate::new(0.03).unwrap()),
            series: Series::PresentValue,
            values,
        };

        let mut buffer = Vec::new();
        let count = write_series(&mut buffer, &catalog, [&row]).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(count, 1);
        assert_eq!(
            lines[0],
            "session_policy,calendar_year,reg_class_id,in_use_fuel_id,fueling_class,series,discount_rate,vmt,fuel_cost_dollars"
        );
        assert_eq!(lines[1], "p,2030,car,gasoline,ICE,PresentValue,0.03,10,2.5");
    }
}
