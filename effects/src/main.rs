use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::{info, warn};

use omega_effects::analysis::reporting;
use omega_effects::cli::cli::Args;
use omega_effects::data::{effects_loader, settings_loader};
use omega_effects::utils::csv_export::CsvExporter;
use omega_effects::utils::logging;
use omega_effects::Discounting;

fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_logging(args.enable_timing()).context("Failed to set up tracing subscriber")?;

    let settings = settings_loader::load_batch_settings(args.batch_settings())
        .with_context(|| format!("Loading batch settings from {}", args.batch_settings()))?;
    let rows = effects_loader::load_effects(args.annual_values())
        .with_context(|| format!("Loading annual effects from {}", args.annual_values()))?;

    let outputs = Discounting::new(&settings)?.run(&rows)?;
    for gap in &outputs.continuity_gaps {
        warn!("Continuity gap: {} in {}", gap.family, gap.calendar_year);
    }

    let exporter = CsvExporter::new(args.output_dir(), args.verbose_export())
        .with_context(|| format!("Creating output directory under {}", args.output_dir()))?;
    exporter
        .export_discounting_results(&outputs)
        .map_err(|e| anyhow!("Exporting results: {}", e))?;
    info!("Results written to {}", exporter.output_dir().display());

    if !args.quiet_summary() {
        reporting::print_discounting_summary(&outputs);
    }
    logging::print_timing_report();

    Ok(())
}
