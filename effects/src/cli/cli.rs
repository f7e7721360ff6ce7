use clap::Parser;

#[derive(Parser)]
#[command(author, version, about = "Discounts annual effects to present and annualized values", long_about = None)]
pub struct Args {
    #[arg(short = 's', long, help = "Batch settings JSON file")]
    batch_settings: String,

    #[arg(short = 'a', long, help = "Annual effects CSV file")]
    annual_values: String,

    #[arg(short, long, default_value = "output")]
    output_dir: String,

    #[arg(long, default_value_t = false)]
    enable_timing: bool,

    #[arg(short, long, help = "Log every CSV file written", default_value_t = false)]
    verbose_export: bool,

    #[arg(long, help = "Skip the console summary of final-year totals", default_value_t = false)]
    quiet_summary: bool,
}

// Add getter methods for all fields
impl Args {
    pub fn batch_settings(&self) -> &str {
        &self.batch_settings
    }

    pub fn annual_values(&self) -> &str {
        &self.annual_values
    }

    pub fn output_dir(&self) -> &str {
        &self.output_dir
    }

    pub fn enable_timing(&self) -> bool {
        self.enable_timing
    }

    pub fn verbose_export(&self) -> bool {
        self.verbose_export
    }

    pub fn quiet_summary(&self) -> bool {
        self.quiet_summary
    }
}
