// Main module declarations for the effects discounting engine

// Discounting stages and the batch pipeline
pub mod core {
    pub mod error;
    pub mod value_catalog;
    pub mod discounter;
    pub mod present_value;
    pub mod annualized_value;
    pub mod discounting;
}

// Configuration modules
pub mod config {
    pub mod constants;
    pub mod batch_settings;
}

// Model definitions
pub mod models {
    pub mod rate;
    pub mod effects_row;
    pub mod value_category;
}

// Data loaders
pub mod data {
    pub mod effects_loader;
    pub mod settings_loader;
}

// Console reporting
pub mod analysis {
    pub mod reporting;
}

// Utility functions
pub mod utils {
    pub mod logging;
    pub mod csv_export;
}

// CLI interface
pub mod cli {
    pub mod cli;
}

// Re-export commonly used items
pub use crate::config::batch_settings::{BatchSettings, CostAccrual};
pub use crate::core::discounting::{Discounting, DiscountingOutputs};
pub use crate::core::error::DiscountingError;
pub use crate::core::value_catalog::ValueCatalog;
pub use crate::models::effects_row::{EffectsRow, RowKey, Series, SeriesKey, SeriesRow, SeriesTable};
pub use crate::models::rate::DiscountRate;
