// Column vocabulary shared with the effects tables

/// Marker for dollar-valued columns.
pub const DOLLARS_TAG: &str = "_dollars";
/// Dollar columns containing this tag are averages, never discounted.
pub const AVERAGE_TAG: &str = "avg";
/// Separator between tokens of a column name.
pub const COLUMN_TOKEN_SEPARATOR: char = '_';

// Composite key columns
pub const SESSION_POLICY_COLUMN: &str = "session_policy";
pub const CALENDAR_YEAR_COLUMN: &str = "calendar_year";
pub const REG_CLASS_ID_COLUMN: &str = "reg_class_id";
pub const IN_USE_FUEL_ID_COLUMN: &str = "in_use_fuel_id";
pub const FUELING_CLASS_COLUMN: &str = "fueling_class";

pub const KEY_COLUMNS: [&str; 5] = [
    SESSION_POLICY_COLUMN,
    CALENDAR_YEAR_COLUMN,
    REG_CLASS_ID_COLUMN,
    IN_USE_FUEL_ID_COLUMN,
    FUELING_CLASS_COLUMN,
];

// Columns added to every exported series row
pub const SERIES_COLUMN: &str = "series";
pub const DISCOUNT_RATE_COLUMN: &str = "discount_rate";

/// Series columns the engine writes itself; ignored when present in input.
pub const RESERVED_COLUMNS: [&str; 2] = [SERIES_COLUMN, DISCOUNT_RATE_COLUMN];

// Series labels
pub const ANNUAL_VALUE_LABEL: &str = "AnnualValue";
pub const PRESENT_VALUE_LABEL: &str = "PresentValue";
pub const ANNUALIZED_VALUE_LABEL: &str = "AnnualizedValue";

// Cost accrual labels
pub const START_OF_YEAR: &str = "start-of-year";
pub const END_OF_YEAR: &str = "end-of-year";

/// Criteria columns at this embedded rate are re-discounted at the social rate
/// when the sweep visits the social rate missing from the criteria factors.
pub const CRITERIA_SUBSTITUTION_SOURCE_RATE: f64 = 0.03;

/// Rates closer than this are treated as the same rate when comparing
/// configured rates with each other.
pub const RATE_TOLERANCE: f64 = 1e-9;

// Export file names
pub const ANNUAL_VALUES_FILE: &str = "annual_values.csv";
pub const PRESENT_VALUES_FILE: &str = "present_values.csv";
pub const ANNUALIZED_VALUES_FILE: &str = "annualized_values.csv";
pub const COMBINED_VALUES_FILE: &str = "discounted_values.csv";
