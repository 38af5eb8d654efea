use std::path::PathBuf;
use thiserror::Error;

/// Error type for invalid operations.
#[derive(Error, Debug)]
pub enum RdiceError {
    #[error("{0}")]
    Error(String),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
    #[error("No value for '{field}' in region '{region}' for year {year}")]
    DataAbsent {
        region: String,
        year: i32,
        field: String,
    },
    #[error("Year {year} does not follow {last} in the {metric} series of region '{region}'")]
    NonAscendingYear {
        region: String,
        metric: String,
        last: i32,
        year: i32,
    },
    #[error("Region '{0}' is not part of the result table")]
    UnknownRegion(String),
    #[error("Invalid number '{value}' for '{variable}' in {scenario}")]
    InvalidNumber {
        variable: String,
        scenario: String,
        value: String,
    },
    #[error("Expected {expected} values for '{variable}' in {scenario}, got {found}")]
    LengthMismatch {
        variable: String,
        scenario: String,
        expected: usize,
        found: usize,
    },
    #[error("Variable '{variable}' is unused in {scenario}")]
    UnusedVariable { variable: String, scenario: String },
    #[error("Solver did not terminate optimally: {0}")]
    NotOptimal(String),
    #[error("Solved model has no value for '{name}' at {year}")]
    MissingSolutionValue { name: String, year: i32 },
    #[error("Solved model has no value for scalar '{0}'")]
    MissingScalar(String),
    #[error("Final year {until} is outside of the time grid {first}..={last}")]
    HorizonOutOfRange { until: i32, first: i32, last: i32 },
}

impl RdiceError {
    /// Whether the error came from reading or parsing an external source.
    ///
    /// Load failures are never cached, so retrying the access that produced them is valid.
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            RdiceError::Io { .. } | RdiceError::Csv { .. } | RdiceError::InvalidNumber { .. }
        )
    }
}

/// Convenience type for `Result<T, RdiceError>`.
pub type RdiceResult<T> = Result<T, RdiceError>;
