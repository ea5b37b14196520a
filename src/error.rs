use thiserror::Error;

/// Reasons a month sequence cannot be classified.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidInput {
    #[error("month sequence is empty")]
    Empty,

    #[error("period {index} is not a finite number")]
    NonFinite { index: usize },

    #[error("period {index} has negative value {value}")]
    Negative { index: usize, value: f64 },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("No period columns found in header")]
    NoPeriods,

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Row {row}: {source}")]
    Classify {
        row: usize,
        #[source]
        source: InvalidInput,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
