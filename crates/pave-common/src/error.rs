//! Error types for the paving pipeline.

use thiserror::Error;

/// Result type alias for paving pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the paving pipeline.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("configuration validation failed: {0}")]
    Validation(String),

    // Input errors (20-29)
    #[error("missing required column: {column}")]
    MissingColumn { column: String },

    #[error("row {row}: cannot parse {column} as a timestamp: {value:?}")]
    DateParse {
        row: usize,
        column: String,
        value: String,
    },

    #[error("row {row}: cannot parse {column} as {expected}: {value:?}")]
    ValueParse {
        row: usize,
        column: String,
        expected: &'static str,
        value: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // Argument errors (30-39)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    /// Reported alongside the message when the CLI fails.
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::Validation(_) => 11,
            Error::MissingColumn { .. } => 20,
            Error::DateParse { .. } => 21,
            Error::ValueParse { .. } => 22,
            Error::Csv(_) => 23,
            Error::InvalidArgument(_) => 30,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }
}
