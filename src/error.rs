//! Error taxonomy for loading and analysing salary data.

use thiserror::Error;

/// Errors raised by the loader and the aggregator.
///
/// Load-time errors abort the run; the dataset is static, so a failure means
/// the input itself is structurally wrong.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A required column is absent from the header row.
    #[error("malformed input {source_name}: {message}")]
    MalformedInput {
        source_name: String,
        message: String,
    },

    /// A numeric field could not be converted to a number.
    #[error("row {row}: column '{column}' value '{value}' is not a number")]
    Parse {
        row: usize,
        column: String,
        value: String,
    },

    /// No market benchmark exists for the group.
    #[error("no benchmark available for level '{level}'")]
    MissingBenchmark { level: String },

    /// The benchmark cannot be used as a divisor.
    #[error("invalid benchmark for level '{level}': {reason}")]
    InvalidBenchmark { level: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl AnalysisError {
    /// Shorthand for a missing-column error.
    pub fn missing_column(source_name: &str, column: &str) -> Self {
        Self::MalformedInput {
            source_name: source_name.to_string(),
            message: format!("required column '{}' is missing", column),
        }
    }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
