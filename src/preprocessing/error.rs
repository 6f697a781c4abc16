//! Error types for preprocessing operations.
//!
//! Every failure of the transformation stage surfaces as one of the variants
//! below. The four domain variants map one-to-one onto the stage's components:
//!
//! | Variant | Raised by |
//! |---------|-----------|
//! | [`PreprocessingError::SchemaError`] | schema inference, CSV type coercion |
//! | [`PreprocessingError::FitError`] | fitting an imputer/encoder on a column |
//! | [`PreprocessingError::TransformError`] | applying a fitted pipeline to a table |
//! | [`PreprocessingError::MaterializationError`] | turning a matrix back into a table |
//!
//! Unknown categorical levels at transform time are not an error.

use thiserror::Error;

/// Error type for preprocessing operations.
#[derive(Debug, Error)]
pub enum PreprocessingError {
    /// The input table cannot be partitioned into features and a label.
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// A column has no estimable statistic.
    #[error("Fit error in column '{column}': {reason}")]
    FitError { column: String, reason: String },

    /// A table presented for transform is incompatible with the fitted pipeline.
    #[error("Transform error in column '{column}': {reason}")]
    TransformError { column: String, reason: String },

    /// Matrix shape does not agree with the expected output schema.
    #[error(
        "Materialization error: expected {expected_rows} rows x {expected_cols} columns, got {got_rows} x {got_cols}"
    )]
    MaterializationError {
        expected_rows: usize,
        expected_cols: usize,
        got_rows: usize,
        got_cols: usize,
    },

    /// Invalid hyperparameter or configuration value.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Serialization or deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Malformed delimited input or output failure in the CSV layer.
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

impl PreprocessingError {
    pub(crate) fn fit(column: impl Into<String>, reason: impl Into<String>) -> Self {
        PreprocessingError::FitError {
            column: column.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn transform(column: impl Into<String>, reason: impl Into<String>) -> Self {
        PreprocessingError::TransformError {
            column: column.into(),
            reason: reason.into(),
        }
    }
}

impl From<bincode::Error> for PreprocessingError {
    fn from(err: bincode::Error) -> Self {
        PreprocessingError::SerializationError(err.to_string())
    }
}

impl From<serde_json::Error> for PreprocessingError {
    fn from(err: serde_json::Error) -> Self {
        PreprocessingError::SerializationError(err.to_string())
    }
}

impl From<toml::de::Error> for PreprocessingError {
    fn from(err: toml::de::Error) -> Self {
        PreprocessingError::InvalidParameter(format!("config: {}", err))
    }
}
