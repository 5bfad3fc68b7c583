use thiserror::Error;

use crate::types::DataType;

/// Convenience result type for planning and streaming operations.
pub type SplitResult<T> = Result<T, SplitError>;

/// Error type returned across the crate.
///
/// Planning only produces [`SplitError::Config`]. Streaming produces the data errors
/// ([`SplitError::SplitValidation`], [`SplitError::TypeCoercion`], [`SplitError::SchemaMismatch`])
/// plus whatever the sink reports.
#[derive(Debug, Error)]
pub enum SplitError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read/write error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration file could not be decoded.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The split configuration is invalid for the input schema.
    #[error("config error: {message}")]
    Config { message: String },

    /// The target value was split into a different number of parts than configured.
    #[error(
        "split validation failed at row {row}: expected {expected} parts but value was separated into {actual}: {}",
        display_raw(.raw)
    )]
    SplitValidation {
        row: u64,
        expected: usize,
        actual: usize,
        raw: Option<String>,
    },

    /// A split part could not be parsed into its declared output type.
    #[error(
        "failed to coerce part {part_index} into column '{column}' ({data_type}) at row {row}: {message} (raw='{raw}')"
    )]
    TypeCoercion {
        row: u64,
        column: String,
        part_index: usize,
        data_type: DataType,
        raw: String,
        message: String,
    },

    /// A record (or the input) does not conform to the expected schema.
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// An input cell could not be parsed into its declared [`DataType`].
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    ParseError {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },

    /// A stream operation was called in a lifecycle state that does not allow it.
    #[error("cannot {operation} a stream that is {state}")]
    InvalidState {
        state: &'static str,
        operation: &'static str,
    },
}

impl SplitError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Prefix a config error's message with `context`; other variants pass unchanged.
    pub(crate) fn in_context(self, context: impl std::fmt::Display) -> Self {
        match self {
            Self::Config { message } => Self::Config {
                message: format!("{context}: {message}"),
            },
            other => other,
        }
    }

    pub(crate) fn schema_mismatch(message: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            message: message.into(),
        }
    }
}

pub(crate) fn display_raw(raw: &Option<String>) -> String {
    match raw {
        Some(raw) => format!("\"{raw}\""),
        None => "null".to_string(),
    }
}
