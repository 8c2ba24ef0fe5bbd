//! Error types for gaia-io.

use std::path::PathBuf;

/// Error type for all fallible operations in the gaia-io crate.
///
/// Schema problems are hard errors: a record missing one of its key
/// fields, or carrying an unrecognized variable name, aborts the whole
/// ingestion rather than degrading into a data-quality issue.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when a required file does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that could not be found.
        path: PathBuf,
    },

    /// Wraps an error originating from the Parquet library.
    #[error("parquet error: {reason}")]
    Parquet {
        /// Description of the underlying Parquet failure.
        reason: String,
    },

    /// Returned when one or more schema/validation checks fail.
    #[error("{count} validation error(s): {details}")]
    Validation {
        /// Number of accumulated validation failures.
        count: usize,
        /// Human-readable summary of the failures.
        details: String,
    },

    /// Returned when a `variable` cell holds a name outside the fixed set.
    #[error("unknown variable '{name}' at row {row}")]
    UnknownVariable {
        /// The unrecognized variable name.
        name: String,
        /// Zero-based row index within the file.
        row: usize,
    },

    /// Returned when a key field is null in an input record.
    #[error("null {field} at row {row}: key fields are mandatory")]
    NullKeyField {
        /// Name of the null key column.
        field: &'static str,
        /// Zero-based row index within the file.
        row: usize,
    },

    /// Returned when a month cell is outside 1..=12.
    #[error("invalid month {month} at row {row} (must be 1..=12)")]
    InvalidMonth {
        /// The invalid month number.
        month: u8,
        /// Zero-based row index within the file.
        row: usize,
    },
}

impl From<parquet::errors::ParquetError> for IoError {
    fn from(e: parquet::errors::ParquetError) -> Self {
        IoError::Parquet {
            reason: e.to_string(),
        }
    }
}

impl From<arrow::error::ArrowError> for IoError {
    fn from(e: arrow::error::ArrowError) -> Self {
        IoError::Parquet {
            reason: e.to_string(),
        }
    }
}
