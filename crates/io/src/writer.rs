//! High-level Parquet writer configuration and orchestration.

use std::path::Path;

use parquet::file::properties::WriterProperties;

use crate::error::IoError;
use crate::parquet_write;
use crate::record::{AnomalyRow, BaselineRow, Observation};

/// Compression algorithm for Parquet output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Compression {
    /// No compression.
    None,
    /// Snappy compression (fast, moderate ratio).
    #[default]
    Snappy,
    /// Zstd compression (slower, better ratio).
    Zstd,
}

impl Compression {
    /// Converts to the corresponding `parquet::basic::Compression` variant.
    fn to_parquet(self) -> Result<parquet::basic::Compression, IoError> {
        Ok(match self {
            Self::None => parquet::basic::Compression::UNCOMPRESSED,
            Self::Snappy => parquet::basic::Compression::SNAPPY,
            Self::Zstd => {
                let level =
                    parquet::basic::ZstdLevel::try_new(3).map_err(|e| IoError::Parquet {
                        reason: e.to_string(),
                    })?;
                parquet::basic::Compression::ZSTD(level)
            }
        })
    }
}

/// Configuration for writing Gaia output tables to Parquet.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Compression algorithm to use.
    compression: Compression,
    /// Maximum number of rows per row group.
    row_group_size: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::default(),
            row_group_size: 1_000_000,
        }
    }
}

impl WriterConfig {
    /// Sets the compression algorithm.
    pub fn with_compression(mut self, comp: Compression) -> Self {
        self.compression = comp;
        self
    }

    /// Sets the maximum number of rows per row group.
    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Validates this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Validation`] if `row_group_size` is zero.
    fn validate(&self) -> Result<(), IoError> {
        if self.row_group_size == 0 {
            return Err(IoError::Validation {
                count: 1,
                details: "row_group_size must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    fn properties(&self) -> Result<WriterProperties, IoError> {
        Ok(WriterProperties::builder()
            .set_compression(self.compression.to_parquet()?)
            .set_max_row_group_size(self.row_group_size)
            .build())
    }
}

/// Writes one cleaned per-variable table.
///
/// The whole file is replaced in a single pass, so re-running the pipeline
/// is idempotent.
///
/// # Errors
///
/// Returns [`IoError::Validation`] if the configuration is invalid, or
/// [`IoError::Parquet`] on schema construction, batch conversion, or file
/// I/O failure.
pub fn write_cleaned(
    path: &Path,
    rows: &[Observation],
    config: &WriterConfig,
) -> Result<(), IoError> {
    config.validate()?;
    let schema = parquet_write::cleaned_schema();
    let batch = parquet_write::cleaned_to_record_batch(rows, &schema)?;
    parquet_write::write_batches(path, &[batch], &schema, config.properties()?)
}

/// Writes the anomaly table (one row per unit-year).
///
/// # Errors
///
/// Same failure modes as [`write_cleaned`].
pub fn write_anomalies(
    path: &Path,
    rows: &[AnomalyRow],
    config: &WriterConfig,
) -> Result<(), IoError> {
    config.validate()?;
    let schema = parquet_write::anomaly_schema();
    let batch = parquet_write::anomaly_to_record_batch(rows, &schema)?;
    parquet_write::write_batches(path, &[batch], &schema, config.properties()?)
}

/// Writes the baseline table (one row per unit, variable, calendar month).
///
/// # Errors
///
/// Same failure modes as [`write_cleaned`].
pub fn write_baselines(
    path: &Path,
    rows: &[BaselineRow],
    config: &WriterConfig,
) -> Result<(), IoError> {
    config.validate()?;
    let schema = parquet_write::baseline_schema();
    let batch = parquet_write::baseline_to_record_batch(rows, &schema)?;
    parquet_write::write_batches(path, &[batch], &schema, config.properties()?)
}
