//! # gaia-io
//!
//! Tabular Parquet I/O for the Gaia pipeline: raw observation ingestion
//! with hard schema validation, and writers for the cleaned per-variable
//! tables, the anomaly table, and the baseline table. Bridges external
//! files into the pipeline's `Option<f64>`-based record types.

mod error;
mod parquet_read;
mod parquet_write;
mod reader;
mod record;
mod validate;
mod variable;
mod writer;

pub use error::IoError;
pub use reader::{read_cleaned, read_observations};
pub use record::{AnomalyRow, BaselineRow, Observation, ScoreCells, UnitKey};
pub use variable::Variable;
pub use writer::{Compression, WriterConfig, write_anomalies, write_baselines, write_cleaned};
