//! High-level observation readers.

use std::path::Path;

use crate::error::IoError;
use crate::parquet_read::{extract_observations, read_batches, validate_schema};
use crate::record::Observation;
use crate::variable::Variable;

/// Reads a raw observation table.
///
/// The file must carry the columns `province`, `district`, `subdistrict`,
/// `variable`, `year`, `month` (all non-null) and a nullable `value`. Any
/// schema violation (missing column, null key field, unknown variable,
/// month outside 1..=12) aborts the read; a null or non-finite `value` is
/// simply a missing measurement.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`], [`IoError::Parquet`], or one of the
/// schema errors described above.
pub fn read_observations(path: &Path) -> Result<Vec<Observation>, IoError> {
    let batches = read_batches(path)?;
    let Some(first) = batches.first() else {
        return Ok(Vec::new());
    };
    let cols = validate_schema(first, true)?;

    let mut out = Vec::new();
    let mut offset = 0;
    for batch in &batches {
        extract_observations(batch, &cols, None, offset, &mut out)?;
        offset += batch.num_rows();
    }
    Ok(out)
}

/// Reads one per-variable cleaned table.
///
/// Cleaned files have no `variable` column; the caller names the variable
/// (it is encoded in the file name by the writer side).
///
/// # Errors
///
/// Same failure modes as [`read_observations`], minus variable parsing.
pub fn read_cleaned(path: &Path, variable: Variable) -> Result<Vec<Observation>, IoError> {
    let batches = read_batches(path)?;
    let Some(first) = batches.first() else {
        return Ok(Vec::new());
    };
    let cols = validate_schema(first, false)?;

    let mut out = Vec::new();
    let mut offset = 0;
    for batch in &batches {
        extract_observations(batch, &cols, Some(variable), offset, &mut out)?;
        offset += batch.num_rows();
    }
    Ok(out)
}
