//! Low-level Parquet reading and column extraction.

use std::path::Path;

use arrow::array::{Array, AsArray, RecordBatch};
use arrow::datatypes::{Float64Type, Int32Type, UInt8Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::error::IoError;
use crate::record::{Observation, UnitKey};
use crate::validate::ValidationCollector;
use crate::variable::Variable;

/// Column positions resolved by name from the file schema.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ColumnIndex {
    province: usize,
    district: usize,
    subdistrict: usize,
    /// Present for raw observation files, absent for per-variable cleaned
    /// files (where the file name carries the variable).
    variable: Option<usize>,
    year: usize,
    month: usize,
    value: usize,
}

/// Reads all record batches from a Parquet file.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] if the file does not exist, or
/// [`IoError::Parquet`] if the file cannot be opened or read.
pub(crate) fn read_batches(path: &Path) -> Result<Vec<RecordBatch>, IoError> {
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let file = std::fs::File::open(path).map_err(|e| IoError::Parquet {
        reason: e.to_string(),
    })?;

    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let reader = builder.build()?;

    let batches: Vec<RecordBatch> =
        reader
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| IoError::Parquet {
                reason: e.to_string(),
            })?;

    Ok(batches)
}

/// Resolves and validates the observation-table columns by name.
///
/// Every key column (and, when `expect_variable` is set, the `variable`
/// column) is mandatory; all violations are gathered into a single
/// [`IoError::Validation`].
pub(crate) fn validate_schema(
    batch: &RecordBatch,
    expect_variable: bool,
) -> Result<ColumnIndex, IoError> {
    let schema = batch.schema();
    let mut c = ValidationCollector::new();

    let mut lookup = |name: &str| match schema.index_of(name) {
        Ok(i) => Some(i),
        Err(_) => {
            c.push(format!("missing column '{name}'"));
            None
        }
    };

    let province = lookup("province");
    let district = lookup("district");
    let subdistrict = lookup("subdistrict");
    let variable = if expect_variable {
        lookup("variable")
    } else {
        None
    };
    let year = lookup("year");
    let month = lookup("month");
    let value = lookup("value");

    c.finish()?;

    Ok(ColumnIndex {
        province: province.expect("validated"),
        district: district.expect("validated"),
        subdistrict: subdistrict.expect("validated"),
        variable,
        year: year.expect("validated"),
        month: month.expect("validated"),
        value: value.expect("validated"),
    })
}

/// Extracts observations from one batch, appending to `out`.
///
/// `fixed_variable` supplies the variable for per-variable cleaned files;
/// otherwise the batch's `variable` column is parsed per row. `row_offset`
/// is the number of rows in earlier batches, so error messages carry
/// file-global row numbers.
pub(crate) fn extract_observations(
    batch: &RecordBatch,
    cols: &ColumnIndex,
    fixed_variable: Option<Variable>,
    row_offset: usize,
    out: &mut Vec<Observation>,
) -> Result<(), IoError> {
    let province = batch
        .column(cols.province)
        .as_string_opt::<i32>()
        .ok_or_else(|| type_error("province"))?;
    let district = batch
        .column(cols.district)
        .as_string_opt::<i32>()
        .ok_or_else(|| type_error("district"))?;
    let subdistrict = batch
        .column(cols.subdistrict)
        .as_string_opt::<i32>()
        .ok_or_else(|| type_error("subdistrict"))?;
    let variable = match cols.variable {
        Some(i) => Some(
            batch
                .column(i)
                .as_string_opt::<i32>()
                .ok_or_else(|| type_error("variable"))?,
        ),
        None => None,
    };
    let year = batch
        .column(cols.year)
        .as_primitive_opt::<Int32Type>()
        .ok_or_else(|| type_error("year"))?;
    let month = batch
        .column(cols.month)
        .as_primitive_opt::<UInt8Type>()
        .ok_or_else(|| type_error("month"))?;
    let value = batch
        .column(cols.value)
        .as_primitive_opt::<Float64Type>()
        .ok_or_else(|| type_error("value"))?;

    for r in 0..batch.num_rows() {
        let row = row_offset + r;

        for (col, field) in [
            (province, "province"),
            (district, "district"),
            (subdistrict, "subdistrict"),
        ] {
            if col.is_null(r) {
                return Err(IoError::NullKeyField { field, row });
            }
        }
        if year.is_null(r) {
            return Err(IoError::NullKeyField { field: "year", row });
        }
        if month.is_null(r) {
            return Err(IoError::NullKeyField {
                field: "month",
                row,
            });
        }

        let var = match (fixed_variable, variable) {
            (Some(v), _) => v,
            (None, Some(col)) => {
                if col.is_null(r) {
                    return Err(IoError::NullKeyField {
                        field: "variable",
                        row,
                    });
                }
                col.value(r)
                    .parse::<Variable>()
                    .map_err(|_| IoError::UnknownVariable {
                        name: col.value(r).to_string(),
                        row,
                    })?
            }
            (None, None) => unreachable!("validate_schema guarantees a variable source"),
        };

        let m = month.value(r);
        if !(1..=12).contains(&m) {
            return Err(IoError::InvalidMonth { month: m, row });
        }

        // A null measurement is a missing value, not an error.
        let v = if value.is_null(r) {
            None
        } else {
            let x = value.value(r);
            x.is_finite().then_some(x)
        };

        out.push(Observation {
            unit: UnitKey::new(province.value(r), district.value(r), subdistrict.value(r)),
            variable: var,
            year: year.value(r),
            month: m,
            value: v,
        });
    }

    Ok(())
}

fn type_error(column: &str) -> IoError {
    IoError::Validation {
        count: 1,
        details: format!("column '{column}' has an unexpected type"),
    }
}
