//! Low-level Parquet schema and column building.

use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    ArrayRef, BooleanArray, Float64Array, Int32Array, RecordBatch, StringArray, UInt8Array,
};
use arrow::datatypes::{DataType, Field, Schema};
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;

use crate::error::IoError;
use crate::record::{AnomalyRow, BaselineRow, Observation};
use crate::variable::Variable;

/// Arrow schema for one cleaned per-variable table.
///
/// The key is (province, district, subdistrict, year, month); `value` is
/// nullable because an unresolved degenerate series keeps its missing
/// months in the output rather than inventing numbers.
pub(crate) fn cleaned_schema() -> Schema {
    Schema::new(vec![
        Field::new("province", DataType::Utf8, false),
        Field::new("district", DataType::Utf8, false),
        Field::new("subdistrict", DataType::Utf8, false),
        Field::new("year", DataType::Int32, false),
        Field::new("month", DataType::UInt8, false),
        Field::new("value", DataType::Float64, true),
    ])
}

/// Arrow schema for the anomaly table: one row per unit-year, five nullable
/// cells per variable (`dtw_<var>`, `dtw_<var>_threshold`, `dtw_<var>_flag`,
/// `dtw_<var>_z`, `dtw_<var>_z_flag`).
pub(crate) fn anomaly_schema() -> Schema {
    let mut fields = vec![
        Field::new("province", DataType::Utf8, false),
        Field::new("district", DataType::Utf8, false),
        Field::new("subdistrict", DataType::Utf8, false),
        Field::new("year", DataType::Int32, false),
    ];
    for v in Variable::ALL {
        let base = format!("dtw_{}", v.as_lower());
        fields.push(Field::new(&base, DataType::Float64, true));
        fields.push(Field::new(format!("{base}_threshold"), DataType::Float64, true));
        fields.push(Field::new(format!("{base}_flag"), DataType::Boolean, true));
        fields.push(Field::new(format!("{base}_z"), DataType::Float64, true));
        fields.push(Field::new(format!("{base}_z_flag"), DataType::Boolean, true));
    }
    Schema::new(fields)
}

/// Arrow schema for the baseline table: one row per (unit, variable,
/// calendar month).
pub(crate) fn baseline_schema() -> Schema {
    Schema::new(vec![
        Field::new("province", DataType::Utf8, false),
        Field::new("district", DataType::Utf8, false),
        Field::new("subdistrict", DataType::Utf8, false),
        Field::new("variable", DataType::Utf8, false),
        Field::new("month", DataType::UInt8, false),
        Field::new("value", DataType::Float64, true),
    ])
}

/// Converts cleaned observations into an Arrow [`RecordBatch`] matching
/// [`cleaned_schema`].
pub(crate) fn cleaned_to_record_batch(
    rows: &[Observation],
    schema: &Schema,
) -> Result<RecordBatch, IoError> {
    let province: ArrayRef = Arc::new(StringArray::from_iter_values(
        rows.iter().map(|r| r.unit.province.as_str()),
    ));
    let district: ArrayRef = Arc::new(StringArray::from_iter_values(
        rows.iter().map(|r| r.unit.district.as_str()),
    ));
    let subdistrict: ArrayRef = Arc::new(StringArray::from_iter_values(
        rows.iter().map(|r| r.unit.subdistrict.as_str()),
    ));
    let year: ArrayRef = Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.year)));
    let month: ArrayRef = Arc::new(UInt8Array::from_iter_values(rows.iter().map(|r| r.month)));
    let value: ArrayRef = Arc::new(Float64Array::from_iter(rows.iter().map(|r| r.value)));

    RecordBatch::try_new(
        Arc::new(schema.clone()),
        vec![province, district, subdistrict, year, month, value],
    )
    .map_err(|e| IoError::Parquet {
        reason: e.to_string(),
    })
}

/// Converts anomaly rows into an Arrow [`RecordBatch`] matching
/// [`anomaly_schema`].
pub(crate) fn anomaly_to_record_batch(
    rows: &[AnomalyRow],
    schema: &Schema,
) -> Result<RecordBatch, IoError> {
    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(
            rows.iter().map(|r| r.unit.province.as_str()),
        )),
        Arc::new(StringArray::from_iter_values(
            rows.iter().map(|r| r.unit.district.as_str()),
        )),
        Arc::new(StringArray::from_iter_values(
            rows.iter().map(|r| r.unit.subdistrict.as_str()),
        )),
        Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.year))),
    ];

    for v in Variable::ALL {
        let cells: Vec<_> = rows
            .iter()
            .map(|r| r.scores.get(&v).copied().unwrap_or_default())
            .collect();
        columns.push(Arc::new(Float64Array::from_iter(
            cells.iter().map(|c| c.distance),
        )));
        columns.push(Arc::new(Float64Array::from_iter(
            cells.iter().map(|c| c.threshold),
        )));
        columns.push(Arc::new(BooleanArray::from_iter(
            cells.iter().map(|c| c.flag),
        )));
        columns.push(Arc::new(Float64Array::from_iter(cells.iter().map(|c| c.z))));
        columns.push(Arc::new(BooleanArray::from_iter(
            cells.iter().map(|c| c.z_flag),
        )));
    }

    RecordBatch::try_new(Arc::new(schema.clone()), columns).map_err(|e| IoError::Parquet {
        reason: e.to_string(),
    })
}

/// Converts baseline rows into an Arrow [`RecordBatch`] matching
/// [`baseline_schema`].
pub(crate) fn baseline_to_record_batch(
    rows: &[BaselineRow],
    schema: &Schema,
) -> Result<RecordBatch, IoError> {
    let province: ArrayRef = Arc::new(StringArray::from_iter_values(
        rows.iter().map(|r| r.unit.province.as_str()),
    ));
    let district: ArrayRef = Arc::new(StringArray::from_iter_values(
        rows.iter().map(|r| r.unit.district.as_str()),
    ));
    let subdistrict: ArrayRef = Arc::new(StringArray::from_iter_values(
        rows.iter().map(|r| r.unit.subdistrict.as_str()),
    ));
    let variable: ArrayRef = Arc::new(StringArray::from_iter_values(
        rows.iter().map(|r| r.variable.as_str()),
    ));
    let month: ArrayRef = Arc::new(UInt8Array::from_iter_values(rows.iter().map(|r| r.month)));
    let value: ArrayRef = Arc::new(Float64Array::from_iter(rows.iter().map(|r| r.value)));

    RecordBatch::try_new(
        Arc::new(schema.clone()),
        vec![province, district, subdistrict, variable, month, value],
    )
    .map_err(|e| IoError::Parquet {
        reason: e.to_string(),
    })
}

/// Writes a sequence of [`RecordBatch`]es to a Parquet file at `path`.
///
/// # Errors
///
/// Returns [`IoError::Parquet`] if file creation, batch writing, or file
/// finalisation fails.
pub(crate) fn write_batches(
    path: &Path,
    batches: &[RecordBatch],
    schema: &Schema,
    props: WriterProperties,
) -> Result<(), IoError> {
    let file = std::fs::File::create(path).map_err(|e| IoError::Parquet {
        reason: e.to_string(),
    })?;
    let mut writer = ArrowWriter::try_new(file, Arc::new(schema.clone()), Some(props))?;

    for batch in batches {
        writer.write(batch)?;
    }

    writer.close()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use arrow::array::Array;

    use super::*;
    use crate::record::{ScoreCells, UnitKey};

    fn unit() -> UnitKey {
        UnitKey::new("KHON KAEN", "MUEANG", "BAN PET")
    }

    #[test]
    fn cleaned_schema_shape() {
        let schema = cleaned_schema();
        assert_eq!(schema.fields().len(), 6);
        assert_eq!(schema.field(0).name(), "province");
        assert_eq!(schema.field(4).name(), "month");
        assert!(schema.field(5).is_nullable());
        assert!(!schema.field(0).is_nullable());
    }

    #[test]
    fn anomaly_schema_has_five_cells_per_variable() {
        let schema = anomaly_schema();
        assert_eq!(schema.fields().len(), 4 + 5 * 5);
        assert_eq!(schema.field(4).name(), "dtw_ndvi");
        assert_eq!(schema.field(5).name(), "dtw_ndvi_threshold");
        assert_eq!(schema.field(6).name(), "dtw_ndvi_flag");
        assert_eq!(schema.field(7).name(), "dtw_ndvi_z");
        assert_eq!(schema.field(8).name(), "dtw_ndvi_z_flag");
        assert_eq!(schema.field(9).name(), "dtw_lst");
    }

    #[test]
    fn cleaned_batch_roundtrips_nulls() {
        let rows = vec![
            Observation {
                unit: unit(),
                variable: Variable::Ndvi,
                year: 2020,
                month: 1,
                value: Some(0.41),
            },
            Observation {
                unit: unit(),
                variable: Variable::Ndvi,
                year: 2020,
                month: 2,
                value: None,
            },
        ];
        let schema = cleaned_schema();
        let batch = cleaned_to_record_batch(&rows, &schema).unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 6);
        assert!(batch.column(5).is_null(1));
        assert!(!batch.column(5).is_null(0));
    }

    #[test]
    fn anomaly_batch_missing_variable_is_null() {
        let mut scores = BTreeMap::new();
        scores.insert(
            Variable::Ndvi,
            ScoreCells {
                distance: Some(1.5),
                threshold: Some(2.0),
                flag: Some(false),
                z: Some(0.3),
                z_flag: Some(false),
            },
        );
        let rows = vec![AnomalyRow {
            unit: unit(),
            year: 2021,
            scores,
        }];
        let schema = anomaly_schema();
        let batch = anomaly_to_record_batch(&rows, &schema).unwrap();
        assert_eq!(batch.num_rows(), 1);
        // NDVI cells present, LST cells null.
        assert!(!batch.column(4).is_null(0));
        assert!(batch.column(9).is_null(0));
    }

    #[test]
    fn baseline_batch_shape() {
        let rows = vec![BaselineRow {
            unit: unit(),
            variable: Variable::Lst,
            month: 7,
            value: Some(31.5),
        }];
        let schema = baseline_schema();
        let batch = baseline_to_record_batch(&rows, &schema).unwrap();
        assert_eq!(batch.num_rows(), 1);
        assert_eq!(batch.num_columns(), 6);
    }
}
