//! Low-level Parquet reading and column extraction.

use std::collections::BTreeMap;
use std::path::Path;

use arrow::array::{AsArray, RecordBatch};
use arrow::datatypes::{DataType, Float64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::bundle::Group;
use crate::error::IoError;

/// Where one file column lands in the bundle.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ColumnSlot {
    pub group: Group,
    pub name: String,
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

    let batches: Vec<RecordBatch> = reader.collect::<Result<Vec<_>, _>>()?;

    Ok(batches)
}

/// Validates the schema of a record batch against the bundle layout.
///
/// Every column must be `Float64` and named `GROUP/name` with `GROUP` one of
/// `BUFKIT`, `OBS`, `VERIF`. Returns one [`ColumnSlot`] per column, in file
/// order.
///
/// # Errors
///
/// Returns [`IoError::Validation`] listing every offending column.
pub(crate) fn validate_schema(batch: &RecordBatch) -> Result<Vec<ColumnSlot>, IoError> {
    let schema = batch.schema();
    let mut slots = Vec::with_capacity(schema.fields().len());
    let mut mismatches: Vec<String> = Vec::new();

    for (i, field) in schema.fields().iter().enumerate() {
        let name = field.name();
        if field.data_type() != &DataType::Float64 {
            mismatches.push(format!(
                "column {i} '{name}': expected Float64, got {}",
                field.data_type()
            ));
            continue;
        }
        match name.split_once('/').and_then(|(g, c)| Some((Group::parse(g)?, c))) {
            Some((group, col)) if !col.is_empty() => slots.push(ColumnSlot {
                group,
                name: col.to_string(),
            }),
            _ => mismatches.push(format!(
                "column {i} '{name}': expected BUFKIT/<name>, OBS/<name> or VERIF/<name>"
            )),
        }
    }

    if !mismatches.is_empty() {
        return Err(IoError::Validation {
            count: mismatches.len(),
            details: mismatches.join("; "),
        });
    }

    Ok(slots)
}

/// Gathers column values across batches, grouped by bundle group.
///
/// Nulls are read as NaN. Returns `group -> (names, columns)` with columns in
/// file order.
pub(crate) fn collect_columns(
    batches: &[RecordBatch],
    slots: &[ColumnSlot],
) -> BTreeMap<Group, (Vec<String>, Vec<Vec<f64>>)> {
    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); slots.len()];

    for batch in batches {
        for (i, values) in columns.iter_mut().enumerate() {
            let col = batch.column(i).as_primitive::<Float64Type>();
            values.extend(col.iter().map(|v| v.unwrap_or(f64::NAN)));
        }
    }

    let mut groups: BTreeMap<Group, (Vec<String>, Vec<Vec<f64>>)> = BTreeMap::new();
    for (slot, values) in slots.iter().zip(columns) {
        let entry = groups.entry(slot.group).or_default();
        entry.0.push(slot.name.clone());
        entry.1.push(values);
    }
    groups
}
