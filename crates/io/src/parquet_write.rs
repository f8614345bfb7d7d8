//! Low-level Parquet column building.

use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, RecordBatch};
use arrow::datatypes::{DataType, Field, Schema};
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;

use crate::bundle::{Group, PredictorBundle};
use crate::error::IoError;

/// Builds the Arrow schema for a predictor bundle.
///
/// Columns are laid out `BUFKIT`, `OBS`, `VERIF`, each named `GROUP/name`.
pub(crate) fn build_schema(bundle: &PredictorBundle) -> Schema {
    let fields: Vec<Field> = Group::ALL
        .iter()
        .flat_map(|&g| {
            bundle
                .group(g)
                .names()
                .iter()
                .map(move |n| Field::new(format!("{g}/{n}"), DataType::Float64, false))
        })
        .collect();
    Schema::new(fields)
}

/// Converts a bundle into a single Arrow [`RecordBatch`] matching
/// [`build_schema`].
pub(crate) fn bundle_to_record_batch(
    bundle: &PredictorBundle,
    schema: &Schema,
) -> Result<RecordBatch, IoError> {
    let columns: Vec<ArrayRef> = Group::ALL
        .iter()
        .flat_map(|&g| {
            let values = bundle.group(g).values();
            (0..values.n_cols())
                .map(|c| Arc::new(Float64Array::from(values.column(c))) as ArrayRef)
                .collect::<Vec<_>>()
        })
        .collect();

    RecordBatch::try_new(Arc::new(schema.clone()), columns).map_err(|e| IoError::Parquet {
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
    use super::*;
    use crate::bundle::ColumnGroup;
    use crate::matrix::Matrix;

    fn bundle() -> PredictorBundle {
        PredictorBundle::new(
            ColumnGroup::new(vec!["t850".into()], Matrix::new(2, 1, vec![1.0, 2.0]).unwrap())
                .unwrap(),
            ColumnGroup::unnamed(Matrix::zeros(2, 0)),
            ColumnGroup::unnamed(Matrix::filled(2, 4, 5.0)),
        )
        .unwrap()
    }

    #[test]
    fn schema_orders_groups() {
        let schema = build_schema(&bundle());
        assert_eq!(schema.fields().len(), 5);
        assert_eq!(schema.field(0).name(), "BUFKIT/t850");
        assert_eq!(schema.field(1).name(), "VERIF/col0");
        assert_eq!(schema.field(4).name(), "VERIF/col3");
    }

    #[test]
    fn record_batch_shape() {
        let b = bundle();
        let schema = build_schema(&b);
        let batch = bundle_to_record_batch(&b, &schema).unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 5);
    }
}
