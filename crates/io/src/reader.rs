//! Reading predictor bundles from Parquet.

use std::path::Path;

use tracing::{debug, info};

use crate::bundle::{ColumnGroup, Group, PredictorBundle};
use crate::error::IoError;
use crate::matrix::Matrix;
use crate::parquet_read;

/// Read a predictor bundle from a Parquet file.
///
/// Columns must be `Float64` and named `BUFKIT/<name>`, `OBS/<name>` or
/// `VERIF/<name>`. `BUFKIT` and `OBS` may be absent; `VERIF` must carry at
/// least the four target columns.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] if `path` does not exist,
/// [`IoError::EmptyBundle`] if it holds no rows, [`IoError::Parquet`] on
/// read failures, and [`IoError::Validation`] if the file does not follow
/// the bundle layout.
pub fn read_bundle(path: &Path) -> Result<PredictorBundle, IoError> {
    info!(path = %path.display(), "reading predictor bundle");
    let batches = parquet_read::read_batches(path)?;

    let n_rows: usize = batches.iter().map(|b| b.num_rows()).sum();
    let Some(first) = batches.first().filter(|_| n_rows > 0) else {
        return Err(IoError::EmptyBundle {
            path: path.to_path_buf(),
        });
    };
    let slots = parquet_read::validate_schema(first)?;
    let mut groups = parquet_read::collect_columns(&batches, &slots);

    let mut take = |group: Group| -> Result<ColumnGroup, IoError> {
        let (names, columns) = groups.remove(&group).unwrap_or_default();
        ColumnGroup::new(names, Matrix::from_columns(n_rows, &columns)?)
    };
    let bufkit = take(Group::Bufkit)?;
    let obs = take(Group::Obs)?;
    let verif = take(Group::Verif)?;

    debug!(
        n_rows,
        n_bufkit = bufkit.names().len(),
        n_obs = obs.names().len(),
        n_verif = verif.names().len(),
        "bundle columns collected"
    );

    PredictorBundle::new(bufkit, obs, verif)
}
