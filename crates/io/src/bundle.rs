//! Predictor bundle: the `BUFKIT`, `OBS` and `VERIF` column groups.

use std::fmt;

use tracing::debug;

use crate::error::IoError;
use crate::matrix::Matrix;

/// Number of verification targets scored: High, Low, Wind, Rain.
pub const N_TARGETS: usize = 4;

/// Display names of the verification targets, in `VERIF` column order.
pub const TARGET_NAMES: [&str; N_TARGETS] = ["High", "Low", "Wind", "Rain"];

/// Column index of the rain target within `VERIF`.
pub const RAIN_INDEX: usize = 3;

/// One of the three column groups stored in a predictor bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Group {
    /// Model sounding (BUFKIT) predictors.
    Bufkit,
    /// Surface observation predictors.
    Obs,
    /// Verification targets.
    Verif,
}

impl Group {
    /// All groups, in storage order.
    pub const ALL: [Group; 3] = [Group::Bufkit, Group::Obs, Group::Verif];

    /// Key used for this group in bundle files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bufkit => "BUFKIT",
            Self::Obs => "OBS",
            Self::Verif => "VERIF",
        }
    }

    /// Parses a group key.
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "BUFKIT" => Some(Self::Bufkit),
            "OBS" => Some(Self::Obs),
            "VERIF" => Some(Self::Verif),
            _ => None,
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named columns of one group.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnGroup {
    names: Vec<String>,
    values: Matrix,
}

impl ColumnGroup {
    /// Creates a column group.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::DimensionMismatch`] if the number of names does not
    /// match the number of matrix columns.
    pub fn new(names: Vec<String>, values: Matrix) -> Result<Self, IoError> {
        if names.len() != values.n_cols() {
            return Err(IoError::DimensionMismatch {
                name: "column names".to_string(),
                expected: values.n_cols(),
                got: names.len(),
            });
        }
        Ok(Self { names, values })
    }

    /// Creates a column group with generated names `col0`, `col1`, ...
    pub fn unnamed(values: Matrix) -> Self {
        let names = (0..values.n_cols()).map(|i| format!("col{i}")).collect();
        Self { names, values }
    }

    /// Column names.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Column values.
    pub fn values(&self) -> &Matrix {
        &self.values
    }

    /// Position of the column called `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    fn slice_rows(&self, start: usize, end: usize) -> Self {
        Self {
            names: self.names.clone(),
            values: self.values.slice_rows(start, end),
        }
    }
}

/// The three aligned column groups read from a predictor file.
///
/// Invariants: all groups have the same number of rows, and `VERIF` has at
/// least [`N_TARGETS`] columns.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictorBundle {
    bufkit: ColumnGroup,
    obs: ColumnGroup,
    verif: ColumnGroup,
}

impl PredictorBundle {
    /// Creates a bundle, validating row alignment and `VERIF` width.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Validation`] listing every failed check.
    pub fn new(bufkit: ColumnGroup, obs: ColumnGroup, verif: ColumnGroup) -> Result<Self, IoError> {
        let n = verif.values.n_rows();
        let mut problems = Vec::new();
        if bufkit.values.n_rows() != n {
            problems.push(format!(
                "BUFKIT has {} rows, VERIF has {n}",
                bufkit.values.n_rows()
            ));
        }
        if obs.values.n_rows() != n {
            problems.push(format!("OBS has {} rows, VERIF has {n}", obs.values.n_rows()));
        }
        if verif.values.n_cols() < N_TARGETS {
            problems.push(format!(
                "VERIF needs at least {N_TARGETS} columns [High, Low, Wind, Rain], got {}",
                verif.values.n_cols()
            ));
        }
        if !problems.is_empty() {
            return Err(IoError::Validation {
                count: problems.len(),
                details: problems.join("; "),
            });
        }
        Ok(Self { bufkit, obs, verif })
    }

    /// Number of cases (rows).
    pub fn n_cases(&self) -> usize {
        self.verif.values.n_rows()
    }

    /// Borrow one group.
    pub fn group(&self, group: Group) -> &ColumnGroup {
        match group {
            Group::Bufkit => &self.bufkit,
            Group::Obs => &self.obs,
            Group::Verif => &self.verif,
        }
    }

    /// Number of predictor columns (`BUFKIT` + `OBS`).
    pub fn n_predictors(&self) -> usize {
        self.bufkit.values.n_cols() + self.obs.values.n_cols()
    }

    /// `BUFKIT` and `OBS` concatenated column-wise.
    pub fn predictors(&self) -> Matrix {
        // Row counts are validated in `new`.
        self.bufkit
            .values
            .hstack(&self.obs.values)
            .unwrap_or_else(|_| unreachable!("groups share a row count"))
    }

    /// Predictor column names, qualified as `GROUP/name`.
    pub fn predictor_names(&self) -> Vec<String> {
        self.bufkit
            .names
            .iter()
            .map(|n| format!("{}/{n}", Group::Bufkit))
            .chain(self.obs.names.iter().map(|n| format!("{}/{n}", Group::Obs)))
            .collect()
    }

    /// Index into [`predictors`](Self::predictors) of a column named either
    /// `GROUP/name` or a bare `name` (searched in `BUFKIT` then `OBS`).
    pub fn predictor_index(&self, name: &str) -> Option<usize> {
        if let Some((group, col)) = name.split_once('/') {
            return match Group::parse(group)? {
                Group::Bufkit => self.bufkit.position(col),
                Group::Obs => self.obs.position(col).map(|i| i + self.bufkit.values.n_cols()),
                Group::Verif => None,
            };
        }
        self.bufkit.position(name).or_else(|| {
            self.obs
                .position(name)
                .map(|i| i + self.bufkit.values.n_cols())
        })
    }

    /// The full verification matrix.
    pub fn verif(&self) -> &Matrix {
        &self.verif.values
    }

    /// The first [`N_TARGETS`] verification columns: High, Low, Wind, Rain.
    pub fn targets(&self) -> Matrix {
        self.verif
            .values
            .leading_columns(N_TARGETS)
            .unwrap_or_else(|_| unreachable!("VERIF width is validated in `new`"))
    }

    /// Rows `start..end` of every group.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds.
    pub fn slice_rows(&self, start: usize, end: usize) -> Self {
        Self {
            bufkit: self.bufkit.slice_rows(start, end),
            obs: self.obs.slice_rows(start, end),
            verif: self.verif.slice_rows(start, end),
        }
    }
}

/// Concatenate a training bundle and a test bundle row-wise.
///
/// Training rows come first, so the test cases occupy the final rows of the
/// combined bundle. When `return_count_test` is set, the number of test rows
/// is returned alongside.
///
/// # Errors
///
/// Returns [`IoError::Validation`] if the two bundles do not share the same
/// column names in every group.
pub fn combine_train_test(
    train: &PredictorBundle,
    test: &PredictorBundle,
    return_count_test: bool,
) -> Result<(PredictorBundle, Option<usize>), IoError> {
    let mut mismatches = Vec::new();
    for group in Group::ALL {
        if train.group(group).names != test.group(group).names {
            mismatches.push(format!("{group} columns differ between train and test"));
        }
    }
    if !mismatches.is_empty() {
        return Err(IoError::Validation {
            count: mismatches.len(),
            details: mismatches.join("; "),
        });
    }

    let stack = |a: &ColumnGroup, b: &ColumnGroup| -> Result<ColumnGroup, IoError> {
        Ok(ColumnGroup {
            names: a.names.clone(),
            values: a.values.vstack(&b.values)?,
        })
    };

    let combined = PredictorBundle::new(
        stack(&train.bufkit, &test.bufkit)?,
        stack(&train.obs, &test.obs)?,
        stack(&train.verif, &test.verif)?,
    )?;

    debug!(
        n_train = train.n_cases(),
        n_test = test.n_cases(),
        "combined train and test bundles"
    );

    Ok((combined, return_count_test.then_some(test.n_cases())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(names: &[&str], n_rows: usize, offset: f64) -> ColumnGroup {
        let n_cols = names.len();
        let data = (0..n_rows * n_cols).map(|i| i as f64 + offset).collect();
        ColumnGroup::new(
            names.iter().map(|s| s.to_string()).collect(),
            Matrix::new(n_rows, n_cols, data).unwrap(),
        )
        .unwrap()
    }

    fn bundle(n_rows: usize, offset: f64) -> PredictorBundle {
        PredictorBundle::new(
            group(&["t850", "qpf_gfs"], n_rows, offset),
            group(&["temp"], n_rows, offset + 100.0),
            group(&["high", "low", "wind", "rain"], n_rows, offset + 200.0),
        )
        .unwrap()
    }

    #[test]
    fn group_keys_round_trip() {
        for g in Group::ALL {
            assert_eq!(Group::parse(g.as_str()), Some(g));
        }
        assert_eq!(Group::parse("FOO"), None);
    }

    #[test]
    fn column_group_name_count_checked() {
        let err = ColumnGroup::new(vec!["a".to_string()], Matrix::zeros(2, 2)).unwrap_err();
        assert!(matches!(err, IoError::DimensionMismatch { .. }));
    }

    #[test]
    fn predictors_concatenate_bufkit_and_obs() {
        let b = bundle(3, 0.0);
        let p = b.predictors();
        assert_eq!(p.shape(), (3, 3));
        assert_eq!(p.row(0), &[0.0, 1.0, 100.0]);
        assert_eq!(
            b.predictor_names(),
            vec!["BUFKIT/t850", "BUFKIT/qpf_gfs", "OBS/temp"]
        );
    }

    #[test]
    fn predictor_index_lookup() {
        let b = bundle(2, 0.0);
        assert_eq!(b.predictor_index("qpf_gfs"), Some(1));
        assert_eq!(b.predictor_index("OBS/temp"), Some(2));
        assert_eq!(b.predictor_index("BUFKIT/temp"), None);
        assert_eq!(b.predictor_index("VERIF/high"), None);
        assert_eq!(b.predictor_index("missing"), None);
    }

    #[test]
    fn targets_shape() {
        let b = bundle(5, 0.0);
        assert_eq!(b.targets().shape(), (5, N_TARGETS));
    }

    #[test]
    fn new_rejects_misaligned_and_narrow() {
        let err = PredictorBundle::new(
            group(&["a"], 3, 0.0),
            group(&["b"], 2, 0.0),
            group(&["high", "low", "wind"], 3, 0.0),
        )
        .unwrap_err();
        match err {
            IoError::Validation { count, details } => {
                assert_eq!(count, 2);
                assert!(details.contains("OBS has 2 rows"));
                assert!(details.contains("at least 4 columns"));
            }
            other => panic!("expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn combine_train_test_appends_test_rows() {
        let train = bundle(4, 0.0);
        let test = bundle(2, 1000.0);
        let (combined, count) = combine_train_test(&train, &test, true).unwrap();
        assert_eq!(combined.n_cases(), 6);
        assert_eq!(count, Some(2));
        assert_eq!(combined.verif().row(4), test.verif().row(0));

        let (_, none) = combine_train_test(&train, &test, false).unwrap();
        assert_eq!(none, None);
    }

    #[test]
    fn combine_train_test_rejects_different_columns() {
        let train = bundle(2, 0.0);
        let test = PredictorBundle::new(
            group(&["t850", "qpf_nam"], 2, 0.0),
            group(&["temp"], 2, 0.0),
            group(&["high", "low", "wind", "rain"], 2, 0.0),
        )
        .unwrap();
        let err = combine_train_test(&train, &test, true).unwrap_err();
        assert!(err.to_string().contains("BUFKIT columns differ"));
    }
}
