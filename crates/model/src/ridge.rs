//! Single ridge regression member.

use mosx_io::Matrix;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Scale used for constant predictors so standardisation stays finite.
const MIN_SCALE: f64 = 1e-12;

/// A multi-output ridge regression fitted on standardised features.
///
/// `coef` is stored row-major with one row per feature and one column per
/// target.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RidgeMember {
    means: Vec<f64>,
    scales: Vec<f64>,
    intercept: Vec<f64>,
    coef: Vec<f64>,
}

impl RidgeMember {
    /// Fits on the rows of `x` and `y` selected by `rows`.
    ///
    /// Features are standardised with the sample mean and population standard
    /// deviation, targets are centred, and `(XᵀX + αI) W = XᵀY` is solved by
    /// Cholesky decomposition.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Validation`] if `rows` is empty or `x`/`y` row
    /// counts differ, and [`ModelError::Singular`] if the system is not
    /// positive definite (only possible with `alpha == 0`).
    pub fn fit(x: &Matrix, y: &Matrix, rows: &[usize], alpha: f64) -> Result<Self, ModelError> {
        if x.n_rows() != y.n_rows() {
            return Err(ModelError::Validation {
                count: 1,
                details: format!(
                    "predictors have {} rows, targets have {}",
                    x.n_rows(),
                    y.n_rows()
                ),
            });
        }
        if rows.is_empty() {
            return Err(ModelError::Validation {
                count: 1,
                details: "cannot fit on zero rows".to_string(),
            });
        }

        let n = rows.len();
        let p = x.n_cols();
        let t = y.n_cols();

        let mut means = vec![0.0; p];
        let mut scales = vec![1.0; p];
        for c in 0..p {
            let col: Vec<f64> = rows.iter().map(|&r| x.get(r, c)).collect();
            means[c] = mosx_stats::mean(&col);
            let sd = mosx_stats::population_sd(&col);
            scales[c] = if sd > MIN_SCALE { sd } else { 1.0 };
        }

        let mut intercept = vec![0.0; t];
        for (c, value) in intercept.iter_mut().enumerate() {
            let col: Vec<f64> = rows.iter().map(|&r| y.get(r, c)).collect();
            *value = mosx_stats::mean(&col);
        }

        let xs = Array2::from_shape_fn((n, p), |(i, c)| (x.get(rows[i], c) - means[c]) / scales[c]);
        let ys = Array2::from_shape_fn((n, t), |(i, c)| y.get(rows[i], c) - intercept[c]);

        let mut gram = xs.t().dot(&xs);
        for i in 0..p {
            gram[[i, i]] += alpha;
        }
        let rhs = xs.t().dot(&ys);

        let weights = if p == 0 {
            Array2::zeros((0, t))
        } else {
            let l = cholesky(&gram).ok_or_else(|| ModelError::Singular {
                reason: format!("normal equations with {p} features are not positive definite"),
            })?;
            cholesky_solve(&l, &rhs)
        };

        Ok(Self {
            means,
            scales,
            intercept,
            coef: weights.iter().copied().collect(),
        })
    }

    /// Number of input features.
    pub fn n_features(&self) -> usize {
        self.means.len()
    }

    /// Number of outputs.
    pub fn n_targets(&self) -> usize {
        self.intercept.len()
    }

    /// Predicts every output for one case into `out`.
    ///
    /// # Panics
    ///
    /// Panics if `features` or `out` have the wrong length.
    pub fn predict_row(&self, features: &[f64], out: &mut [f64]) {
        let t = self.n_targets();
        assert_eq!(features.len(), self.n_features(), "feature length mismatch");
        assert_eq!(out.len(), t, "output length mismatch");
        out.copy_from_slice(&self.intercept);
        for (f, &value) in features.iter().enumerate() {
            let z = (value - self.means[f]) / self.scales[f];
            let row = &self.coef[f * t..(f + 1) * t];
            for (o, w) in out.iter_mut().zip(row) {
                *o += z * w;
            }
        }
    }

    /// Predicts every case of `x`.
    pub fn predict(&self, x: &Matrix) -> Result<Matrix, ModelError> {
        if x.n_cols() != self.n_features() {
            return Err(ModelError::FeatureMismatch {
                expected: self.n_features(),
                got: x.n_cols(),
            });
        }
        let t = self.n_targets();
        let mut data = vec![0.0; x.n_rows() * t];
        for r in 0..x.n_rows() {
            self.predict_row(x.row(r), &mut data[r * t..(r + 1) * t]);
        }
        Ok(Matrix::new(x.n_rows(), t, data)?)
    }

    /// Checks the stored arrays for consistent lengths.
    pub(crate) fn is_consistent(&self) -> bool {
        self.scales.len() == self.means.len()
            && self.coef.len() == self.means.len() * self.intercept.len()
    }
}

/// Lower-triangular Cholesky factor of a symmetric positive-definite matrix.
///
/// Returns `None` if a non-positive pivot is encountered.
fn cholesky(a: &Array2<f64>) -> Option<Array2<f64>> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[[i, j]];
            for k in 0..j {
                sum -= l[[i, k]] * l[[j, k]];
            }
            if i == j {
                if sum <= 0.0 || !sum.is_finite() {
                    return None;
                }
                l[[i, i]] = sum.sqrt();
            } else {
                l[[i, j]] = sum / l[[j, j]];
            }
        }
    }
    Some(l)
}

/// Solves `L Lᵀ X = B` for every column of `B`.
fn cholesky_solve(l: &Array2<f64>, b: &Array2<f64>) -> Array2<f64> {
    let n = l.nrows();
    let mut x = b.clone();
    for col in 0..b.ncols() {
        // Forward substitution: L z = b.
        for i in 0..n {
            let mut sum = x[[i, col]];
            for k in 0..i {
                sum -= l[[i, k]] * x[[k, col]];
            }
            x[[i, col]] = sum / l[[i, i]];
        }
        // Back substitution: Lᵀ w = z.
        for i in (0..n).rev() {
            let mut sum = x[[i, col]];
            for k in (i + 1)..n {
                sum -= l[[k, i]] * x[[k, col]];
            }
            x[[i, col]] = sum / l[[i, i]];
        }
    }
    x
}
