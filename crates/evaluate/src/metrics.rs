//! Accuracy and skill metrics.
//!
//! Regression metrics follow the usual conventions for constant truth:
//! explained variance and R² are 1.0 for a perfect forecast and 0.0
//! otherwise, rather than dividing by zero.

use mosx_io::{Ensemble, Matrix};

use crate::error::EvaluateError;

/// `1 - Var(y - ŷ) / Var(y)` with population variances.
///
/// Returns NaN for empty input.
pub fn explained_variance(truth: &[f64], predicted: &[f64]) -> f64 {
    if truth.is_empty() {
        return f64::NAN;
    }
    let residuals: Vec<f64> = truth.iter().zip(predicted).map(|(y, p)| y - p).collect();
    let numerator = mosx_stats::population_variance(&residuals);
    let denominator = mosx_stats::population_variance(truth);
    let scale = truth.iter().map(|y| y * y).sum::<f64>() / truth.len() as f64;
    force_finite(numerator, denominator, scale)
}

/// Mean absolute error. Returns NaN for empty input.
pub fn mean_absolute_error(truth: &[f64], predicted: &[f64]) -> f64 {
    if truth.is_empty() {
        return f64::NAN;
    }
    let abs: Vec<f64> = truth.iter().zip(predicted).map(|(y, p)| (y - p).abs()).collect();
    mosx_stats::mean(&abs)
}

/// Mean squared error. Returns NaN for empty input.
pub fn mean_squared_error(truth: &[f64], predicted: &[f64]) -> f64 {
    if truth.is_empty() {
        return f64::NAN;
    }
    let sq: Vec<f64> = truth
        .iter()
        .zip(predicted)
        .map(|(y, p)| (y - p) * (y - p))
        .collect();
    mosx_stats::mean(&sq)
}

/// Coefficient of determination `1 - SS_res / SS_tot`.
///
/// Returns NaN for empty input.
pub fn r2_score(truth: &[f64], predicted: &[f64]) -> f64 {
    if truth.is_empty() {
        return f64::NAN;
    }
    let m = mosx_stats::mean(truth);
    let ss_res: f64 = truth.iter().zip(predicted).map(|(y, p)| (y - p) * (y - p)).sum();
    let ss_tot: f64 = truth.iter().map(|y| (y - m) * (y - m)).sum();
    let scale: f64 = truth.iter().map(|y| y * y).sum();
    force_finite(ss_res, ss_tot, scale)
}

/// `1 - numerator / denominator`, with a zero denominator mapped to 1.0
/// for a zero numerator and 0.0 otherwise.
///
/// `scale` is the matching sum or mean of `y²`. A denominator within
/// rounding of zero relative to it counts as zero, so a constant truth
/// whose mean is not exactly representable still takes the fallback.
fn force_finite(numerator: f64, denominator: f64, scale: f64) -> f64 {
    let zero = f64::EPSILON * scale;
    if denominator <= zero {
        if numerator <= zero { 1.0 } else { 0.0 }
    } else {
        1.0 - numerator / denominator
    }
}

/// One-hot encode class labels into an `n × n_classes` indicator matrix.
///
/// Labels are rounded to the nearest integer; labels outside
/// `0..n_classes` produce an all-zero row.
pub fn label_binarize(labels: &[f64], n_classes: usize) -> Matrix {
    let mut out = Matrix::zeros(labels.len(), n_classes);
    for (r, &label) in labels.iter().enumerate() {
        if !label.is_finite() || label < -0.5 {
            continue;
        }
        let k = label.round() as usize;
        if k < n_classes {
            out.set(r, k, 1.0);
        }
    }
    out
}

/// Multi-category Brier score: mean over cases of the summed squared
/// difference between probability vectors.
///
/// The narrower input is padded with zero columns to the width of the wider
/// one, so a forecast over `K` classes can be scored against indicators that
/// omit trailing classes.
///
/// # Errors
///
/// Returns [`EvaluateError::ShapeMismatch`] if row counts differ, and
/// [`EvaluateError::Validation`] for zero rows.
pub fn brier_score(x: &Matrix, y: &Matrix) -> Result<f64, EvaluateError> {
    if x.n_rows() != y.n_rows() {
        return Err(EvaluateError::ShapeMismatch {
            what: "brier score inputs".to_string(),
            expected: x.shape(),
            got: y.shape(),
        });
    }
    if x.n_rows() == 0 {
        return Err(EvaluateError::Validation {
            count: 1,
            details: "brier score needs at least one case".to_string(),
        });
    }
    let width = x.n_cols().max(y.n_cols());
    let padded = |m: &Matrix, r: usize, c: usize| if c < m.n_cols() { m.get(r, c) } else { 0.0 };

    let mut total = 0.0;
    for r in 0..x.n_rows() {
        for c in 0..width {
            let d = padded(x, r, c) - padded(y, r, c);
            total += d * d;
        }
    }
    Ok(total / x.n_rows() as f64)
}

/// Mean over cases of the population variance across ensemble members, one
/// value per target.
pub fn mean_variance(ensemble: &Ensemble) -> Vec<f64> {
    (0..ensemble.n_targets())
        .map(|t| {
            let per_case: Vec<f64> = (0..ensemble.n_cases())
                .map(|c| mosx_stats::population_variance(ensemble.members(c, t)))
                .collect();
            if per_case.is_empty() {
                f64::NAN
            } else {
                mosx_stats::mean(&per_case)
            }
        })
        .collect()
}
