//! WxChallenge forecast-contest scoring.

use mosx_io::{Matrix, N_TARGETS};

use crate::error::ModelError;

/// Error points for a rain forecast off by `error` inches.
///
/// Charged per hundredth of an inch: 0.4 up to 0.10", 0.3 from 0.10" to
/// 0.25", 0.2 from 0.25" to 0.50", and 0.1 beyond.
pub fn rain_points(error: f64) -> f64 {
    let h = error.abs() * 100.0;
    0.4 * h.min(10.0)
        + 0.3 * (h - 10.0).clamp(0.0, 15.0)
        + 0.2 * (h - 25.0).clamp(0.0, 25.0)
        + 0.1 * (h - 50.0).max(0.0)
}

/// Mean WxChallenge error points per case.
///
/// Per case: one point per degree of high and low temperature error, half a
/// point per knot of wind error, plus [`rain_points`] for the rain error.
/// Both matrices must be `n_cases × 4` in `[High, Low, Wind, Rain]` order
/// (extra trailing columns in `truth` are ignored).
///
/// # Errors
///
/// Returns [`ModelError::Validation`] if shapes are incompatible or there are
/// no cases.
pub fn wxchallenge_error(predicted: &Matrix, truth: &Matrix) -> Result<f64, ModelError> {
    if predicted.n_rows() != truth.n_rows()
        || predicted.n_cols() < N_TARGETS
        || truth.n_cols() < N_TARGETS
    {
        return Err(ModelError::Validation {
            count: 1,
            details: format!(
                "cannot score forecast of shape {:?} against truth of shape {:?}",
                predicted.shape(),
                truth.shape()
            ),
        });
    }
    if predicted.n_rows() == 0 {
        return Err(ModelError::Validation {
            count: 1,
            details: "cannot score zero cases".to_string(),
        });
    }

    let total: f64 = predicted
        .rows()
        .zip(truth.rows())
        .map(|(p, t)| {
            (p[0] - t[0]).abs()
                + (p[1] - t[1]).abs()
                + 0.5 * (p[2] - t[2]).abs()
                + rain_points(p[3] - t[3])
        })
        .sum();
    Ok(total / predicted.n_rows() as f64)
}

/// Greater-is-better scorer: the negated [`wxchallenge_error`].
pub fn wxchallenge_scorer(predicted: &Matrix, truth: &Matrix) -> Result<f64, ModelError> {
    Ok(-wxchallenge_error(predicted, truth)?)
}
