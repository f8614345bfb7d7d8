//! Continuous Ranked Probability Score for ensemble forecasts.

use mosx_io::{Ensemble, Matrix};

use crate::error::EvaluateError;

/// CRPS of one ensemble against one observation.
///
/// Uses the energy form `mean|xᵢ − y| − ½·mean|xᵢ − xⱼ|`, evaluating the
/// pairwise term from the sorted members in `O(M log M)`. Returns NaN for an
/// empty ensemble.
pub fn crps_ensemble(observation: f64, members: &[f64]) -> f64 {
    let m = members.len();
    if m == 0 {
        return f64::NAN;
    }
    let mf = m as f64;
    let skill = members.iter().map(|x| (x - observation).abs()).sum::<f64>() / mf;

    // Σᵢⱼ |xᵢ − xⱼ| = 2 Σᵢ (2i − M + 1) x₍ᵢ₎ over ascending order statistics.
    let sorted = mosx_stats::sorted(members);
    let spread: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, x)| (2.0 * i as f64 - mf + 1.0) * x)
        .sum::<f64>()
        / (mf * mf);

    skill - spread
}

/// Mean CRPS over cases, one value per target.
///
/// # Errors
///
/// Returns [`EvaluateError::ShapeMismatch`] if `truth` does not match the
/// ensemble's `(n_cases, n_targets)`.
pub fn mean_crps(truth: &Matrix, ensemble: &Ensemble) -> Result<Vec<f64>, EvaluateError> {
    let expected = (ensemble.n_cases(), ensemble.n_targets());
    if truth.shape() != expected {
        return Err(EvaluateError::ShapeMismatch {
            what: "crps truth".to_string(),
            expected,
            got: truth.shape(),
        });
    }
    Ok((0..ensemble.n_targets())
        .map(|t| {
            let per_case: Vec<f64> = (0..ensemble.n_cases())
                .map(|c| crps_ensemble(truth.get(c, t), ensemble.members(c, t)))
                .collect();
            if per_case.is_empty() {
                f64::NAN
            } else {
                mosx_stats::mean(&per_case)
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn brute_force(y: f64, xs: &[f64]) -> f64 {
        let m = xs.len() as f64;
        let a = xs.iter().map(|x| (x - y).abs()).sum::<f64>() / m;
        let mut b = 0.0;
        for xi in xs {
            for xj in xs {
                b += (xi - xj).abs();
            }
        }
        a - 0.5 * b / (m * m)
    }

    #[test]
    fn single_member_is_absolute_error() {
        assert_relative_eq!(crps_ensemble(3.0, &[5.5]), 2.5, epsilon = 1e-12);
    }

    #[test]
    fn matches_pairwise_definition() {
        let xs = [2.0, -1.0, 4.5, 0.5, 3.0, 3.0];
        for y in [-2.0, 0.0, 2.2, 10.0] {
            assert_relative_eq!(crps_ensemble(y, &xs), brute_force(y, &xs), epsilon = 1e-12);
        }
    }

    #[test]
    fn perfect_degenerate_ensemble_scores_zero() {
        assert_relative_eq!(crps_ensemble(1.0, &[1.0, 1.0, 1.0]), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn empty_ensemble_is_nan() {
        assert!(crps_ensemble(1.0, &[]).is_nan());
    }

    #[test]
    fn mean_crps_per_target() {
        let ens = Ensemble::new(2, 1, 2, vec![0.0, 2.0, 1.0, 1.0]).unwrap();
        let truth = Matrix::new(2, 1, vec![1.0, 3.0]).unwrap();
        let scores = mean_crps(&truth, &ens).unwrap();
        // case 0: 1 - 0.5 = 0.5; case 1: 2 - 0 = 2
        assert_relative_eq!(scores[0], 1.25, epsilon = 1e-12);
    }

    #[test]
    fn mean_crps_rejects_shape_mismatch() {
        let ens = Ensemble::new(2, 1, 2, vec![0.0; 4]).unwrap();
        assert!(mean_crps(&Matrix::zeros(3, 1), &ens).is_err());
    }
}
