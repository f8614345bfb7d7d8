//! Data behind the diagnostic figures: rank histograms, spread-skill and
//! error distributions. One result per target column.

use mosx_io::{Ensemble, Matrix};
use serde::Serialize;
use tracing::debug;

use crate::error::EvaluateError;

/// Ensemble spread against forecast skill for one target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpreadSkill {
    /// Per-case population variance across members.
    pub variance: Vec<f64>,
    /// Per-case squared error of the ensemble mean.
    pub squared_error: Vec<f64>,
    /// Mean variance of each equal-count bin, ordered by variance.
    pub binned_variance: Vec<f64>,
    /// Mean squared error of each bin.
    pub binned_squared_error: Vec<f64>,
}

/// A histogram over equal-width bins.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// `counts.len() + 1` bin edges.
    pub edges: Vec<f64>,
    pub counts: Vec<u64>,
    pub mean: f64,
    pub sd: f64,
}

fn check_truth(truth: &Matrix, ensemble: &Ensemble) -> Result<(), EvaluateError> {
    let expected = (ensemble.n_cases(), ensemble.n_targets());
    if truth.shape() != expected {
        return Err(EvaluateError::ShapeMismatch {
            what: "truth vs ensemble".to_string(),
            expected,
            got: truth.shape(),
        });
    }
    Ok(())
}

/// Counts, per target, how often the observation has rank `r`, where the
/// rank is the number of members strictly below the observation. Each
/// result has `n_members + 1` entries.
///
/// # Errors
///
/// Returns [`EvaluateError::ShapeMismatch`] if `truth` does not match the
/// ensemble.
pub fn rank_histogram(truth: &Matrix, ensemble: &Ensemble) -> Result<Vec<Vec<u64>>, EvaluateError> {
    check_truth(truth, ensemble)?;
    let m = ensemble.n_members();
    let mut out = vec![vec![0u64; m + 1]; ensemble.n_targets()];
    for (t, counts) in out.iter_mut().enumerate() {
        for c in 0..ensemble.n_cases() {
            let y = truth.get(c, t);
            if y.is_nan() {
                continue;
            }
            let rank = ensemble.members(c, t).iter().filter(|&&x| x < y).count();
            counts[rank] += 1;
        }
    }
    Ok(out)
}

/// Spread-skill data per target with `n_bins` equal-count variance bins.
///
/// # Errors
///
/// Returns [`EvaluateError::ShapeMismatch`] if `truth` does not match the
/// ensemble.
pub fn spread_skill(
    truth: &Matrix,
    ensemble: &Ensemble,
    n_bins: usize,
) -> Result<Vec<SpreadSkill>, EvaluateError> {
    check_truth(truth, ensemble)?;
    let mean = ensemble.mean();
    let out = (0..ensemble.n_targets())
        .map(|t| {
            let variance: Vec<f64> = (0..ensemble.n_cases())
                .map(|c| mosx_stats::population_variance(ensemble.members(c, t)))
                .collect();
            let squared_error: Vec<f64> = (0..ensemble.n_cases())
                .map(|c| {
                    let d = mean.get(c, t) - truth.get(c, t);
                    d * d
                })
                .collect();
            let (binned_variance, binned_squared_error) =
                equal_count_bins(&variance, &squared_error, n_bins);
            SpreadSkill {
                variance,
                squared_error,
                binned_variance,
                binned_squared_error,
            }
        })
        .collect();
    Ok(out)
}

/// Sorts pairs by `key` and averages both sides over `n_bins` chunks of
/// near-equal size. Fewer bins are returned when there are fewer pairs.
fn equal_count_bins(key: &[f64], value: &[f64], n_bins: usize) -> (Vec<f64>, Vec<f64>) {
    let mut order: Vec<usize> = (0..key.len()).collect();
    order.sort_by(|&a, &b| key[a].total_cmp(&key[b]));
    let n = order.len();
    let bins = n_bins.clamp(1, n.max(1));
    let mut keys = Vec::with_capacity(bins);
    let mut values = Vec::with_capacity(bins);
    for b in 0..bins {
        let chunk = &order[b * n / bins..(b + 1) * n / bins];
        if chunk.is_empty() {
            continue;
        }
        let k: Vec<f64> = chunk.iter().map(|&i| key[i]).collect();
        let v: Vec<f64> = chunk.iter().map(|&i| value[i]).collect();
        keys.push(mosx_stats::mean(&k));
        values.push(mosx_stats::mean(&v));
    }
    (keys, values)
}

/// Histogram of `predicted − truth` per target.
///
/// # Errors
///
/// Returns [`EvaluateError::ShapeMismatch`] if the matrices differ in shape.
pub fn error_distribution(
    truth: &Matrix,
    predicted: &Matrix,
    n_bins: usize,
) -> Result<Vec<Histogram>, EvaluateError> {
    if truth.shape() != predicted.shape() {
        return Err(EvaluateError::ShapeMismatch {
            what: "predicted vs truth".to_string(),
            expected: truth.shape(),
            got: predicted.shape(),
        });
    }
    let out = (0..truth.n_cols())
        .map(|t| {
            let errors: Vec<f64> = (0..truth.n_rows())
                .map(|c| predicted.get(c, t) - truth.get(c, t))
                .filter(|e| e.is_finite())
                .collect();
            histogram(&errors, n_bins)
        })
        .collect();
    Ok(out)
}

/// Equal-width histogram spanning the data range. A constant sample gets a
/// unit-wide range centred on its value. An empty sample has NaN moments.
pub fn histogram(data: &[f64], n_bins: usize) -> Histogram {
    let n_bins = n_bins.max(1);
    let (lo, hi) = data
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
            (lo.min(x), hi.max(x))
        });
    let (lo, hi) = if data.is_empty() {
        (-0.5, 0.5)
    } else if hi - lo <= 0.0 {
        (lo - 0.5, hi + 0.5)
    } else {
        (lo, hi)
    };
    let edges = mosx_stats::linspace(lo, hi, n_bins + 1);
    let width = (hi - lo) / n_bins as f64;
    let mut counts = vec![0u64; n_bins];
    for &x in data {
        let bin = (((x - lo) / width).floor() as usize).min(n_bins - 1);
        counts[bin] += 1;
    }
    debug!(n = data.len(), n_bins, "histogram built");
    Histogram {
        edges,
        counts,
        mean: mosx_stats::mean(data),
        sd: mosx_stats::population_sd(data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn small_ensemble() -> (Matrix, Ensemble) {
        // 3 cases, 1 target, 3 members
        let ens = Ensemble::new(3, 1, 3, vec![1.0, 2.0, 3.0, 1.0, 2.0, 3.0, 1.0, 2.0, 3.0])
            .unwrap();
        let truth = Matrix::new(3, 1, vec![0.0, 2.0, 9.0]).unwrap();
        (truth, ens)
    }

    #[test]
    fn rank_histogram_counts_strictly_below() {
        let (truth, ens) = small_ensemble();
        let ranks = rank_histogram(&truth, &ens).unwrap();
        assert_eq!(ranks.len(), 1);
        // ranks: 0, 1 (only 1.0 < 2.0), 3
        assert_eq!(ranks[0], vec![1, 1, 0, 1]);
        assert_eq!(ranks[0].iter().sum::<u64>(), 3);
    }

    #[test]
    fn rank_histogram_rejects_mismatch() {
        let (_, ens) = small_ensemble();
        assert!(rank_histogram(&Matrix::zeros(2, 1), &ens).is_err());
    }

    #[test]
    fn spread_skill_values() {
        let (truth, ens) = small_ensemble();
        let ss = spread_skill(&truth, &ens, 10).unwrap();
        let s = &ss[0];
        for v in &s.variance {
            assert_relative_eq!(*v, 2.0 / 3.0, epsilon = 1e-12);
        }
        assert_eq!(s.squared_error, vec![4.0, 0.0, 49.0]);
        // Only three cases, so at most three bins.
        assert_eq!(s.binned_variance.len(), 3);
    }

    #[test]
    fn equal_count_bins_sort_by_key() {
        let (k, v) = equal_count_bins(&[4.0, 1.0, 3.0, 2.0], &[40.0, 10.0, 30.0, 20.0], 2);
        assert_eq!(k, vec![1.5, 3.5]);
        assert_eq!(v, vec![15.0, 35.0]);
    }

    #[test]
    fn histogram_covers_all_points() {
        let h = histogram(&[-1.0, 0.0, 0.5, 1.0, 3.0], 4);
        assert_eq!(h.edges.len(), 5);
        assert_eq!(h.edges[0], -1.0);
        assert_eq!(h.edges[4], 3.0);
        assert_eq!(h.counts.iter().sum::<u64>(), 5);
        assert_eq!(h.counts[3], 1);
        assert_relative_eq!(h.mean, 0.7, epsilon = 1e-12);
    }

    #[test]
    fn histogram_constant_sample() {
        let h = histogram(&[2.0, 2.0], 3);
        assert_eq!(h.counts.iter().sum::<u64>(), 2);
        assert_eq!(h.sd, 0.0);
    }

    #[test]
    fn histogram_all_nan_errors_has_nan_moments() {
        let truth = Matrix::new(2, 1, vec![f64::NAN, f64::NAN]).unwrap();
        let pred = Matrix::new(2, 1, vec![1.0, 2.0]).unwrap();
        let hists = error_distribution(&truth, &pred, 4).unwrap();
        assert_eq!(hists[0].counts.iter().sum::<u64>(), 0);
        assert!(hists[0].mean.is_nan());
        assert!(hists[0].sd.is_nan());
    }

    #[test]
    fn error_distribution_per_target() {
        let truth = Matrix::new(2, 2, vec![1.0, 1.0, 2.0, 2.0]).unwrap();
        let pred = Matrix::new(2, 2, vec![2.0, 1.0, 1.0, 2.0]).unwrap();
        let hists = error_distribution(&truth, &pred, 2).unwrap();
        assert_eq!(hists.len(), 2);
        assert_relative_eq!(hists[0].mean, 0.0, epsilon = 1e-12);
        assert_relative_eq!(hists[0].sd, 1.0, epsilon = 1e-12);
        assert!(error_distribution(&truth, &Matrix::zeros(2, 3), 2).is_err());
    }
}
