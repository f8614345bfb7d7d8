//! Bagged ridge estimator.

use mosx_io::{Ensemble, Matrix};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EstimatorConfig;
use crate::error::ModelError;
use crate::ridge::RidgeMember;

/// An ensemble of ridge regressions, each fitted on a bootstrap resample.
///
/// The point forecast is the member mean; the member predictions themselves
/// form the ensemble forecast.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BaggedRidge {
    config: EstimatorConfig,
    members: Vec<RidgeMember>,
}

/// Build an unfitted estimator from its configuration.
///
/// # Errors
///
/// Returns [`ModelError::InvalidConfig`] if the configuration is invalid.
pub fn build_estimator(config: &EstimatorConfig) -> Result<BaggedRidge, ModelError> {
    config.validate()?;
    Ok(BaggedRidge {
        config: config.clone(),
        members: Vec::new(),
    })
}

impl BaggedRidge {
    /// Returns the configuration.
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Whether [`fit`](Self::fit) has produced members.
    pub fn is_fitted(&self) -> bool {
        !self.members.is_empty()
    }

    /// Number of fitted members.
    pub fn n_members(&self) -> usize {
        self.members.len()
    }

    /// Number of input features, if fitted.
    pub fn n_features(&self) -> Option<usize> {
        self.members.first().map(RidgeMember::n_features)
    }

    /// Number of outputs, if fitted.
    pub fn n_targets(&self) -> Option<usize> {
        self.members.first().map(RidgeMember::n_targets)
    }

    /// Fits every member on its own bootstrap resample of `(x, y)`.
    ///
    /// Member `i` draws its sample with `StdRng` seeded `seed + i`, so the
    /// result is deterministic regardless of thread scheduling. A single
    /// member with `max_samples = 1.0` fits on all rows without resampling.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Validation`] if `x` is empty or row counts
    /// differ, or any error from fitting a member.
    pub fn fit(&mut self, x: &Matrix, y: &Matrix) -> Result<(), ModelError> {
        let n = x.n_rows();
        if n == 0 {
            return Err(ModelError::Validation {
                count: 1,
                details: "cannot fit on zero rows".to_string(),
            });
        }
        let n_members = self.config.n_members();
        let sample_size = ((self.config.max_samples() * n as f64).round() as usize).max(1);
        let bootstrap = n_members > 1 || sample_size < n;
        let seed = self.config.seed();
        let alpha = self.config.alpha();

        debug!(n_rows = n, n_members, sample_size, bootstrap, "fitting bagged ridge");

        let members = (0..n_members)
            .into_par_iter()
            .map(|i| {
                let rows: Vec<usize> = if bootstrap {
                    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
                    (0..sample_size).map(|_| rng.random_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                RidgeMember::fit(x, y, &rows, alpha)
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.members = members;
        Ok(())
    }

    /// Point forecast: the mean of all member predictions.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotFitted`] before fitting and
    /// [`ModelError::FeatureMismatch`] if `x` has the wrong width.
    pub fn predict(&self, x: &Matrix) -> Result<Matrix, ModelError> {
        Ok(self.predict_members(x)?.mean())
    }

    /// Every member's prediction, stacked along a trailing member axis.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotFitted`] before fitting and
    /// [`ModelError::FeatureMismatch`] if `x` has the wrong width.
    pub fn predict_members(&self, x: &Matrix) -> Result<Ensemble, ModelError> {
        if self.members.is_empty() {
            return Err(ModelError::NotFitted);
        }
        let predictions = self
            .members
            .iter()
            .map(|m| m.predict(x))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Ensemble::from_members(&predictions)?)
    }

    /// Checks that all members agree on feature and target counts.
    pub(crate) fn validate_members(&self) -> Result<(), ModelError> {
        let Some(first) = self.members.first() else {
            return Err(ModelError::NotFitted);
        };
        let consistent = self.members.iter().all(|m| {
            m.is_consistent()
                && m.n_features() == first.n_features()
                && m.n_targets() == first.n_targets()
        });
        if !consistent {
            return Err(ModelError::Validation {
                count: 1,
                details: "estimator members have inconsistent shapes".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn data(n: usize) -> (Matrix, Matrix) {
        let mut xd = Vec::new();
        let mut yd = Vec::new();
        for i in 0..n {
            let x0 = i as f64;
            let noise = ((i * 13) % 7) as f64 - 3.0;
            xd.push(x0);
            yd.extend([3.0 * x0 + noise, -x0]);
        }
        (
            Matrix::new(n, 1, xd).unwrap(),
            Matrix::new(n, 2, yd).unwrap(),
        )
    }

    #[test]
    fn build_estimator_is_unfitted() {
        let est = build_estimator(&EstimatorConfig::new()).unwrap();
        assert!(!est.is_fitted());
        assert_eq!(est.n_features(), None);
        assert!(matches!(
            est.predict(&Matrix::zeros(1, 1)),
            Err(ModelError::NotFitted)
        ));
    }

    #[test]
    fn build_estimator_validates() {
        let cfg = EstimatorConfig::new().with_n_members(0);
        assert!(build_estimator(&cfg).is_err());
    }

    #[test]
    fn fit_produces_members_and_ensemble() {
        let (x, y) = data(40);
        let mut est = build_estimator(&EstimatorConfig::new().with_n_members(5)).unwrap();
        est.fit(&x, &y).unwrap();
        assert_eq!(est.n_members(), 5);
        assert_eq!(est.n_features(), Some(1));
        assert_eq!(est.n_targets(), Some(2));

        let ens = est.predict_members(&x).unwrap();
        assert_eq!(ens.shape(), (40, 2, 5));
        let point = est.predict(&x).unwrap();
        assert_eq!(point.shape(), (40, 2));
        let m = ens.members(10, 0);
        assert_relative_eq!(
            point.get(10, 0),
            m.iter().sum::<f64>() / 5.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn bootstrap_members_differ() {
        let (x, y) = data(40);
        let mut est = build_estimator(&EstimatorConfig::new().with_n_members(3)).unwrap();
        est.fit(&x, &y).unwrap();
        let ens = est.predict_members(&x).unwrap();
        let m = ens.members(0, 0);
        assert!(m[0] != m[1] || m[1] != m[2]);
    }

    #[test]
    fn fit_is_deterministic_per_seed() {
        let (x, y) = data(30);
        let cfg = EstimatorConfig::new().with_n_members(4).with_seed(11);
        let mut a = build_estimator(&cfg).unwrap();
        let mut b = build_estimator(&cfg).unwrap();
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn single_member_uses_all_rows() {
        let (x, y) = data(20);
        let cfg = EstimatorConfig::new().with_n_members(1).with_alpha(1e-9);
        let mut est = build_estimator(&cfg).unwrap();
        est.fit(&x, &y).unwrap();
        let pred = est.predict(&x).unwrap();
        // Second target is exactly linear.
        assert_relative_eq!(pred.get(7, 1), -7.0, epsilon = 1e-6);
    }

    #[test]
    fn fit_rejects_empty() {
        let mut est = build_estimator(&EstimatorConfig::new()).unwrap();
        let err = est.fit(&Matrix::zeros(0, 1), &Matrix::zeros(0, 2)).unwrap_err();
        assert!(matches!(err, ModelError::Validation { .. }));
    }
}
