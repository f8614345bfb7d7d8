//! Trained model file: the fitted estimator plus an optional rain-tuned one.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ModelError;
use crate::estimator::BaggedRidge;
use mosx_io::N_TARGETS;

/// A trained MOS-X model as stored on disk (JSON).
///
/// `estimator` predicts all four targets. `rain_estimator`, when present,
/// is a single-output estimator tuned for rain that replaces the rain column
/// when rain tuning is requested.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    #[serde(default)]
    feature_names: Vec<String>,
    estimator: BaggedRidge,
    #[serde(default)]
    rain_estimator: Option<BaggedRidge>,
}

impl TrainedModel {
    /// Assembles a model from fitted estimators.
    ///
    /// `feature_names` may be empty; when given, it must have one entry per
    /// feature and is checked against bundle predictor names at prediction
    /// time.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotFitted`] if an estimator has no members, or
    /// [`ModelError::Validation`] if shapes are inconsistent.
    pub fn new(
        estimator: BaggedRidge,
        rain_estimator: Option<BaggedRidge>,
        feature_names: Vec<String>,
    ) -> Result<Self, ModelError> {
        let model = Self {
            feature_names,
            estimator,
            rain_estimator,
        };
        model.validate()?;
        Ok(model)
    }

    /// The main four-target estimator.
    pub fn estimator(&self) -> &BaggedRidge {
        &self.estimator
    }

    /// The rain-tuned estimator, if trained.
    pub fn rain_estimator(&self) -> Option<&BaggedRidge> {
        self.rain_estimator.as_ref()
    }

    /// Predictor names the model was trained on (may be empty).
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Number of predictor columns the model expects.
    pub fn n_features(&self) -> usize {
        self.estimator.n_features().unwrap_or(0)
    }

    /// Number of ensemble members.
    pub fn n_members(&self) -> usize {
        self.estimator.n_members()
    }

    fn validate(&self) -> Result<(), ModelError> {
        self.estimator.validate_members()?;
        let mut problems = Vec::new();
        let n_features = self.n_features();

        if self.estimator.n_targets() != Some(N_TARGETS) {
            problems.push(format!(
                "estimator must predict {N_TARGETS} targets, predicts {}",
                self.estimator.n_targets().unwrap_or(0)
            ));
        }
        if !self.feature_names.is_empty() && self.feature_names.len() != n_features {
            problems.push(format!(
                "{} feature names for {n_features} features",
                self.feature_names.len()
            ));
        }
        if let Some(rain) = &self.rain_estimator {
            rain.validate_members()?;
            if rain.n_targets() != Some(1) {
                problems.push("rain estimator must predict exactly 1 target".to_string());
            }
            if rain.n_features() != Some(n_features) {
                problems.push(format!(
                    "rain estimator expects {} features, main estimator {n_features}",
                    rain.n_features().unwrap_or(0)
                ));
            }
            if rain.n_members() != self.estimator.n_members() {
                problems.push(format!(
                    "rain estimator has {} members, main estimator {}",
                    rain.n_members(),
                    self.estimator.n_members()
                ));
            }
        }

        if !problems.is_empty() {
            return Err(ModelError::Validation {
                count: problems.len(),
                details: problems.join("; "),
            });
        }
        Ok(())
    }
}

/// Load a trained model from a JSON file.
///
/// # Errors
///
/// Returns [`ModelError::FileNotFound`] if `path` does not exist,
/// [`ModelError::Serialization`] if it cannot be read or parsed, and
/// validation errors if the stored estimators are inconsistent.
pub fn load_model(path: &Path) -> Result<TrainedModel, ModelError> {
    if !path.exists() {
        return Err(ModelError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let text = std::fs::read_to_string(path).map_err(|e| ModelError::Serialization {
        reason: format!("{}: {e}", path.display()),
    })?;
    let model: TrainedModel =
        serde_json::from_str(&text).map_err(|e| ModelError::Serialization {
            reason: format!("{}: {e}", path.display()),
        })?;
    model.validate()?;
    info!(
        path = %path.display(),
        n_features = model.n_features(),
        n_members = model.n_members(),
        rain_tuned = model.rain_estimator.is_some(),
        "model loaded"
    );
    Ok(model)
}

/// Save a trained model as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`ModelError::Serialization`] if serialization or the write fails.
pub fn save_model(path: &Path, model: &TrainedModel) -> Result<(), ModelError> {
    let json = serde_json::to_string_pretty(model).map_err(|e| ModelError::Serialization {
        reason: e.to_string(),
    })?;
    std::fs::write(path, json).map_err(|e| ModelError::Serialization {
        reason: format!("{}: {e}", path.display()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EstimatorConfig;
    use crate::estimator::build_estimator;
    use mosx_io::Matrix;

    fn fitted(n_targets: usize, n_members: usize) -> BaggedRidge {
        let n = 12;
        let x = Matrix::new(n, 2, (0..n * 2).map(|i| (i % 5) as f64 + i as f64).collect())
            .unwrap();
        let y = Matrix::new(n, n_targets, (0..n * n_targets).map(|i| i as f64).collect())
            .unwrap();
        let mut est = build_estimator(&EstimatorConfig::new().with_n_members(n_members)).unwrap();
        est.fit(&x, &y).unwrap();
        est
    }

    #[test]
    fn new_accepts_consistent_model() {
        let model = TrainedModel::new(
            fitted(4, 3),
            Some(fitted(1, 3)),
            vec!["BUFKIT/a".into(), "OBS/b".into()],
        )
        .unwrap();
        assert_eq!(model.n_features(), 2);
        assert_eq!(model.n_members(), 3);
    }

    #[test]
    fn new_rejects_wrong_target_count() {
        let err = TrainedModel::new(fitted(3, 2), None, vec![]).unwrap_err();
        assert!(err.to_string().contains("must predict 4 targets"));
    }

    #[test]
    fn new_rejects_mismatched_rain_estimator() {
        let err = TrainedModel::new(fitted(4, 2), Some(fitted(1, 3)), vec![]).unwrap_err();
        assert!(err.to_string().contains("rain estimator has 3 members"));
    }

    #[test]
    fn new_rejects_unfitted() {
        let est = build_estimator(&EstimatorConfig::new()).unwrap();
        assert!(matches!(
            TrainedModel::new(est, None, vec![]),
            Err(ModelError::NotFitted)
        ));
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let model = TrainedModel::new(fitted(4, 2), None, vec![]).unwrap();
        save_model(&path, &model).unwrap();
        let back = load_model(&path).unwrap();
        assert_eq!(back, model);
    }

    #[test]
    fn load_missing_and_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        assert!(matches!(
            load_model(&missing),
            Err(ModelError::FileNotFound { .. })
        ));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{ not json").unwrap();
        assert!(matches!(
            load_model(&bad),
            Err(ModelError::Serialization { .. })
        ));
    }
}
