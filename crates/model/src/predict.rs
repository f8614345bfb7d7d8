//! Prediction entry points: point and ensemble forecasts, rain probabilities.

use mosx_io::{Ensemble, Matrix, PredictorBundle, RAIN_INDEX};
use tracing::{debug, info};

use crate::config::RainSpec;
use crate::error::ModelError;
use crate::model_file::TrainedModel;

/// Output of [`predict_all`].
#[derive(Debug, Clone, PartialEq)]
pub struct Predictions {
    /// Point forecast, `n_cases × 4` in `[High, Low, Wind, Rain]` order.
    pub predicted: Matrix,
    /// Member forecasts `(n_cases, 4, n_members)`, present only when an
    /// ensemble was requested.
    pub all_predicted: Option<Ensemble>,
}

/// Predict every case of a bundle.
///
/// * `ensemble`: also return the member forecasts.
/// * `naive_rain_correction`: clip rain at zero and force zero rain for
///   cases where every configured raw-model rain predictor is zero.
/// * `rain_tuning`: use the model's rain-tuned estimator for the rain
///   column when one was trained.
///
/// For categorical and PoP rain, member rain outputs are mapped to the
/// nearest class label and the point rain forecast is the class with the
/// most member votes.
///
/// # Errors
///
/// Returns [`ModelError::FeatureMismatch`] or [`ModelError::Validation`] if
/// the bundle predictors do not match the model, and
/// [`ModelError::InvalidConfig`] if the rain spec is invalid.
pub fn predict_all(
    model: &TrainedModel,
    bundle: &PredictorBundle,
    rain: &RainSpec,
    ensemble: bool,
    naive_rain_correction: bool,
    rain_tuning: bool,
) -> Result<Predictions, ModelError> {
    rain.validate()?;
    check_features(model, bundle)?;

    let x = bundle.predictors();
    let mut members = model.estimator().predict_members(&x)?;

    if rain_tuning {
        match model.rain_estimator() {
            Some(rain_est) => {
                let tuned = rain_est.predict_members(&x)?;
                for c in 0..members.n_cases() {
                    members
                        .members_mut(c, RAIN_INDEX)
                        .copy_from_slice(tuned.members(c, 0));
                }
            }
            None => debug!("rain tuning requested but the model has no rain estimator"),
        }
    }

    if naive_rain_correction {
        let dry = dry_cases(bundle, rain)?;
        let mut n_dry = 0;
        for (c, &is_dry) in dry.iter().enumerate() {
            n_dry += usize::from(is_dry);
            for v in members.members_mut(c, RAIN_INDEX) {
                *v = if is_dry { 0.0 } else { v.max(0.0) };
            }
        }
        debug!(n_dry, "naive rain correction applied");
    }

    let n_classes = rain.n_classes();
    if rain.forecast_type().is_probabilistic() {
        for c in 0..members.n_cases() {
            for v in members.members_mut(c, RAIN_INDEX) {
                *v = class_label(*v, n_classes) as f64;
            }
        }
    }

    let mut predicted = members.mean();
    if rain.forecast_type().is_probabilistic() {
        for c in 0..members.n_cases() {
            let votes = class_votes(members.members(c, RAIN_INDEX), n_classes);
            predicted.set(c, RAIN_INDEX, argmax(&votes) as f64);
        }
    }

    info!(
        n_cases = predicted.n_rows(),
        n_members = members.n_members(),
        ensemble,
        naive_rain_correction,
        rain_tuning,
        "predictions computed"
    );

    Ok(Predictions {
        predicted,
        all_predicted: ensemble.then_some(members),
    })
}

/// Probability of each rain class, as the fraction of ensemble members voting
/// for it. Returns an `n_cases × n_classes` matrix.
///
/// # Errors
///
/// Returns [`ModelError::InvalidConfig`] for quantity rain forecasts, plus
/// any error from [`predict_all`].
pub fn predict_rain_proba(
    model: &TrainedModel,
    bundle: &PredictorBundle,
    rain: &RainSpec,
    rain_tuning: bool,
) -> Result<Matrix, ModelError> {
    if !rain.forecast_type().is_probabilistic() {
        return Err(ModelError::InvalidConfig {
            reason: "rain probabilities need a categorical or pop rain forecast".to_string(),
        });
    }
    let preds = predict_all(model, bundle, rain, true, false, rain_tuning)?;
    let Some(members) = preds.all_predicted else {
        return Err(ModelError::NotFitted);
    };

    let n_classes = rain.n_classes();
    let mut proba = Matrix::zeros(members.n_cases(), n_classes);
    for c in 0..members.n_cases() {
        for (k, p) in class_votes(members.members(c, RAIN_INDEX), n_classes)
            .into_iter()
            .enumerate()
        {
            proba.set(c, k, p);
        }
    }
    Ok(proba)
}

/// Replace the rain column of `tuned` with the mean of the rain-tuned and
/// untuned rain forecasts.
///
/// # Errors
///
/// Returns [`ModelError::Validation`] if the two forecasts differ in shape.
pub fn rain_post_average(tuned: &Matrix, untuned: &Matrix) -> Result<Matrix, ModelError> {
    if tuned.shape() != untuned.shape() {
        return Err(ModelError::Validation {
            count: 1,
            details: format!(
                "cannot average forecasts of shape {:?} and {:?}",
                tuned.shape(),
                untuned.shape()
            ),
        });
    }
    let mut out = tuned.clone();
    for c in 0..out.n_rows() {
        let avg = 0.5 * (tuned.get(c, RAIN_INDEX) + untuned.get(c, RAIN_INDEX));
        out.set(c, RAIN_INDEX, avg);
    }
    Ok(out)
}

fn check_features(model: &TrainedModel, bundle: &PredictorBundle) -> Result<(), ModelError> {
    if bundle.n_predictors() != model.n_features() {
        return Err(ModelError::FeatureMismatch {
            expected: model.n_features(),
            got: bundle.n_predictors(),
        });
    }
    let expected = model.feature_names();
    if !expected.is_empty() {
        let actual = bundle.predictor_names();
        let mismatched: Vec<String> = expected
            .iter()
            .zip(&actual)
            .enumerate()
            .filter(|(_, (e, a))| e != a)
            .map(|(i, (e, a))| format!("predictor {i}: model '{e}', bundle '{a}'"))
            .collect();
        if !mismatched.is_empty() {
            return Err(ModelError::Validation {
                count: mismatched.len(),
                details: mismatched.join("; "),
            });
        }
    }
    Ok(())
}

/// Cases where every configured raw-model rain predictor is exactly zero.
/// With no configured predictors, no case is dry.
fn dry_cases(bundle: &PredictorBundle, rain: &RainSpec) -> Result<Vec<bool>, ModelError> {
    let n = bundle.n_cases();
    if rain.predictors().is_empty() {
        return Ok(vec![false; n]);
    }

    let mut indices = Vec::with_capacity(rain.predictors().len());
    let mut missing = Vec::new();
    for name in rain.predictors() {
        match bundle.predictor_index(name) {
            Some(i) => indices.push(i),
            None => missing.push(format!("rain predictor '{name}' not found in bundle")),
        }
    }
    if !missing.is_empty() {
        return Err(ModelError::Validation {
            count: missing.len(),
            details: missing.join("; "),
        });
    }

    let x = bundle.predictors();
    Ok((0..n)
        .map(|c| indices.iter().all(|&i| x.get(c, i) == 0.0))
        .collect())
}

/// Nearest class label in `0..n_classes`.
fn class_label(value: f64, n_classes: usize) -> usize {
    if !value.is_finite() || value <= 0.0 || n_classes == 0 {
        return 0;
    }
    (value.round() as usize).min(n_classes - 1)
}

/// Fraction of members voting for each class label.
fn class_votes(labels: &[f64], n_classes: usize) -> Vec<f64> {
    let mut votes = vec![0.0; n_classes];
    if labels.is_empty() || n_classes == 0 {
        return votes;
    }
    for &l in labels {
        votes[class_label(l, n_classes)] += 1.0;
    }
    let n = labels.len() as f64;
    votes.iter_mut().for_each(|v| *v /= n);
    votes
}

/// Index of the largest value; ties resolve to the lowest index.
fn argmax(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, &v)| {
            if v > best.1 { (i, v) } else { best }
        })
        .0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn class_label_rounds_and_clamps() {
        assert_eq!(class_label(-0.7, 3), 0);
        assert_eq!(class_label(0.4, 3), 0);
        assert_eq!(class_label(0.6, 3), 1);
        assert_eq!(class_label(7.2, 3), 2);
        assert_eq!(class_label(f64::NAN, 3), 0);
    }

    #[test]
    fn class_votes_fractions() {
        let votes = class_votes(&[0.0, 1.0, 1.0, 2.0], 3);
        assert_relative_eq!(votes[0], 0.25);
        assert_relative_eq!(votes[1], 0.5);
        assert_relative_eq!(votes[2], 0.25);
        assert_relative_eq!(votes.iter().sum::<f64>(), 1.0);
    }

    #[test]
    fn argmax_prefers_first_on_ties() {
        assert_eq!(argmax(&[0.2, 0.4, 0.4]), 1);
        assert_eq!(argmax(&[0.5, 0.5]), 0);
    }

    #[test]
    fn rain_post_average_only_touches_rain() {
        let tuned = Matrix::new(1, 4, vec![70.0, 50.0, 10.0, 0.4]).unwrap();
        let untuned = Matrix::new(1, 4, vec![71.0, 51.0, 11.0, 0.2]).unwrap();
        let avg = rain_post_average(&tuned, &untuned).unwrap();
        assert_eq!(avg.get(0, 0), 70.0);
        assert_relative_eq!(avg.get(0, RAIN_INDEX), 0.3, epsilon = 1e-12);
        assert!(rain_post_average(&tuned, &Matrix::zeros(2, 4)).is_err());
    }
}
