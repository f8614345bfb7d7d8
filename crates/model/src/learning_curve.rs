//! Learning curve: skill as a function of training-set size.

use mosx_io::PredictorBundle;
use tracing::{debug, info};

use crate::config::EstimatorConfig;
use crate::error::ModelError;
use crate::estimator::build_estimator;
use crate::scoring::wxchallenge_scorer;
use crate::split::SplitConsecutive;

/// Train and test scores at increasing training-set sizes.
#[derive(Debug, Clone, PartialEq)]
pub struct LearningCurve {
    /// Number of training cases used at each point.
    pub train_sizes: Vec<usize>,
    /// Score on the cases the estimator was fitted on.
    pub train_scores: Vec<f64>,
    /// Score on the held-out test block.
    pub test_scores: Vec<f64>,
}

/// Refit a fresh estimator on growing prefixes of the training block and
/// score each fit with [`wxchallenge_scorer`].
///
/// Training sizes are `linspace(0.1, 1.0, n_points)` fractions of the
/// training block, rounded, at least 1, with duplicates removed.
///
/// # Errors
///
/// Returns [`ModelError::Validation`] if the split is degenerate or
/// `n_points` is zero, plus any fitting or scoring error.
pub fn learning_curve(
    config: &EstimatorConfig,
    bundle: &PredictorBundle,
    split: &SplitConsecutive,
    n_points: usize,
) -> Result<LearningCurve, ModelError> {
    if n_points == 0 {
        return Err(ModelError::Validation {
            count: 1,
            details: "learning curve needs at least one point".to_string(),
        });
    }
    let (train, test) = split.split(bundle.n_cases())?;
    let n_train = train.len();

    let x = bundle.predictors();
    let y = bundle.targets();
    let x_test = x.slice_rows(test.start, test.end);
    let y_test = y.slice_rows(test.start, test.end);

    let mut sizes: Vec<usize> = mosx_stats::linspace(0.1, 1.0, n_points)
        .into_iter()
        .map(|f| ((f * n_train as f64).round() as usize).clamp(1, n_train))
        .collect();
    sizes.dedup();

    info!(n_train, n_test = test.len(), n_points = sizes.len(), "computing learning curve");

    let mut curve = LearningCurve {
        train_sizes: Vec::with_capacity(sizes.len()),
        train_scores: Vec::with_capacity(sizes.len()),
        test_scores: Vec::with_capacity(sizes.len()),
    };

    for n in sizes {
        let x_fit = x.slice_rows(train.start, train.start + n);
        let y_fit = y.slice_rows(train.start, train.start + n);

        let mut estimator = build_estimator(config)?;
        estimator.fit(&x_fit, &y_fit)?;

        let train_score = wxchallenge_scorer(&estimator.predict(&x_fit)?, &y_fit)?;
        let test_score = wxchallenge_scorer(&estimator.predict(&x_test)?, &y_test)?;
        debug!(n, train_score, test_score, "learning curve point");

        curve.train_sizes.push(n);
        curve.train_scores.push(train_score);
        curve.test_scores.push(test_score);
    }

    Ok(curve)
}
