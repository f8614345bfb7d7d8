//! MOS-X verification: accuracy and skill scores of point, probabilistic and
//! ensemble forecasts, plus the data behind the diagnostic figures.

mod config;
#[cfg(feature = "crps")]
mod crps;
mod diagnostics;
mod error;
mod metrics;
mod output;
mod table;

use mosx_io::{Ensemble, Matrix, N_TARGETS, RAIN_INDEX};
use tracing::{info, info_span};

pub use config::EvaluateConfig;
#[cfg(feature = "crps")]
pub use crps::{crps_ensemble, mean_crps};
pub use diagnostics::{
    Histogram, SpreadSkill, error_distribution, histogram, rank_histogram, spread_skill,
};
pub use error::EvaluateError;
pub use metrics::{
    brier_score, explained_variance, label_binarize, mean_absolute_error, mean_squared_error,
    mean_variance, r2_score,
};
pub use output::{RunSummary, ScoreRow, VerificationOutput, to_json};
pub use table::{Metric, ScoreTable};

/// Score a forecast against the verification targets.
///
/// `truth` and `predicted` are `n_cases × 4` in `[High, Low, Wind, Rain]`
/// order. The regression rows are always filled. The Brier row is filled in
/// the rain column only when `rain_proba` (`n_cases × K` class
/// probabilities) is given, in which case the truth rain column holds class
/// labels. The ensemble variance and CRPS rows are filled only when
/// `ensemble` is given, and CRPS only when this build has CRPS support.
///
/// # Errors
///
/// Returns [`EvaluateError::ShapeMismatch`] if any input disagrees with the
/// shape of `truth`, or [`EvaluateError::Validation`] if there are no cases.
pub fn evaluate(
    truth: &Matrix,
    predicted: &Matrix,
    ensemble: Option<&Ensemble>,
    rain_proba: Option<&Matrix>,
) -> Result<ScoreTable, EvaluateError> {
    let _span = info_span!("evaluate", n_cases = truth.n_rows()).entered();

    if truth.n_cols() != N_TARGETS {
        return Err(EvaluateError::ShapeMismatch {
            what: "truth".to_string(),
            expected: (truth.n_rows(), N_TARGETS),
            got: truth.shape(),
        });
    }
    if predicted.shape() != truth.shape() {
        return Err(EvaluateError::ShapeMismatch {
            what: "predicted".to_string(),
            expected: truth.shape(),
            got: predicted.shape(),
        });
    }
    if truth.n_rows() == 0 {
        return Err(EvaluateError::Validation {
            count: 1,
            details: "no cases to evaluate".to_string(),
        });
    }

    let mut table = ScoreTable::new();
    for t in 0..N_TARGETS {
        let y = truth.column(t);
        let p = predicted.column(t);
        table.set(Metric::ExplainedVariance, t, explained_variance(&y, &p));
        table.set(Metric::MeanAbsoluteError, t, mean_absolute_error(&y, &p));
        table.set(Metric::MeanSquaredError, t, mean_squared_error(&y, &p));
        table.set(Metric::R2, t, r2_score(&y, &p));
    }

    if let Some(proba) = rain_proba {
        let labels = label_binarize(&truth.column(RAIN_INDEX), proba.n_cols());
        table.set(Metric::Brier, RAIN_INDEX, brier_score(proba, &labels)?);
    }

    if let Some(ens) = ensemble {
        let expected = (truth.n_rows(), N_TARGETS);
        if (ens.n_cases(), ens.n_targets()) != expected {
            return Err(EvaluateError::ShapeMismatch {
                what: "ensemble".to_string(),
                expected,
                got: (ens.n_cases(), ens.n_targets()),
            });
        }
        table.set_row(Metric::EnsembleVariance, &mean_variance(ens));
        score_crps(&mut table, truth, ens)?;
    }

    info!(
        brier = table.is_row_filled(Metric::Brier),
        ensemble = ensemble.is_some(),
        "scores computed"
    );
    Ok(table)
}

#[cfg(feature = "crps")]
fn score_crps(table: &mut ScoreTable, truth: &Matrix, ens: &Ensemble) -> Result<(), EvaluateError> {
    table.set_row(Metric::Crps, &mean_crps(truth, ens)?);
    Ok(())
}

#[cfg(not(feature = "crps"))]
fn score_crps(
    _table: &mut ScoreTable,
    _truth: &Matrix,
    _ens: &Ensemble,
) -> Result<(), EvaluateError> {
    tracing::debug!("built without crps support, skipping CRPS row");
    Ok(())
}
