//! JSON output structures for verification results.

use std::collections::BTreeMap;

use mosx_io::TARGET_NAMES;
use serde::Serialize;

use crate::error::EvaluateError;
use crate::table::{Metric, ScoreTable};

/// Top-level verification output.
#[derive(Debug, Serialize)]
pub struct VerificationOutput {
    /// Summary of the run that produced the scores.
    pub run: RunSummary,
    /// One entry per metric row, in table order.
    pub scores: Vec<ScoreRow>,
}

/// Summary of the verification run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub station_id: String,
    pub n_cases: usize,
    pub n_members: usize,
    pub rain_forecast_type: String,
    pub ensemble: bool,
    pub rain_tuning: bool,
}

/// One metric row. Uncomputed cells serialize as `null`.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreRow {
    pub metric: Metric,
    pub values: BTreeMap<&'static str, Option<f64>>,
}

impl VerificationOutput {
    pub fn new(run: RunSummary, table: &ScoreTable) -> Self {
        let scores = Metric::ALL
            .iter()
            .map(|&metric| ScoreRow {
                metric,
                values: TARGET_NAMES
                    .iter()
                    .zip(table.row(metric))
                    .map(|(&name, &v)| (name, (!v.is_nan()).then_some(v)))
                    .collect(),
            })
            .collect();
        Self { run, scores }
    }
}

/// Serialize verification output to pretty-printed JSON.
///
/// # Errors
///
/// Returns [`EvaluateError::Serialization`] if serialization fails.
pub fn to_json(output: &VerificationOutput) -> Result<String, EvaluateError> {
    serde_json::to_string_pretty(output).map_err(|e| EvaluateError::Serialization {
        reason: e.to_string(),
    })
}
