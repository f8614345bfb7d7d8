//! The fixed-shape verification score table.

use std::fmt;

use mosx_io::{N_TARGETS, TARGET_NAMES};
use serde::Serialize;

/// Metric rows of the score table, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    ExplainedVariance,
    MeanAbsoluteError,
    MeanSquaredError,
    R2,
    Brier,
    EnsembleVariance,
    Crps,
}

impl Metric {
    /// All metrics in row order.
    pub const ALL: [Metric; 7] = [
        Metric::ExplainedVariance,
        Metric::MeanAbsoluteError,
        Metric::MeanSquaredError,
        Metric::R2,
        Metric::Brier,
        Metric::EnsembleVariance,
        Metric::Crps,
    ];

    /// Row index in the score table.
    pub fn row(self) -> usize {
        self as usize
    }

    /// Human-readable row label.
    pub fn label(self) -> &'static str {
        match self {
            Metric::ExplainedVariance => "Explained variance",
            Metric::MeanAbsoluteError => "Mean absolute error",
            Metric::MeanSquaredError => "Mean squared error",
            Metric::R2 => "R^2",
            Metric::Brier => "Brier score",
            Metric::EnsembleVariance => "Ensemble variance",
            Metric::Crps => "CRPS",
        }
    }
}

/// A 7×4 table of scores: one row per [`Metric`], one column per target
/// (`High`, `Low`, `Wind`, `Rain`).
///
/// Cells that were not computed hold NaN and display as `--`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreTable {
    cells: [[f64; N_TARGETS]; 7],
}

impl Default for ScoreTable {
    fn default() -> Self {
        Self {
            cells: [[f64::NAN; N_TARGETS]; 7],
        }
    }
}

impl ScoreTable {
    /// An empty table with every cell NaN.
    pub fn new() -> Self {
        Self::default()
    }

    /// Always `(7, 4)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.cells.len(), N_TARGETS)
    }

    pub fn get(&self, metric: Metric, target: usize) -> f64 {
        self.cells[metric.row()][target]
    }

    pub fn set(&mut self, metric: Metric, target: usize, value: f64) {
        self.cells[metric.row()][target] = value;
    }

    /// The four values of one metric row.
    pub fn row(&self, metric: Metric) -> &[f64; N_TARGETS] {
        &self.cells[metric.row()]
    }

    /// Fills a metric row from per-target values. Extra values are ignored.
    pub fn set_row(&mut self, metric: Metric, values: &[f64]) {
        for (cell, &v) in self.cells[metric.row()].iter_mut().zip(values) {
            *cell = v;
        }
    }

    /// Whether any cell of the row was computed.
    pub fn is_row_filled(&self, metric: Metric) -> bool {
        self.row(metric).iter().any(|v| !v.is_nan())
    }
}

impl fmt::Display for ScoreTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<22}", "")?;
        for name in TARGET_NAMES {
            write!(f, "{name:>12}")?;
        }
        writeln!(f)?;
        for metric in Metric::ALL {
            write!(f, "{:<22}", metric.label())?;
            for v in self.row(metric) {
                if v.is_nan() {
                    write!(f, "{:>12}", "--")?;
                } else {
                    write!(f, "{v:>12.4}")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_table_is_seven_by_four_nan() {
        let table = ScoreTable::new();
        assert_eq!(table.shape(), (7, 4));
        for metric in Metric::ALL {
            assert!(!table.is_row_filled(metric));
        }
    }

    #[test]
    fn metric_rows_are_ordered() {
        for (i, metric) in Metric::ALL.iter().enumerate() {
            assert_eq!(metric.row(), i);
        }
    }

    #[test]
    fn set_row_and_get() {
        let mut table = ScoreTable::new();
        table.set_row(Metric::MeanAbsoluteError, &[1.0, 2.0, 3.0, 0.1]);
        table.set(Metric::Brier, 3, 0.25);
        assert_eq!(table.get(Metric::MeanAbsoluteError, 2), 3.0);
        assert_eq!(table.get(Metric::Brier, 3), 0.25);
        assert!(table.get(Metric::Brier, 0).is_nan());
        assert!(table.is_row_filled(Metric::Brier));
    }

    #[test]
    fn display_marks_missing_cells() {
        let mut table = ScoreTable::new();
        table.set_row(Metric::R2, &[0.9, 0.8, 0.5, 0.3]);
        let text = table.to_string();
        assert_eq!(text.lines().count(), 8);
        assert!(text.lines().next().unwrap().contains("High"));
        let r2 = text.lines().find(|l| l.starts_with("R^2")).unwrap();
        assert!(r2.contains("0.9000"));
        let crps = text.lines().find(|l| l.starts_with("CRPS")).unwrap();
        assert_eq!(crps.matches("--").count(), 4);
    }
}
