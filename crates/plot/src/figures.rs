//! The four verification figures, built from evaluation results.

use mosx_evaluate::{Histogram, SpreadSkill};
use mosx_io::TARGET_NAMES;
use mosx_model::LearningCurve;

use crate::error::PlotError;
use crate::figure::{Bar, Color, Figure, Panel, Series};

fn target_name(t: usize) -> String {
    TARGET_NAMES
        .get(t)
        .map_or_else(|| format!("Target {t}"), |s| (*s).to_string())
}

fn check_non_empty(n: usize, what: &str) -> Result<(), PlotError> {
    if n == 0 {
        return Err(PlotError::EmptyData {
            what: what.to_string(),
        });
    }
    Ok(())
}

/// Train and test score against the number of training examples.
///
/// # Errors
///
/// Returns [`PlotError::EmptyData`] for an empty curve.
pub fn learning_curve_figure(curve: &LearningCurve) -> Result<Figure, PlotError> {
    check_non_empty(curve.train_sizes.len(), "learning curve")?;
    let sizes: Vec<f64> = curve.train_sizes.iter().map(|&n| n as f64).collect();
    let pairs = |scores: &[f64]| -> Vec<(f64, f64)> {
        sizes.iter().copied().zip(scores.iter().copied()).collect()
    };
    let train = pairs(&curve.train_scores);
    let test = pairs(&curve.test_scores);

    let panel = Panel::new("WxChallenge score", "Training examples", "Score")
        .with_series(Series::Line {
            points: train.clone(),
            color: Color::RED,
            label: Some("Training score".to_string()),
        })
        .with_series(Series::Scatter {
            points: train,
            color: Color::RED,
        })
        .with_series(Series::Line {
            points: test.clone(),
            color: Color::GREEN,
            label: Some("Cross-validation score".to_string()),
        })
        .with_series(Series::Scatter {
            points: test,
            color: Color::GREEN,
        });
    Ok(Figure::new("Learning curve", 1).with_panel(panel))
}

/// Ensemble variance against squared error of the ensemble mean, one panel
/// per target, with equal-count bin means and the one-to-one line.
///
/// # Errors
///
/// Returns [`PlotError::EmptyData`] if there are no targets.
pub fn spread_skill_figure(data: &[SpreadSkill]) -> Result<Figure, PlotError> {
    check_non_empty(data.len(), "spread-skill")?;
    let mut figure = Figure::new("Spread-skill", 2);
    for (t, ss) in data.iter().enumerate() {
        let upper = ss
            .variance
            .iter()
            .chain(&ss.squared_error)
            .copied()
            .filter(|v| v.is_finite())
            .fold(0.0_f64, f64::max);
        let panel = Panel::new(target_name(t), "Ensemble variance", "Squared error")
            .with_series(Series::Scatter {
                points: ss.variance.iter().copied().zip(ss.squared_error.iter().copied()).collect(),
                color: Color::GREY,
            })
            .with_series(Series::Line {
                points: vec![(0.0, 0.0), (upper, upper)],
                color: Color::BLACK,
                label: None,
            })
            .with_series(Series::Line {
                points: ss
                    .binned_variance
                    .iter()
                    .copied()
                    .zip(ss.binned_squared_error.iter().copied())
                    .collect(),
                color: Color::BLUE,
                label: Some("Binned mean".to_string()),
            });
        figure = figure.with_panel(panel);
    }
    Ok(figure)
}

/// Observation rank counts, one panel per target.
///
/// # Errors
///
/// Returns [`PlotError::EmptyData`] if there are no targets.
pub fn rank_histogram_figure(ranks: &[Vec<u64>]) -> Result<Figure, PlotError> {
    check_non_empty(ranks.len(), "rank histogram")?;
    let mut figure = Figure::new("Rank histogram", 2);
    for (t, counts) in ranks.iter().enumerate() {
        let bars = counts
            .iter()
            .enumerate()
            .map(|(r, &c)| Bar {
                x0: r as f64 - 0.4,
                x1: r as f64 + 0.4,
                height: c as f64,
            })
            .collect();
        figure = figure.with_panel(
            Panel::new(target_name(t), "Rank of observation", "Count").with_series(Series::Bars {
                bars,
                color: Color::BLUE,
            }),
        );
    }
    Ok(figure)
}

/// Histogram of forecast errors, one panel per target.
///
/// # Errors
///
/// Returns [`PlotError::EmptyData`] if there are no targets.
pub fn error_distribution_figure(histograms: &[Histogram]) -> Result<Figure, PlotError> {
    check_non_empty(histograms.len(), "error distribution")?;
    let mut figure = Figure::new("Error distribution", 2);
    for (t, h) in histograms.iter().enumerate() {
        let bars = h
            .edges
            .windows(2)
            .zip(&h.counts)
            .map(|(edge, &c)| Bar {
                x0: edge[0],
                x1: edge[1],
                height: c as f64,
            })
            .collect();
        let title = if h.mean.is_finite() {
            format!("{}: mean {:.2}, sd {:.2}", target_name(t), h.mean, h.sd)
        } else {
            format!("{}: no finite errors", target_name(t))
        };
        figure = figure.with_panel(
            Panel::new(title, "Predicted - observed", "Count").with_series(Series::Bars {
                bars,
                color: Color::BLUE,
            }),
        );
    }
    Ok(figure)
}
