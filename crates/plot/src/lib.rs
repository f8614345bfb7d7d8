//! Diagnostic figures for MOS-X verification.
//!
//! Figures are described with [`Figure`] and [`Panel`] in page millimetres
//! and rendered to PDF by [`render_pdf`].

mod error;
mod figure;
mod figures;
mod pdf;

pub use error::PlotError;
pub use figure::{Axis, Bar, Color, Figure, Frame, PAGE_HEIGHT, PAGE_WIDTH, Panel, Series};
pub use figures::{
    error_distribution_figure, learning_curve_figure, rank_histogram_figure, spread_skill_figure,
};
pub use pdf::render_pdf;

/// Output file names, relative to the plot directory.
pub const LEARNING_CURVE_FILE: &str = "learning_curve.pdf";
pub const SPREAD_SKILL_FILE: &str = "spread_skill.pdf";
pub const RANK_HISTOGRAM_FILE: &str = "rank_histogram.pdf";
pub const ERROR_DISTRIBUTION_FILE: &str = "error_distribution.pdf";
