//! Plotting error types.

use std::path::PathBuf;

/// Errors that can occur while building or rendering a figure.
#[derive(Debug, thiserror::Error)]
pub enum PlotError {
    /// There is nothing to draw.
    #[error("no data to plot for {what}")]
    EmptyData { what: String },

    /// The output file could not be created or written.
    #[error("cannot write {path}: {reason}")]
    Io { path: PathBuf, reason: String },

    /// The PDF backend failed.
    #[error("PDF rendering failed: {reason}")]
    Render { reason: String },
}
