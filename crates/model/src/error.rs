//! Error types for the mosx-model crate.

use std::path::PathBuf;

/// Error type for all fallible operations in the mosx-model crate.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Wraps a bundle or matrix error from mosx-io.
    #[error(transparent)]
    Io(#[from] mosx_io::IoError),

    /// Returned when a model file does not exist on disk.
    #[error("model file not found: {}", path.display())]
    FileNotFound {
        /// Path that could not be found.
        path: PathBuf,
    },

    /// Returned when a model file cannot be read, written or (de)serialized.
    #[error("model serialization error: {reason}")]
    Serialization {
        /// Description of the underlying failure.
        reason: String,
    },

    /// Returned when an estimator or rain configuration is invalid.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when the predictor width does not match the trained model.
    #[error("feature mismatch: model expects {expected} predictors, got {got}")]
    FeatureMismatch {
        /// Number of features the model was trained on.
        expected: usize,
        /// Number of predictor columns supplied.
        got: usize,
    },

    /// Returned when prediction is attempted on an estimator with no members.
    #[error("estimator has not been fitted")]
    NotFitted,

    /// Returned when the regularised normal equations are not positive definite.
    #[error("singular system: {reason}")]
    Singular {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when one or more validation checks fail.
    #[error("{count} validation error(s): {details}")]
    Validation {
        /// Number of accumulated validation failures.
        count: usize,
        /// Human-readable summary of the failures.
        details: String,
    },
}
