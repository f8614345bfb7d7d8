//! Evaluation error types.

/// Errors that can occur during evaluation.
#[derive(Debug, thiserror::Error)]
pub enum EvaluateError {
    /// One or more validation checks failed.
    #[error("{count} validation error(s): {details}")]
    Validation { count: usize, details: String },

    /// Two inputs that must align have different shapes.
    #[error("shape mismatch for {what}: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        what: String,
        expected: (usize, usize),
        got: (usize, usize),
    },

    /// JSON serialization failed.
    #[error("serialization error: {reason}")]
    Serialization { reason: String },
}
