//! Error types for mosx-io.

use std::path::PathBuf;

/// Error type for all fallible operations in the mosx-io crate.
///
/// Covers Parquet failures, bundle validation problems, and shape
/// mismatches between column groups.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when a required file does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that could not be found.
        path: PathBuf,
    },

    /// Returned when a bundle file holds no rows.
    #[error("predictor bundle has no rows: {}", path.display())]
    EmptyBundle {
        /// Path of the empty file.
        path: PathBuf,
    },

    /// Wraps an error originating from the Parquet or Arrow libraries.
    #[error("parquet error: {reason}")]
    Parquet {
        /// Description of the underlying Parquet failure.
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

    /// Returned when a dimension has an unexpected size.
    #[error("dimension '{name}' mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Name of the dimension.
        name: String,
        /// Expected size.
        expected: usize,
        /// Actual size.
        got: usize,
    },
}

impl From<parquet::errors::ParquetError> for IoError {
    fn from(e: parquet::errors::ParquetError) -> Self {
        IoError::Parquet {
            reason: e.to_string(),
        }
    }
}

impl From<arrow::error::ArrowError> for IoError {
    fn from(e: arrow::error::ArrowError) -> Self {
        IoError::Parquet {
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_file_not_found() {
        let err = IoError::FileNotFound {
            path: PathBuf::from("/tmp/missing.parquet"),
        };
        assert_eq!(err.to_string(), "file not found: /tmp/missing.parquet");
    }

    #[test]
    fn display_empty_bundle() {
        let err = IoError::EmptyBundle {
            path: PathBuf::from("/tmp/empty.parquet"),
        };
        assert_eq!(err.to_string(), "predictor bundle has no rows: /tmp/empty.parquet");
    }

    #[test]
    fn display_parquet() {
        let err = IoError::Parquet {
            reason: "bad footer".to_string(),
        };
        assert_eq!(err.to_string(), "parquet error: bad footer");
    }

    #[test]
    fn display_validation() {
        let err = IoError::Validation {
            count: 2,
            details: "a; b".to_string(),
        };
        assert_eq!(err.to_string(), "2 validation error(s): a; b");
    }

    #[test]
    fn display_dimension_mismatch() {
        let err = IoError::DimensionMismatch {
            name: "rows".to_string(),
            expected: 10,
            got: 7,
        };
        assert_eq!(
            err.to_string(),
            "dimension 'rows' mismatch: expected 10, got 7"
        );
    }
}
