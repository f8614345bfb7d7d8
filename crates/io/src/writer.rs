//! High-level Parquet writer configuration and orchestration.

use std::path::Path;

use parquet::file::properties::WriterProperties;
use tracing::info;

use crate::bundle::PredictorBundle;
use crate::error::IoError;
use crate::parquet_write;

/// Compression algorithm for Parquet output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Compression {
    /// No compression.
    None,
    /// Snappy compression (fast, moderate ratio).
    #[default]
    Snappy,
}

impl Compression {
    /// Converts to the corresponding `parquet::basic::Compression` variant.
    fn to_parquet(self) -> parquet::basic::Compression {
        match self {
            Self::None => parquet::basic::Compression::UNCOMPRESSED,
            Self::Snappy => parquet::basic::Compression::SNAPPY,
        }
    }
}

/// Configuration for writing predictor bundles to Parquet.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Compression algorithm to use.
    compression: Compression,
    /// Maximum number of rows per row group.
    row_group_size: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::default(),
            row_group_size: 1_000_000,
        }
    }
}

impl WriterConfig {
    /// Sets the compression algorithm.
    pub fn with_compression(mut self, comp: Compression) -> Self {
        self.compression = comp;
        self
    }

    /// Sets the maximum number of rows per row group.
    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Validates this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Validation`] if `row_group_size` is zero.
    fn validate(&self) -> Result<(), IoError> {
        if self.row_group_size == 0 {
            return Err(IoError::Validation {
                count: 1,
                details: "row_group_size must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

/// Write a predictor bundle to a Parquet file.
///
/// # Errors
///
/// Returns [`IoError::Validation`] if the configuration is invalid, or
/// [`IoError::Parquet`] if batch conversion or file I/O fails.
pub fn write_bundle(
    path: &Path,
    bundle: &PredictorBundle,
    config: &WriterConfig,
) -> Result<(), IoError> {
    config.validate()?;

    let schema = parquet_write::build_schema(bundle);
    let props = WriterProperties::builder()
        .set_compression(config.compression.to_parquet())
        .set_max_row_group_size(config.row_group_size)
        .build();

    let batch = parquet_write::bundle_to_record_batch(bundle, &schema)?;
    parquet_write::write_batches(path, &[batch], &schema, props)?;

    info!(path = %path.display(), n_cases = bundle.n_cases(), "predictor bundle written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = WriterConfig::default();
        assert_eq!(config.compression, Compression::Snappy);
        assert_eq!(config.row_group_size, 1_000_000);
    }

    #[test]
    fn builder_methods() {
        let config = WriterConfig::default()
            .with_compression(Compression::None)
            .with_row_group_size(500);
        assert_eq!(config.compression, Compression::None);
        assert_eq!(config.row_group_size, 500);
    }

    #[test]
    fn validate_zero_row_group_size() {
        let config = WriterConfig::default().with_row_group_size(0);
        match config.validate().unwrap_err() {
            IoError::Validation { count, details } => {
                assert_eq!(count, 1);
                assert!(details.contains("row_group_size"));
            }
            _ => panic!("expected Validation error"),
        }
    }
}
