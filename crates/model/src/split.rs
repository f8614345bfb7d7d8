//! Consecutive train/test splitting.

use std::ops::Range;

use crate::error::ModelError;

/// Splits `n` ordered cases into a leading training block and a trailing
/// test block of `test_size` consecutive cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitConsecutive {
    test_size: usize,
}

impl SplitConsecutive {
    /// Creates a splitter holding out the final `test_size` cases.
    pub fn new(test_size: usize) -> Self {
        Self { test_size }
    }

    /// Number of held-out cases.
    pub fn test_size(&self) -> usize {
        self.test_size
    }

    /// `(train, test)` index ranges for `n` cases.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Validation`] unless both blocks are non-empty.
    pub fn split(&self, n: usize) -> Result<(Range<usize>, Range<usize>), ModelError> {
        if self.test_size == 0 || self.test_size >= n {
            return Err(ModelError::Validation {
                count: 1,
                details: format!(
                    "cannot hold out {} of {n} cases with a non-empty training block",
                    self.test_size
                ),
            });
        }
        let boundary = n - self.test_size;
        Ok((0..boundary, boundary..n))
    }
}
