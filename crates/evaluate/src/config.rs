//! Evaluation configuration.

/// Configuration for the diagnostic computations.
#[derive(Debug, Clone)]
pub struct EvaluateConfig {
    spread_skill_bins: usize,
    error_bins: usize,
}

impl Default for EvaluateConfig {
    fn default() -> Self {
        Self {
            spread_skill_bins: 10,
            error_bins: 20,
        }
    }
}

impl EvaluateConfig {
    /// Set the number of equal-count spread bins in the spread-skill diagnostic.
    pub fn with_spread_skill_bins(mut self, bins: usize) -> Self {
        self.spread_skill_bins = bins;
        self
    }

    /// Set the number of histogram bins for the error distribution.
    pub fn with_error_bins(mut self, bins: usize) -> Self {
        self.error_bins = bins;
        self
    }

    /// Returns the number of spread-skill bins (at least 1).
    pub fn spread_skill_bins(&self) -> usize {
        self.spread_skill_bins.max(1)
    }

    /// Returns the number of error histogram bins (at least 1).
    pub fn error_bins(&self) -> usize {
        self.error_bins.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = EvaluateConfig::default();
        assert_eq!(config.spread_skill_bins(), 10);
        assert_eq!(config.error_bins(), 20);
    }

    #[test]
    fn test_builder_methods() {
        let config = EvaluateConfig::default()
            .with_spread_skill_bins(5)
            .with_error_bins(40);
        assert_eq!(config.spread_skill_bins(), 5);
        assert_eq!(config.error_bins(), 40);
    }

    #[test]
    fn test_zero_bins_clamped() {
        let config = EvaluateConfig::default()
            .with_spread_skill_bins(0)
            .with_error_bins(0);
        assert_eq!(config.spread_skill_bins(), 1);
        assert_eq!(config.error_bins(), 1);
    }
}
