//! Estimator and rain-forecast configuration.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Configuration for the bagged ridge estimator.
///
/// Use the builder methods to customise parameters.
///
/// # Example
///
/// ```
/// use mosx_model::EstimatorConfig;
///
/// let config = EstimatorConfig::new()
///     .with_alpha(0.5)
///     .with_n_members(20);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    alpha: f64,
    n_members: usize,
    max_samples: f64,
    seed: u64,
}

impl EstimatorConfig {
    /// Creates a new configuration with defaults.
    ///
    /// Defaults: `alpha = 1.0`, `n_members = 10`, `max_samples = 1.0`,
    /// `seed = 0`.
    pub fn new() -> Self {
        Self {
            alpha: 1.0,
            n_members: 10,
            max_samples: 1.0,
            seed: 0,
        }
    }

    /// Sets the ridge penalty.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Sets the number of bagged members.
    pub fn with_n_members(mut self, n: usize) -> Self {
        self.n_members = n;
        self
    }

    /// Sets the bootstrap sample size as a fraction of the training rows.
    pub fn with_max_samples(mut self, fraction: f64) -> Self {
        self.max_samples = fraction;
        self
    }

    /// Sets the RNG seed used for bootstrap resampling.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Returns the ridge penalty.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Returns the number of bagged members.
    pub fn n_members(&self) -> usize {
        self.n_members
    }

    /// Returns the bootstrap sample fraction.
    pub fn max_samples(&self) -> f64 {
        self.max_samples
    }

    /// Returns the RNG seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Validates this configuration.
    ///
    /// Checks that `alpha` is finite and non-negative, `n_members >= 1`, and
    /// `max_samples` is in `(0, 1]`.
    pub fn validate(&self) -> Result<(), ModelError> {
        if !self.alpha.is_finite() || self.alpha < 0.0 {
            return Err(ModelError::InvalidConfig {
                reason: format!("alpha must be finite and non-negative, got {}", self.alpha),
            });
        }
        if self.n_members == 0 {
            return Err(ModelError::InvalidConfig {
                reason: "n_members must be at least 1".to_string(),
            });
        }
        if !self.max_samples.is_finite() || self.max_samples <= 0.0 || self.max_samples > 1.0 {
            return Err(ModelError::InvalidConfig {
                reason: format!("max_samples must be in (0, 1], got {}", self.max_samples),
            });
        }
        Ok(())
    }
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// How the model forecasts rain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RainForecastType {
    /// Liquid-equivalent amount.
    #[default]
    Quantity,
    /// One of several amount categories; VERIF stores the class label.
    Categorical,
    /// Probability of precipitation; VERIF stores 0 (dry) or 1 (wet).
    Pop,
}

impl RainForecastType {
    /// Parses the configuration keyword (`quantity`, `categorical`, `pop`).
    pub fn parse(s: &str) -> Result<Self, ModelError> {
        match s {
            "quantity" => Ok(Self::Quantity),
            "categorical" => Ok(Self::Categorical),
            "pop" => Ok(Self::Pop),
            other => Err(ModelError::InvalidConfig {
                reason: format!(
                    "unknown rain_forecast_type '{other}' (expected quantity, categorical or pop)"
                ),
            }),
        }
    }

    /// Whether rain is scored as class probabilities (Brier score applies).
    pub fn is_probabilistic(self) -> bool {
        matches!(self, Self::Categorical | Self::Pop)
    }
}

/// Rain handling for prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct RainSpec {
    forecast_type: RainForecastType,
    categories: Vec<f64>,
    predictors: Vec<String>,
}

impl RainSpec {
    /// Creates a spec for the given forecast type with no category
    /// thresholds and no raw-model rain predictors.
    pub fn new(forecast_type: RainForecastType) -> Self {
        Self {
            forecast_type,
            categories: Vec::new(),
            predictors: Vec::new(),
        }
    }

    /// Sets the lower bounds of the rain categories (ascending).
    pub fn with_categories(mut self, categories: Vec<f64>) -> Self {
        self.categories = categories;
        self
    }

    /// Sets the predictor columns holding raw-model rain amounts, used by the
    /// naive rain correction.
    pub fn with_predictors(mut self, predictors: Vec<String>) -> Self {
        self.predictors = predictors;
        self
    }

    /// Returns the forecast type.
    pub fn forecast_type(&self) -> RainForecastType {
        self.forecast_type
    }

    /// Returns the category lower bounds.
    pub fn categories(&self) -> &[f64] {
        &self.categories
    }

    /// Returns the raw-model rain predictor names.
    pub fn predictors(&self) -> &[String] {
        &self.predictors
    }

    /// Number of rain classes: the category count for `Categorical`, 2 for
    /// `Pop`, and 0 for `Quantity`.
    pub fn n_classes(&self) -> usize {
        match self.forecast_type {
            RainForecastType::Quantity => 0,
            RainForecastType::Categorical => self.categories.len(),
            RainForecastType::Pop => 2,
        }
    }

    /// Validates this spec.
    ///
    /// `Categorical` needs at least two strictly increasing, finite category
    /// bounds.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.forecast_type != RainForecastType::Categorical {
            return Ok(());
        }
        if self.categories.len() < 2 {
            return Err(ModelError::InvalidConfig {
                reason: format!(
                    "categorical rain needs at least 2 rain_categories, got {}",
                    self.categories.len()
                ),
            });
        }
        if self.categories.iter().any(|c| !c.is_finite())
            || self.categories.windows(2).any(|w| w[1] <= w[0])
        {
            return Err(ModelError::InvalidConfig {
                reason: "rain_categories must be finite and strictly increasing".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for RainSpec {
    fn default() -> Self {
        Self::new(RainForecastType::Quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = EstimatorConfig::new();
        assert!((cfg.alpha() - 1.0).abs() < f64::EPSILON);
        assert_eq!(cfg.n_members(), 10);
        assert!((cfg.max_samples() - 1.0).abs() < f64::EPSILON);
        assert_eq!(cfg.seed(), 0);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn builder_methods() {
        let cfg = EstimatorConfig::new()
            .with_alpha(2.0)
            .with_n_members(3)
            .with_max_samples(0.5)
            .with_seed(9);
        assert_eq!(cfg.n_members(), 3);
        assert_eq!(cfg.seed(), 9);
        assert!((cfg.max_samples() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert!(EstimatorConfig::new().with_alpha(-1.0).validate().is_err());
        assert!(EstimatorConfig::new().with_alpha(f64::NAN).validate().is_err());
        assert!(EstimatorConfig::new().with_n_members(0).validate().is_err());
        assert!(EstimatorConfig::new().with_max_samples(0.0).validate().is_err());
        assert!(EstimatorConfig::new().with_max_samples(1.5).validate().is_err());
    }

    #[test]
    fn estimator_config_serde_round_trip() {
        let cfg = EstimatorConfig::new().with_alpha(0.25).with_seed(7);
        let json = serde_json::to_string(&cfg).unwrap();
        let back: EstimatorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn rain_type_parse() {
        assert_eq!(
            RainForecastType::parse("quantity").unwrap(),
            RainForecastType::Quantity
        );
        assert_eq!(RainForecastType::parse("pop").unwrap(), RainForecastType::Pop);
        assert!(RainForecastType::parse("snow").is_err());
        assert!(RainForecastType::Categorical.is_probabilistic());
        assert!(!RainForecastType::Quantity.is_probabilistic());
    }

    #[test]
    fn rain_spec_classes() {
        assert_eq!(RainSpec::default().n_classes(), 0);
        assert_eq!(RainSpec::new(RainForecastType::Pop).n_classes(), 2);
        let cat = RainSpec::new(RainForecastType::Categorical)
            .with_categories(vec![0.0, 0.01, 0.1, 0.25]);
        assert_eq!(cat.n_classes(), 4);
        assert!(cat.validate().is_ok());
    }

    #[test]
    fn rain_spec_validate() {
        let too_few = RainSpec::new(RainForecastType::Categorical).with_categories(vec![0.0]);
        assert!(too_few.validate().is_err());
        let unsorted =
            RainSpec::new(RainForecastType::Categorical).with_categories(vec![0.0, 0.5, 0.1]);
        assert!(unsorted.validate().is_err());
        assert!(RainSpec::new(RainForecastType::Pop).validate().is_ok());
    }
}
