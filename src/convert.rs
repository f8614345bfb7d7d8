//! Pure conversion functions: TOML config structs -> crate API config types.

use anyhow::{Context, Result};

use mosx_evaluate::EvaluateConfig;
use mosx_model::{EstimatorConfig, RainForecastType, RainSpec};

use crate::config::{EstimatorToml, ModelToml, PlotToml};

/// Builds a validated [`RainSpec`] from the TOML model configuration.
pub fn build_rain_spec(model: &ModelToml) -> Result<RainSpec> {
    let forecast_type = RainForecastType::parse(&model.rain_forecast_type)?;
    let spec = RainSpec::new(forecast_type)
        .with_categories(model.rain_categories.clone())
        .with_predictors(model.rain_predictors.clone());
    spec.validate().context("invalid rain settings in [model]")?;
    Ok(spec)
}

/// Builds an [`EstimatorConfig`] from the TOML estimator configuration.
pub fn build_estimator_config(est: &EstimatorToml) -> Result<EstimatorConfig> {
    let cfg = EstimatorConfig::new()
        .with_alpha(est.alpha)
        .with_n_members(est.n_members)
        .with_max_samples(est.max_samples)
        .with_seed(est.seed);
    cfg.validate().context("invalid [model.estimator] settings")?;
    Ok(cfg)
}

/// Builds an [`EvaluateConfig`] from the TOML plot configuration.
pub fn build_evaluate_config(plot: &PlotToml) -> EvaluateConfig {
    EvaluateConfig::default()
        .with_spread_skill_bins(plot.spread_skill_bins)
        .with_error_bins(plot.error_bins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn model_toml(kind: &str, categories: Vec<f64>) -> ModelToml {
        ModelToml {
            estimator_file: PathBuf::from("m.json"),
            predictors_file: None,
            rain_forecast_type: kind.to_string(),
            rain_categories: categories,
            rain_predictors: vec!["BUFKIT/qpf".to_string()],
            rain_tuning: false,
            estimator: None,
        }
    }

    #[test]
    fn rain_spec_from_toml() {
        let spec = build_rain_spec(&model_toml("categorical", vec![0.0, 0.1, 0.5])).unwrap();
        assert_eq!(spec.forecast_type(), RainForecastType::Categorical);
        assert_eq!(spec.n_classes(), 3);
        assert_eq!(spec.predictors(), &["BUFKIT/qpf".to_string()]);
    }

    #[test]
    fn rain_spec_rejects_unknown_type() {
        assert!(build_rain_spec(&model_toml("hail", vec![])).is_err());
    }

    #[test]
    fn rain_spec_rejects_bad_categories() {
        assert!(build_rain_spec(&model_toml("categorical", vec![0.5])).is_err());
    }

    #[test]
    fn estimator_config_from_toml() {
        let est = EstimatorToml {
            alpha: 0.5,
            n_members: 3,
            max_samples: 0.8,
            seed: 9,
        };
        let cfg = build_estimator_config(&est).unwrap();
        assert_eq!(cfg.n_members(), 3);
        assert_eq!(cfg.seed(), 9);

        let bad = EstimatorToml { n_members: 0, ..est };
        assert!(build_estimator_config(&bad).is_err());
    }

    #[test]
    fn evaluate_config_from_toml() {
        let plot = PlotToml {
            spread_skill_bins: 4,
            ..PlotToml::default()
        };
        let cfg = build_evaluate_config(&plot);
        assert_eq!(cfg.spread_skill_bins(), 4);
        assert_eq!(cfg.error_bins(), 20);
    }
}
