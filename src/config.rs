use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level MOS-X site configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MosxConfig {
    /// Station identifier, used in derived file names.
    pub station_id: String,

    /// Directory holding the site's model and predictor files.
    pub site_root: PathBuf,

    /// Validation period settings.
    pub validate: ValidateToml,

    /// Trained model settings.
    pub model: ModelToml,

    /// Plot settings.
    #[serde(default)]
    pub plot: PlotToml,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidateToml {
    /// Last date of the validation period, as written in file names.
    pub end_date: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelToml {
    pub estimator_file: PathBuf,
    /// Training predictor bundle, used by the learning curve.
    #[serde(default)]
    pub predictors_file: Option<PathBuf>,
    #[serde(default = "default_rain_forecast_type")]
    pub rain_forecast_type: String,
    #[serde(default)]
    pub rain_categories: Vec<f64>,
    #[serde(default)]
    pub rain_predictors: Vec<String>,
    #[serde(default)]
    pub rain_tuning: bool,
    /// Estimator refitted by the learning curve. Falls back to the trained
    /// model's own settings when absent.
    #[serde(default)]
    pub estimator: Option<EstimatorToml>,
}

fn default_rain_forecast_type() -> String {
    "quantity".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EstimatorToml {
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default = "default_n_members")]
    pub n_members: usize,
    #[serde(default = "default_max_samples")]
    pub max_samples: f64,
    #[serde(default)]
    pub seed: u64,
}

fn default_alpha() -> f64 {
    1.0
}
fn default_n_members() -> usize {
    10
}
fn default_max_samples() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlotToml {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_learning_curve_points")]
    pub learning_curve_points: usize,
    #[serde(default = "default_spread_skill_bins")]
    pub spread_skill_bins: usize,
    #[serde(default = "default_error_bins")]
    pub error_bins: usize,
}

impl Default for PlotToml {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            learning_curve_points: default_learning_curve_points(),
            spread_skill_bins: default_spread_skill_bins(),
            error_bins: default_error_bins(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_learning_curve_points() -> usize {
    10
}
fn default_spread_skill_bins() -> usize {
    10
}
fn default_error_bins() -> usize {
    20
}

impl MosxConfig {
    /// Read and parse a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let toml_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        toml::from_str(&toml_str)
            .with_context(|| format!("failed to parse TOML config: {}", path.display()))
    }

    /// The verification predictor bundle,
    /// `<site_root>/<station_id>_CV_<end_date>_predictors.parquet`.
    pub fn predictor_path(&self) -> PathBuf {
        self.site_root.join(format!(
            "{}_CV_{}_predictors.parquet",
            self.station_id, self.validate.end_date
        ))
    }

    /// The trained model file, resolved against `site_root`.
    pub fn estimator_path(&self) -> PathBuf {
        self.site_root.join(&self.model.estimator_file)
    }

    /// The training predictor bundle, resolved against `site_root`.
    pub fn training_predictors_path(&self) -> Option<PathBuf> {
        self.model
            .predictors_file
            .as_ref()
            .map(|p| self.site_root.join(p))
    }
}
