//! # mosx-model
//!
//! The trained MOS-X estimator as seen by the verification tool: loading the
//! model file, point/ensemble prediction, rain class probabilities,
//! WxChallenge scoring, consecutive splitting and learning curves.
//!
//! The estimator is a bagged ridge regression: each member is fitted on a
//! bootstrap resample, the point forecast is the member mean, and the
//! members form the ensemble forecast.

mod config;
mod error;
mod estimator;
mod learning_curve;
mod model_file;
mod predict;
mod ridge;
mod scoring;
mod split;

pub use config::{EstimatorConfig, RainForecastType, RainSpec};
pub use error::ModelError;
pub use estimator::{BaggedRidge, build_estimator};
pub use learning_curve::{LearningCurve, learning_curve};
pub use model_file::{TrainedModel, load_model, save_model};
pub use predict::{Predictions, predict_all, predict_rain_proba, rain_post_average};
pub use ridge::RidgeMember;
pub use scoring::{rain_points, wxchallenge_error, wxchallenge_scorer};
pub use split::SplitConsecutive;

pub use mosx_io::combine_train_test;
