//! # mosx-io
//!
//! The predictor bundle (`BUFKIT`, `OBS`, `VERIF` column groups) and its
//! Parquet on-disk form. Bridges predictor files into the dense [`Matrix`]
//! type the model and evaluation crates work on.

mod bundle;
mod ensemble;
mod error;
mod matrix;
mod parquet_read;
mod parquet_write;
mod reader;
mod writer;

pub use bundle::{
    ColumnGroup, Group, N_TARGETS, PredictorBundle, RAIN_INDEX, TARGET_NAMES, combine_train_test,
};
pub use ensemble::Ensemble;
pub use error::IoError;
pub use matrix::Matrix;
pub use reader::read_bundle;
pub use writer::{Compression, WriterConfig, write_bundle};
