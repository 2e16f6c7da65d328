//! Inference Runner Library
//!
//! Loads a pre-trained ONNX classifier, synchronises with an external
//! evaluation harness over stdio and prints one arg-max class label per
//! test sample.

pub mod config;
pub mod dataset;
pub mod harness;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod runner;
pub mod types;

pub use config::AppConfig;
pub use dataset::DatasetLoader;
pub use harness::HarnessChannel;
pub use models::{ClassScorer, InferenceEngine};
pub use runner::Runner;
pub use types::{ClassScores, Predictions, TestSet};
