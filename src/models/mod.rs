//! ML model inference components

pub mod argmax;
pub mod inference;
pub mod loader;

pub use argmax::predict_labels;
pub use inference::InferenceEngine;
pub use loader::ModelLoader;

use crate::types::{ClassScores, TestSet};
use anyhow::Result;

/// Anything that turns a test set into per-class scores in one call
pub trait ClassScorer {
    fn score(&mut self, test_set: &TestSet) -> Result<ClassScores>;
}
