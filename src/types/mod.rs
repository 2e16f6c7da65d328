//! Type definitions for the inference runner

pub mod prediction;
pub mod test_set;

pub use prediction::{ClassScores, Predictions};
pub use test_set::TestSet;
