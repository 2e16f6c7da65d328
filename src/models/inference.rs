//! Single-model inference engine over ONNX Runtime

use crate::config::ModelConfig;
use crate::models::loader::{LoadedModel, ModelLoader};
use crate::models::ClassScorer;
use crate::types::{ClassScores, TestSet};
use anyhow::{bail, Context, Result};
use ndarray::Array2;
use ort::value::Tensor;
use std::path::Path;
use tracing::{debug, info};

/// Runs the loaded classifier over a whole test set
pub struct InferenceEngine {
    model: LoadedModel,
}

impl InferenceEngine {
    /// Load the model described by the configuration
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let loader = ModelLoader::with_threads(config.onnx_threads)?;
        let model = loader.load(config)?;

        info!(path = %model.path.display(), "Inference engine initialized");

        Ok(Self { model })
    }

    /// File the model was loaded from
    pub fn model_path(&self) -> &Path {
        &self.model.path
    }

    /// Feed every sample to the model in one call and collect the score matrix
    pub fn predict(&mut self, test_set: &TestSet) -> Result<ClassScores> {
        let shape: Vec<i64> = test_set.shape().iter().map(|&d| d as i64).collect();
        let data: Vec<f32> = test_set.view().iter().copied().collect();

        let input_tensor =
            Tensor::from_array((shape, data)).context("Failed to create input tensor")?;

        let model = &mut self.model;
        let outputs = model
            .session
            .run(ort::inputs![&model.input_name => input_tensor])
            .with_context(|| {
                format!(
                    "Model run failed for input {:?} of shape {:?}",
                    model.input_name,
                    test_set.shape()
                )
            })?;

        let output = outputs
            .get(model.output_name.as_str())
            .with_context(|| format!("Model produced no output named {:?}", model.output_name))?;

        let (shape, data) = output
            .try_extract_tensor::<f32>()
            .with_context(|| format!("Output {:?} is not an f32 tensor", model.output_name))?;
        let dims: Vec<i64> = shape.iter().copied().collect();

        let scores = scores_from_raw(&dims, data)?;

        debug!(
            samples = scores.sample_count(),
            classes = scores.class_count(),
            "Inference complete"
        );

        Ok(scores)
    }
}

impl ClassScorer for InferenceEngine {
    fn score(&mut self, test_set: &TestSet) -> Result<ClassScores> {
        self.predict(test_set)
    }
}

/// Build the `N x C` score matrix from a flat row-major output buffer
fn scores_from_raw(dims: &[i64], data: &[f32]) -> Result<ClassScores> {
    let (rows, cols) = match dims {
        [rows, cols] if *rows >= 0 && *cols >= 0 => (*rows as usize, *cols as usize),
        _ => bail!("Expected a [samples, classes] score tensor, got shape {:?}", dims),
    };

    let matrix = Array2::from_shape_vec((rows, cols), data.to_vec())
        .with_context(|| format!("Score buffer does not match shape {:?}", dims))?;

    Ok(ClassScores::new(matrix))
}
