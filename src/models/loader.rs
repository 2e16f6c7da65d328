//! ONNX model loader

use crate::config::ModelConfig;
use anyhow::{bail, Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File looked up inside a model directory
pub const MODEL_FILE_NAME: &str = "model.onnx";

/// Loaded ONNX model with metadata
pub struct LoadedModel {
    /// File the session was built from
    pub path: PathBuf,
    /// ONNX Runtime session
    pub session: Session,
    /// Graph input fed with the test set
    pub input_name: String,
    /// Graph output holding class scores
    pub output_name: String,
}

/// Loader for ONNX models
pub struct ModelLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ModelLoader {
    /// Create a new model loader with specified number of threads
    pub fn with_threads(onnx_threads: usize) -> Result<Self> {
        ort::init().commit()?;
        debug!(onnx_threads = onnx_threads, "ONNX Runtime initialized");
        Ok(Self { onnx_threads })
    }

    /// Load the model described by the configuration
    pub fn load(&self, config: &ModelConfig) -> Result<LoadedModel> {
        let path = resolve_model_path(&config.path)?;
        self.load_model(
            &path,
            config.input_name.as_deref(),
            config.output_name.as_deref(),
        )
    }

    /// Load a single ONNX model file.
    ///
    /// Without explicit names the first graph input and the first graph
    /// output are used.
    pub fn load_model(
        &self,
        path: &Path,
        input_name: Option<&str>,
        output_name: Option<&str>,
    ) -> Result<LoadedModel> {
        info!(path = %path.display(), threads = self.onnx_threads, "Loading ONNX model");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(self.onnx_threads)?
            .commit_from_file(path)
            .with_context(|| format!("Failed to load model from {}", path.display()))?;

        let input_name = pick_name(
            session.inputs.iter().map(|i| i.name.as_str()),
            input_name,
            "input",
        )?;
        let output_name = pick_name(
            session.outputs.iter().map(|o| o.name.as_str()),
            output_name,
            "output",
        )?;

        info!(
            input = %input_name,
            output = %output_name,
            "Model loaded successfully"
        );

        Ok(LoadedModel {
            path: path.to_path_buf(),
            session,
            input_name,
            output_name,
        })
    }
}

/// Resolve the configured model location to an `.onnx` file.
///
/// A file is used as is. A directory must contain `model.onnx`, or exactly
/// one `.onnx` file.
pub fn resolve_model_path(path: &Path) -> Result<PathBuf> {
    let metadata = fs::metadata(path)
        .with_context(|| format!("Model path {} is not accessible", path.display()))?;

    if metadata.is_file() {
        return Ok(path.to_path_buf());
    }

    let conventional = path.join(MODEL_FILE_NAME);
    if conventional.is_file() {
        return Ok(conventional);
    }

    let mut candidates = Vec::new();
    for entry in fs::read_dir(path)
        .with_context(|| format!("Failed to list model directory {}", path.display()))?
    {
        let candidate = entry?.path();
        if candidate.is_file() && candidate.extension().is_some_and(|ext| ext == "onnx") {
            candidates.push(candidate);
        }
    }

    match candidates.len() {
        1 => Ok(candidates.remove(0)),
        0 => bail!("No .onnx model found in {}", path.display()),
        n => bail!(
            "{} .onnx files in {}, expected {} or a single model",
            n,
            path.display(),
            MODEL_FILE_NAME
        ),
    }
}

/// Pick the requested graph port, or the first one when none is requested
fn pick_name<'a>(
    mut available: impl Iterator<Item = &'a str> + Clone,
    requested: Option<&str>,
    kind: &str,
) -> Result<String> {
    match requested {
        Some(name) => {
            if available.clone().any(|n| n == name) {
                Ok(name.to_string())
            } else {
                bail!(
                    "Model has no {} named {:?} (available: {:?})",
                    kind,
                    name,
                    available.collect::<Vec<_>>()
                )
            }
        }
        None => available
            .next()
            .map(str::to_string)
            .with_context(|| format!("Model declares no {}", kind)),
    }
}
