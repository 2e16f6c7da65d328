//! Inference Runner - Main Entry Point
//!
//! Loads the model, prints the readiness marker, reads a dataset archive
//! path from stdin and prints one predicted class per sample to stdout.

use anyhow::Result;
use clap::Parser;
use inference_runner::{
    config::AppConfig,
    logging,
    metrics::{RunMetrics, Stage},
    InferenceEngine, Runner,
};
use std::io::{self, BufWriter};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Configuration file (default: runner.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Model directory or .onnx file
    #[arg(long)]
    model: Option<PathBuf>,

    /// Archive entry holding the test set
    #[arg(long)]
    data_key: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    config.apply_cli(args.model, args.data_key);

    logging::init(&config.logging)?;
    info!(model = %config.model.path.display(), key = %config.dataset.key, "Starting inference runner");

    let mut metrics = RunMetrics::new();
    let engine = metrics.time(Stage::ModelLoad, || InferenceEngine::new(&config.model))?;
    info!(
        model = %engine.model_path().display(),
        load_ms = metrics.stage_duration(Stage::ModelLoad).as_millis() as u64,
        "Model ready"
    );

    let mut runner = Runner::new(engine, &config).with_metrics(metrics);

    let stdin = io::stdin();
    let stdout = io::stdout();
    runner.run(stdin.lock(), BufWriter::new(stdout.lock()))?;

    Ok(())
}
