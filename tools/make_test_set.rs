//! Test Set Generator
//!
//! Writes a `.npz` archive of random features for manual runs of the
//! inference runner against a harness.

use anyhow::{Context, Result};
use clap::Parser;
use ndarray::{ArrayD, IxDyn};
use ndarray_npy::NpzWriter;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(about = "Generate a random test set archive")]
struct Args {
    /// Output archive
    #[arg(long, default_value = "test_set.npz")]
    out: PathBuf,

    /// Number of samples (axis 0)
    #[arg(long, default_value_t = 100)]
    samples: usize,

    /// Per-sample shape, e.g. `--features 28 28 1`
    #[arg(long, num_args = 1.., default_values_t = vec![32])]
    features: Vec<usize>,

    /// Archive entry name
    #[arg(long, default_value = "data")]
    key: String,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("make_test_set=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut shape = Vec::with_capacity(args.features.len() + 1);
    shape.push(args.samples);
    shape.extend_from_slice(&args.features);

    let data = ArrayD::from_shape_simple_fn(IxDyn(&shape), || rng.gen_range(0.0f32..1.0));

    let file = File::create(&args.out)
        .with_context(|| format!("Failed to create {}", args.out.display()))?;
    let mut npz = NpzWriter::new(file);
    npz.add_array(args.key.as_str(), &data)?;
    npz.finish()?;

    info!(
        path = %args.out.display(),
        key = %args.key,
        shape = ?shape,
        "Test set written"
    );

    Ok(())
}
