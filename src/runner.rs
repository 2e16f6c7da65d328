//! Sequencing of a single evaluation run

use crate::config::AppConfig;
use crate::dataset::DatasetLoader;
use crate::harness::HarnessChannel;
use crate::metrics::{RunMetrics, Stage};
use crate::models::{predict_labels, ClassScorer};
use crate::types::{Predictions, TestSet};
use anyhow::{bail, Result};
use std::io::{BufRead, Write};
use tracing::{debug, info};

/// Drives one run: ready marker, dataset path, inference, labels.
///
/// The scorer is loaded before the runner is built, so a model that fails
/// to load never produces the readiness marker.
pub struct Runner<S> {
    scorer: S,
    dataset: DatasetLoader,
    ready_marker: String,
    metrics: RunMetrics,
}

impl<S: ClassScorer> Runner<S> {
    pub fn new(scorer: S, config: &AppConfig) -> Self {
        Self {
            scorer,
            dataset: DatasetLoader::new(config.dataset.key.clone()),
            ready_marker: config.harness.ready_marker.clone(),
            metrics: RunMetrics::new(),
        }
    }

    /// Continue with metrics that already hold earlier stages (model load)
    pub fn with_metrics(mut self, metrics: RunMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Speak the harness protocol over `input`/`output` until predictions are written
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, output: W) -> Result<Predictions> {
        let mut harness = HarnessChannel::new(input, output, &self.ready_marker);
        harness.signal_ready()?;

        let path = self
            .metrics
            .time(Stage::WaitForInput, || harness.read_dataset_path())?;

        let dataset = &self.dataset;
        let test_set = self.metrics.time(Stage::DatasetLoad, || dataset.load(&path))?;
        self.metrics.set_samples(test_set.sample_count());

        let scorer = &mut self.scorer;
        let predictions = self
            .metrics
            .time(Stage::Inference, || predict(scorer, &test_set))?;

        self.metrics
            .time(Stage::Output, || harness.emit_predictions(&predictions))?;

        self.metrics.set_class_counts(predictions.class_histogram());
        info!(predictions = predictions.len(), "Predictions written");
        self.metrics.print_summary();

        Ok(predictions)
    }
}

/// Score the whole test set in one call and reduce each row to its arg-max.
///
/// An empty test set never reaches the scorer.
pub fn predict<S: ClassScorer>(scorer: &mut S, test_set: &TestSet) -> Result<Predictions> {
    if test_set.is_empty() {
        debug!("Empty test set, skipping inference");
        return Ok(Predictions::default());
    }

    let scores = scorer.score(test_set)?;
    if scores.sample_count() != test_set.sample_count() {
        bail!(
            "Model returned {} score rows for {} samples",
            scores.sample_count(),
            test_set.sample_count()
        );
    }

    predict_labels(&scores)
}
