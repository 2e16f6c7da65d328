//! Stage timings for a single run.
//!
//! Everything is reported through `tracing`, which writes to stderr, so the
//! harness channel on stdout stays clean.

use std::time::{Duration, Instant};
use tracing::info;

/// Phases of a run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ModelLoad,
    WaitForInput,
    DatasetLoad,
    Inference,
    Output,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::ModelLoad => "model_load",
            Stage::WaitForInput => "wait_for_input",
            Stage::DatasetLoad => "dataset_load",
            Stage::Inference => "inference",
            Stage::Output => "output",
        }
    }
}

/// Collected timings and counts for one run
#[derive(Debug)]
pub struct RunMetrics {
    stages: Vec<(Stage, Duration)>,
    samples: usize,
    /// Predictions per class, indexed by class
    class_counts: Vec<usize>,
    start_time: Instant,
}

impl RunMetrics {
    pub fn new() -> Self {
        Self {
            stages: Vec::with_capacity(5),
            samples: 0,
            class_counts: Vec::new(),
            start_time: Instant::now(),
        }
    }

    /// Record how long a stage took
    pub fn record_stage(&mut self, stage: Stage, duration: Duration) {
        self.stages.push((stage, duration));
    }

    /// Run `f`, recording its duration under `stage`
    pub fn time<T>(&mut self, stage: Stage, f: impl FnOnce() -> T) -> T {
        let started = Instant::now();
        let result = f();
        self.record_stage(stage, started.elapsed());
        result
    }

    pub fn set_samples(&mut self, samples: usize) {
        self.samples = samples;
    }

    pub fn set_class_counts(&mut self, class_counts: Vec<usize>) {
        self.class_counts = class_counts;
    }

    /// Share of predictions per class, in percent
    pub fn class_distribution(&self) -> Vec<f64> {
        let total: usize = self.class_counts.iter().sum();
        self.class_counts
            .iter()
            .map(|&count| {
                if total > 0 {
                    count as f64 / total as f64 * 100.0
                } else {
                    0.0
                }
            })
            .collect()
    }

    /// Total time recorded for a stage
    pub fn stage_duration(&self, stage: Stage) -> Duration {
        self.stages
            .iter()
            .filter(|(s, _)| *s == stage)
            .map(|(_, d)| *d)
            .sum()
    }

    /// Samples per second of pure inference time
    pub fn throughput(&self) -> f64 {
        let secs = self.stage_duration(Stage::Inference).as_secs_f64();
        if secs > 0.0 {
            self.samples as f64 / secs
        } else {
            0.0
        }
    }

    /// Emit a single summary event
    pub fn print_summary(&self) {
        let ms = |stage| self.stage_duration(stage).as_secs_f64() * 1000.0;
        let class_share: Vec<String> = self
            .class_distribution()
            .iter()
            .map(|share| format!("{:.1}%", share))
            .collect();

        info!(
            samples = self.samples,
            model_load_ms = format!("{:.1}", ms(Stage::ModelLoad)),
            wait_ms = format!("{:.1}", ms(Stage::WaitForInput)),
            dataset_load_ms = format!("{:.1}", ms(Stage::DatasetLoad)),
            inference_ms = format!("{:.1}", ms(Stage::Inference)),
            output_ms = format!("{:.1}", ms(Stage::Output)),
            throughput = format!("{:.1} samples/s", self.throughput()),
            class_counts = ?self.class_counts,
            class_share = ?class_share,
            total_ms = format!("{:.1}", self.start_time.elapsed().as_secs_f64() * 1000.0),
            "Run complete"
        );
    }
}

impl Default for RunMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_recording() {
        let mut metrics = RunMetrics::new();
        metrics.record_stage(Stage::Inference, Duration::from_millis(200));
        metrics.record_stage(Stage::Inference, Duration::from_millis(300));
        metrics.record_stage(Stage::Output, Duration::from_millis(5));

        assert_eq!(metrics.stage_duration(Stage::Inference), Duration::from_millis(500));
        assert_eq!(metrics.stage_duration(Stage::DatasetLoad), Duration::ZERO);
    }

    #[test]
    fn test_throughput() {
        let mut metrics = RunMetrics::new();
        assert_eq!(metrics.throughput(), 0.0);

        metrics.set_samples(1000);
        metrics.record_stage(Stage::Inference, Duration::from_millis(500));
        assert!((metrics.throughput() - 2000.0).abs() < 1e-6);
    }

    #[test]
    fn test_class_distribution() {
        let mut metrics = RunMetrics::new();
        assert!(metrics.class_distribution().is_empty());

        metrics.set_class_counts(vec![1, 0, 3]);
        assert_eq!(metrics.class_distribution(), vec![25.0, 0.0, 75.0]);
    }

    #[test]
    fn test_time_returns_result() {
        let mut metrics = RunMetrics::new();
        let value = metrics.time(Stage::DatasetLoad, || 42);
        assert_eq!(value, 42);
        assert_eq!(metrics.stages.len(), 1);
    }
}
