//! Model outputs: raw class scores and the labels derived from them

use ndarray::{Array2, ArrayView1};
use std::fmt;

/// Per-sample, per-class scores returned by the model (`N x C`)
#[derive(Debug, Clone, PartialEq)]
pub struct ClassScores {
    scores: Array2<f32>,
}

impl ClassScores {
    pub fn new(scores: Array2<f32>) -> Self {
        Self { scores }
    }

    /// Number of rows (samples)
    pub fn sample_count(&self) -> usize {
        self.scores.nrows()
    }

    /// Number of columns (classes)
    pub fn class_count(&self) -> usize {
        self.scores.ncols()
    }

    /// Iterate the score rows in sample order
    pub fn rows(&self) -> impl Iterator<Item = ArrayView1<'_, f32>> {
        self.scores.rows().into_iter()
    }
}

/// One class index per sample, in input order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predictions {
    labels: Vec<usize>,
}

impl Predictions {
    pub fn new(labels: Vec<usize>) -> Self {
        Self { labels }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Count of predictions per class, up to the largest predicted class
    pub fn class_histogram(&self) -> Vec<usize> {
        let classes = self.labels.iter().max().map_or(0, |&max| max + 1);
        let mut counts = vec![0; classes];
        for &label in &self.labels {
            counts[label] += 1;
        }
        counts
    }
}

impl fmt::Display for Predictions {
    /// One label per line, each line terminated
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for label in &self.labels {
            writeln!(f, "{}", label)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_class_scores_dimensions() {
        let scores = ClassScores::new(array![[0.1, 0.9], [0.8, 0.2], [0.3, 0.7]]);
        assert_eq!(scores.sample_count(), 3);
        assert_eq!(scores.class_count(), 2);
        assert_eq!(scores.rows().count(), 3);
    }

    #[test]
    fn test_predictions_display() {
        let predictions = Predictions::new(vec![1, 0, 1]);
        assert_eq!(predictions.to_string(), "1\n0\n1\n");
        assert_eq!(Predictions::default().to_string(), "");
    }

    #[test]
    fn test_class_histogram() {
        let predictions = Predictions::new(vec![2, 0, 2, 1, 2]);
        assert_eq!(predictions.class_histogram(), vec![1, 1, 3]);

        let sparse = Predictions::new(vec![3, 3]);
        assert_eq!(sparse.class_histogram(), vec![0, 0, 0, 2]);
        assert!(Predictions::default().class_histogram().is_empty());
    }
}
