//! Arg-max reduction from class scores to class labels

use crate::types::{ClassScores, Predictions};
use anyhow::{bail, Result};
use ndarray::ArrayView1;

/// Index of the largest score in a row.
///
/// Ties go to the lowest index. A NaN is treated as larger than any number,
/// so the first NaN in the row wins. Returns `None` for an empty row.
pub fn argmax(row: ArrayView1<'_, f32>) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;

    for (index, &score) in row.iter().enumerate() {
        if score.is_nan() {
            return Some(index);
        }
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((index, score)),
        }
    }

    best.map(|(index, _)| index)
}

/// Reduce every score row to its arg-max, preserving sample order
pub fn predict_labels(scores: &ClassScores) -> Result<Predictions> {
    if scores.sample_count() > 0 && scores.class_count() == 0 {
        bail!("Model returned zero classes for {} samples", scores.sample_count());
    }

    let labels = scores
        .rows()
        .filter_map(argmax)
        .collect::<Vec<_>>();

    Ok(Predictions::new(labels))
}
