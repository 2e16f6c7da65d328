//! Test set loaded from a dataset archive

use anyhow::{bail, Result};
use ndarray::{ArrayD, ArrayViewD, Axis};

/// Feature tensor for N samples, sample axis first.
///
/// Every element has already been converted to `f32`, the element type the
/// model is fed with.
#[derive(Debug, Clone, PartialEq)]
pub struct TestSet {
    data: ArrayD<f32>,
}

impl TestSet {
    /// Wrap a feature tensor. Rank 0 has no sample axis and is rejected.
    pub fn new(data: ArrayD<f32>) -> Result<Self> {
        if data.ndim() == 0 {
            bail!("Test set must have a sample axis, got a scalar");
        }
        Ok(Self { data })
    }

    /// Number of samples (length of axis 0)
    pub fn sample_count(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    pub fn is_empty(&self) -> bool {
        self.sample_count() == 0
    }

    /// Full shape including the sample axis
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Shape of a single sample
    pub fn sample_shape(&self) -> &[usize] {
        &self.data.shape()[1..]
    }

    pub fn view(&self) -> ArrayViewD<'_, f32> {
        self.data.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr0, Array, IxDyn};

    #[test]
    fn test_sample_count_and_shape() {
        let data = Array::<f32, _>::zeros(IxDyn(&[4, 28, 28]));
        let set = TestSet::new(data).unwrap();

        assert_eq!(set.sample_count(), 4);
        assert_eq!(set.sample_shape(), &[28, 28]);
        assert!(!set.is_empty());
    }

    #[test]
    fn test_empty_set() {
        let data = Array::<f32, _>::zeros(IxDyn(&[0, 3]));
        let set = TestSet::new(data).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_scalar_rejected() {
        assert!(TestSet::new(arr0(1.0f32).into_dyn()).is_err());
    }
}
