//! Dataset archive loading.
//!
//! A dataset archive is a NumPy `.npz` file. The runner reads a single
//! named entry from it and converts the elements to `f32`, the element type
//! the model is fed with.

use crate::types::TestSet;
use anyhow::{anyhow, bail, Context, Result};
use ndarray::{ArrayD, IxDyn, OwnedRepr};
use ndarray_npy::{NpzReader, ReadNpyError, ReadNpzError, ReadableElement};
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use tracing::{debug, info};

/// Reads test sets out of `.npz` archives
pub struct DatasetLoader {
    /// Entry holding the feature tensor
    key: String,
}

impl DatasetLoader {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Open the archive at `path` and load the configured entry
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<TestSet> {
        let path = path.as_ref();
        info!(path = %path.display(), key = %self.key, "Loading test set");

        let file = File::open(path)
            .with_context(|| format!("Failed to open dataset archive {}", path.display()))?;
        let mut npz = NpzReader::new(file)
            .with_context(|| format!("{} is not a valid .npz archive", path.display()))?;

        let test_set = self
            .read_entry(&mut npz)
            .with_context(|| format!("Failed to read test set from {}", path.display()))?;

        info!(
            samples = test_set.sample_count(),
            sample_shape = ?test_set.sample_shape(),
            "Test set loaded"
        );

        Ok(test_set)
    }

    /// Locate the entry and decode it with whichever element type it holds
    pub fn read_entry<R: Read + Seek>(&self, npz: &mut NpzReader<R>) -> Result<TestSet> {
        let names = npz.names().context("Failed to list archive entries")?;
        let index = resolve_entry(&names, &self.key).ok_or_else(|| {
            anyhow!("Archive has no entry {:?} (entries: {:?})", self.key, names)
        })?;

        let data = read_as_f32(npz, index)
            .with_context(|| format!("Failed to decode entry {:?}", names[index]))?;
        debug!(entry = %names[index], shape = ?data.shape(), "Decoded archive entry");

        TestSet::new(data)
    }
}

impl Default for DatasetLoader {
    fn default() -> Self {
        Self::new("data")
    }
}

/// Index of the entry for `key`.
///
/// `np.savez` stores `key` as `key.npy`; either spelling is accepted.
fn resolve_entry(names: &[String], key: &str) -> Option<usize> {
    let with_suffix = format!("{}.npy", key);
    names
        .iter()
        .position(|name| name == key)
        .or_else(|| names.iter().position(|name| *name == with_suffix))
}

/// Element types accepted in an archive entry, tried in this order
const SUPPORTED_TYPES: &str = "f32, f64, i64, i32 or u8";

/// `Ok(None)` when the entry holds a different element type
fn decoded<T>(result: Result<ArrayD<T>, ReadNpzError>) -> Result<Option<ArrayD<T>>> {
    match result {
        Ok(array) => Ok(Some(array)),
        Err(ReadNpzError::Npy(ReadNpyError::WrongDescriptor(_))) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn read_typed<R, T>(npz: &mut NpzReader<R>, index: usize) -> Result<Option<ArrayD<f32>>>
where
    R: Read + Seek,
    T: ReadableElement + Copy + Into<f64>,
{
    let array = decoded(npz.by_index::<OwnedRepr<T>, IxDyn>(index))?;
    Ok(array.map(|a| a.mapv(|v| Into::<f64>::into(v) as f32)))
}

/// Decode an entry holding any supported element type as `f32`.
///
/// Only an element type mismatch moves on to the next type; any other
/// failure (truncated data, bad header, zip error) is returned as is.
fn read_as_f32<R: Read + Seek>(npz: &mut NpzReader<R>, index: usize) -> Result<ArrayD<f32>> {
    if let Some(array) = decoded(npz.by_index::<OwnedRepr<f32>, IxDyn>(index))? {
        return Ok(array);
    }
    if let Some(array) = read_typed::<R, f64>(npz, index)? {
        return Ok(array);
    }
    if let Some(array) = decoded(npz.by_index::<OwnedRepr<i64>, IxDyn>(index))? {
        return Ok(array.mapv(|v| v as f32));
    }
    if let Some(array) = read_typed::<R, i32>(npz, index)? {
        return Ok(array);
    }
    if let Some(array) = read_typed::<R, u8>(npz, index)? {
        return Ok(array);
    }

    bail!("Unsupported element type, expected {}", SUPPORTED_TYPES)
}
