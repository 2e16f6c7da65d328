//! Line protocol spoken with the evaluation harness over stdio.
//!
//! The runner writes the readiness marker, reads exactly one line holding
//! the dataset archive path, and answers with one class label per line.
//! Nothing else may be written to the output channel.

use crate::types::Predictions;
use anyhow::{bail, Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::debug;

/// Both ends of the harness connection
pub struct HarnessChannel<R, W> {
    input: R,
    output: W,
    ready_marker: String,
}

impl<R: BufRead, W: Write> HarnessChannel<R, W> {
    pub fn new(input: R, output: W, ready_marker: &str) -> Self {
        Self {
            input,
            output,
            ready_marker: ready_marker.to_string(),
        }
    }

    /// Write the readiness marker and flush so the harness sees it immediately
    pub fn signal_ready(&mut self) -> Result<()> {
        writeln!(self.output, "{}", self.ready_marker)?;
        self.output
            .flush()
            .context("Failed to flush readiness marker")?;
        debug!(marker = %self.ready_marker, "Signalled readiness");
        Ok(())
    }

    /// Block until the harness sends the dataset archive path.
    ///
    /// Only the line terminator is stripped. End of input is an error.
    pub fn read_dataset_path(&mut self) -> Result<PathBuf> {
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read dataset path from input")?;
        if read == 0 {
            bail!("Input closed before a dataset path was received");
        }

        let path = line.strip_suffix('\n').unwrap_or(&line);
        let path = path.strip_suffix('\r').unwrap_or(path);
        if path.is_empty() {
            bail!("Received an empty dataset path");
        }

        debug!(path = %path, "Received dataset path");
        Ok(PathBuf::from(path))
    }

    /// Write one label per line, in sample order
    pub fn emit_predictions(&mut self, predictions: &Predictions) -> Result<()> {
        write!(self.output, "{}", predictions)?;
        self.output
            .flush()
            .context("Failed to flush predictions")?;
        debug!(count = predictions.len(), "Emitted predictions");
        Ok(())
    }

    pub fn into_parts(self) -> (R, W) {
        (self.input, self.output)
    }
}
