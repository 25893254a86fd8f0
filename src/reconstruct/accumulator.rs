use tracing::debug;

use crate::audio::Signal;
use crate::error::{RestoreError, Result};

/// Weighted overlap-add buffers for one reconstruction pass.
///
/// The accumulator is either accepting merges or, once [`finalize`] has
/// consumed it, gone; a merge after normalization cannot be expressed.
/// The mask is shared by all channels, so a single weight row is kept.
///
/// [`finalize`]: OverlapAccumulator::finalize
#[derive(Debug)]
pub struct OverlapAccumulator {
    sample_rate: u32,
    sum: Vec<Vec<f32>>,
    weight: Vec<f32>,
    merged: usize,
}

impl OverlapAccumulator {
    pub fn new(sample_rate: u32, channels: usize, len: usize) -> Self {
        Self {
            sample_rate,
            sum: vec![vec![0.0; len]; channels],
            weight: vec![0.0; len],
            merged: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.weight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weight.is_empty()
    }

    /// Number of chunks merged so far.
    pub fn merged(&self) -> usize {
        self.merged
    }

    /// Add `output * mask` at `start`, writing only the first `valid_len`
    /// samples so a padded final chunk never spills past the signal end.
    pub fn merge(
        &mut self,
        start: usize,
        valid_len: usize,
        output: &Signal,
        mask: &[f32],
    ) -> Result<()> {
        if output.num_channels() != self.sum.len() || output.len() != mask.len() {
            return Err(RestoreError::ShapeMismatch {
                expected_channels: self.sum.len(),
                expected_len: mask.len(),
                actual_channels: output.num_channels(),
                actual_len: output.len(),
            });
        }
        if valid_len > mask.len() || start + valid_len > self.len() {
            return Err(RestoreError::InvalidSignal(format!(
                "chunk [{}, {}) does not fit in {} accumulated samples",
                start,
                start + valid_len,
                self.len()
            )));
        }

        let end = start + valid_len;
        for (acc, out) in self.sum.iter_mut().zip(output.channels()) {
            for ((a, &o), &w) in acc[start..end].iter_mut().zip(out).zip(mask) {
                *a += o * w;
            }
        }
        for (a, &w) in self.weight[start..end].iter_mut().zip(mask) {
            *a += w;
        }

        self.merged += 1;
        Ok(())
    }

    /// Divide sum by weight. Samples that end up non-finite (zero weight)
    /// become 0.
    pub fn finalize(self) -> Result<Signal> {
        let Self {
            sample_rate,
            mut sum,
            weight,
            merged,
        } = self;

        let mut uncovered = 0usize;
        for ch in sum.iter_mut() {
            for (s, &w) in ch.iter_mut().zip(&weight) {
                let value = *s / w;
                *s = if value.is_finite() {
                    value
                } else {
                    uncovered += 1;
                    0.0
                };
            }
        }

        if uncovered > 0 {
            debug!(
                "{} samples had no usable weight after {} chunks, set to 0",
                uncovered, merged
            );
        }

        Signal::new(sample_rate, sum)
    }
}
