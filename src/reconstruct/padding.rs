use tracing::debug;

use crate::audio::Signal;
use crate::error::{RestoreError, Result};

/// Reflect-pad a channel, mirroring around the edge samples without
/// repeating them: `[a b c d]` padded by 2 on both sides is
/// `[c b a b c d c b]`.
///
/// Each pad width must be strictly less than the number of samples.
pub fn reflect_pad(samples: &[f32], left: usize, right: usize) -> Result<Vec<f32>> {
    let n = samples.len();
    let widest = left.max(right);
    if widest > 0 && widest >= n {
        return Err(RestoreError::PaddingTooWide {
            requested: widest,
            available: n,
        });
    }

    let mut out = Vec::with_capacity(n + left + right);
    out.extend((1..=left).rev().map(|k| samples[k]));
    out.extend_from_slice(samples);
    out.extend((1..=right).map(|k| samples[n - 1 - k]));
    Ok(out)
}

/// Append `right` zeros to a channel.
pub fn zero_pad(samples: &[f32], right: usize) -> Vec<f32> {
    let mut out = Vec::with_capacity(samples.len() + right);
    out.extend_from_slice(samples);
    out.resize(samples.len() + right, 0.0);
    out
}

/// Edge padding decision for one reconstruction pass.
///
/// The decision is taken once from the unpadded length and reused for both
/// padding and stripping, so the two can never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaddingPolicy {
    border: usize,
    applied: bool,
}

impl PaddingPolicy {
    /// Pad only when the signal is longer than `2 * border` and `border > 0`.
    pub fn decide(border: usize, len: usize) -> Self {
        let applied = border > 0 && len > 2 * border;
        if !applied {
            debug!(
                "Skipping edge padding: length {} <= 2 * border {}",
                len, border
            );
        }
        Self { border, applied }
    }

    pub fn border(&self) -> usize {
        self.border
    }

    pub fn is_applied(&self) -> bool {
        self.applied
    }

    /// Length of a signal of `len` samples after padding.
    pub fn padded_len(&self, len: usize) -> usize {
        if self.applied {
            len + 2 * self.border
        } else {
            len
        }
    }

    pub fn pad(&self, signal: &Signal) -> Result<Signal> {
        if !self.applied {
            return Ok(signal.clone());
        }
        let channels = signal
            .channels()
            .iter()
            .map(|ch| reflect_pad(ch, self.border, self.border))
            .collect::<Result<Vec<_>>>()?;
        Signal::new(signal.sample_rate(), channels)
    }

    /// Remove exactly `border` samples from each end if padding was applied.
    pub fn strip(&self, signal: Signal) -> Result<Signal> {
        if !self.applied {
            return Ok(signal);
        }
        if signal.len() < 2 * self.border {
            return Err(RestoreError::InvalidSignal(format!(
                "cannot strip {} border samples from a signal of {} samples",
                self.border,
                signal.len()
            )));
        }
        Ok(signal.slice(self.border, signal.len() - self.border))
    }
}
