//! Chunked overlap-add reconstruction.
//!
//! A model that only accepts fixed-length windows is run over a signal of any
//! length:
//!
//! ```text
//! signal    [=============================]
//! padded  [==|=============================|==]   reflect, border = C - step
//! chunk 0 [==========]
//! chunk 1      [==========]                        step = C / N
//! chunk 2           [==========]
//! ...
//! ```
//!
//! Every chunk output is weighted by its window mask and summed; the sum is
//! divided by the summed weights and the border is stripped again.

pub mod accumulator;
pub mod engine;
pub mod padding;
pub mod schedule;
pub mod window;

pub use accumulator::OverlapAccumulator;
pub use engine::Reconstructor;
pub use padding::{reflect_pad, zero_pad, PaddingPolicy};
pub use schedule::{ChunkScheduler, ChunkSpec, ScheduledChunk, TailPadding};
pub use window::{ChunkRole, WindowProfile};

use crate::error::{RestoreError, Result};

/// Chunking parameters for one reconstruction pass, in samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconstructionConfig {
    /// Chunk length `C`; must match the model's support window.
    pub chunk_len: usize,
    /// Overlap factor `N`; chunks advance by `C / N`.
    pub overlap_factor: usize,
    /// Samples at the end of each non-final chunk that get zero weight.
    pub fade_len: usize,
    /// Remaining samples above which a short final chunk is reflect-padded
    /// instead of zero-padded. Defaults to `C / 2 + 1`.
    pub reflect_threshold: Option<usize>,
}

impl ReconstructionConfig {
    /// Convert durations to sample counts at `sample_rate`.
    pub fn from_durations(
        sample_rate: u32,
        chunk_seconds: f64,
        overlap_factor: usize,
        fade_seconds: f64,
    ) -> Result<Self> {
        if !(chunk_seconds.is_finite() && chunk_seconds > 0.0) {
            return Err(RestoreError::Config(format!(
                "chunk duration must be positive, got {chunk_seconds}"
            )));
        }
        if !(fade_seconds.is_finite() && fade_seconds >= 0.0) {
            return Err(RestoreError::Config(format!(
                "fade duration must not be negative, got {fade_seconds}"
            )));
        }

        let config = Self {
            chunk_len: (chunk_seconds * sample_rate as f64).round() as usize,
            overlap_factor,
            fade_len: (fade_seconds * sample_rate as f64).round() as usize,
            reflect_threshold: None,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_reflect_threshold(mut self, samples: usize) -> Self {
        self.reflect_threshold = Some(samples);
        self
    }

    pub fn step(&self) -> usize {
        if self.overlap_factor == 0 {
            0
        } else {
            self.chunk_len / self.overlap_factor
        }
    }

    /// Edge padding width, `C - step`.
    pub fn border(&self) -> usize {
        self.chunk_len.saturating_sub(self.step())
    }

    pub fn reflect_threshold(&self) -> usize {
        self.reflect_threshold.unwrap_or(self.chunk_len / 2 + 1)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_len == 0 {
            return Err(RestoreError::Config(
                "chunk length must be at least one sample".to_string(),
            ));
        }
        if self.overlap_factor == 0 {
            return Err(RestoreError::Config(
                "overlap factor must be greater than 0".to_string(),
            ));
        }
        if self.step() == 0 {
            return Err(RestoreError::Config(format!(
                "overlap factor {} leaves no step for chunk length {}",
                self.overlap_factor, self.chunk_len
            )));
        }
        if self.step() >= self.chunk_len {
            return Err(RestoreError::Config(format!(
                "overlap factor {} leaves no overlap between chunks; use at least 2",
                self.overlap_factor
            )));
        }
        if self.fade_len > self.chunk_len {
            return Err(RestoreError::Config(format!(
                "fade length {} exceeds chunk length {}",
                self.fade_len, self.chunk_len
            )));
        }
        if self.reflect_threshold() < self.chunk_len / 2 {
            return Err(RestoreError::Config(format!(
                "reflect threshold {} must be at least half the chunk length {}",
                self.reflect_threshold(),
                self.chunk_len
            )));
        }
        Ok(())
    }

    /// True when the zeroed tail of a chunk can outrun the next chunk's
    /// start, leaving samples that no chunk weights.
    pub fn has_coverage_gap(&self) -> bool {
        self.fade_len > self.step()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_durations_matches_reference_setup() {
        let config = ReconstructionConfig::from_durations(44100, 10.0, 2, 3.0).unwrap();
        assert_eq!(config.chunk_len, 441000);
        assert_eq!(config.step(), 220500);
        assert_eq!(config.border(), 220500);
        assert_eq!(config.fade_len, 132300);
        assert_eq!(config.reflect_threshold(), 220501);
    }

    #[test]
    fn test_reflect_threshold_override() {
        let config = ReconstructionConfig::from_durations(100, 1.0, 2, 0.1)
            .unwrap()
            .with_reflect_threshold(70);
        assert_eq!(config.reflect_threshold(), 70);
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(ReconstructionConfig::from_durations(44100, 0.0, 2, 0.0).is_err());
        assert!(ReconstructionConfig::from_durations(44100, 1.0, 0, 0.0).is_err());
        assert!(ReconstructionConfig::from_durations(44100, 1.0, 2, 2.0).is_err());
        assert!(ReconstructionConfig::from_durations(44100, 1.0, 2, -1.0).is_err());
        assert!(ReconstructionConfig::from_durations(10, 0.1, 4, 0.0).is_err());
    }

    #[test]
    fn test_rejects_non_overlapping_chunks() {
        let result = ReconstructionConfig::from_durations(100, 0.2, 1, 0.03);
        assert!(matches!(result, Err(RestoreError::Config(_))));
    }

    #[test]
    fn test_coverage_gap_detection() {
        let config = ReconstructionConfig::from_durations(100, 0.2, 2, 0.03).unwrap();
        assert!(!config.has_coverage_gap());

        let config = ReconstructionConfig::from_durations(100, 0.2, 4, 0.1).unwrap();
        assert!(config.has_coverage_gap());
    }
}
