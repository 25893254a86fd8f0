use tracing::debug;

use crate::audio::Signal;
use crate::error::{RestoreError, Result};

use super::padding::{reflect_pad, zero_pad};
use super::window::ChunkRole;

/// Fixed-length window into the padded signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSpec {
    pub start: usize,
    pub length: usize,
}

impl ChunkSpec {
    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

/// How a chunk running past the end of the signal is filled up to full length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailPadding {
    None,
    Reflect(usize),
    Zero(usize),
}

/// One entry of the schedule: where the chunk sits, its role, and how many
/// of its samples are real signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledChunk {
    pub index: usize,
    pub spec: ChunkSpec,
    pub role: ChunkRole,
    /// Samples backed by the signal; the rest is tail padding.
    pub valid_len: usize,
    pub tail: TailPadding,
}

impl ScheduledChunk {
    /// Copy this chunk out of `signal` and pad it to the full chunk length.
    pub fn extract(&self, signal: &Signal) -> Result<Signal> {
        let part = signal.slice(self.spec.start, self.spec.start + self.valid_len);
        let channels = match self.tail {
            TailPadding::None => return Ok(part),
            TailPadding::Reflect(n) => part
                .channels()
                .iter()
                .map(|ch| reflect_pad(ch, 0, n))
                .collect::<Result<Vec<_>>>()?,
            TailPadding::Zero(n) => part.channels().iter().map(|ch| zero_pad(ch, n)).collect(),
        };
        Signal::new(signal.sample_rate(), channels)
    }
}

/// Walks a signal in overlapping fixed-length steps.
#[derive(Debug, Clone)]
pub struct ChunkScheduler {
    chunk_len: usize,
    step: usize,
    reflect_threshold: usize,
}

impl ChunkScheduler {
    /// A short final chunk is reflect-padded when more than
    /// `reflect_threshold` real samples remain, and zero-padded otherwise.
    pub fn new(chunk_len: usize, step: usize, reflect_threshold: usize) -> Result<Self> {
        if chunk_len == 0 {
            return Err(RestoreError::Config(
                "chunk length must be greater than 0".to_string(),
            ));
        }
        if step == 0 {
            return Err(RestoreError::Config(
                "chunk step must be greater than 0".to_string(),
            ));
        }
        if step >= chunk_len {
            return Err(RestoreError::Config(format!(
                "chunk step {} must be shorter than chunk length {}",
                step, chunk_len
            )));
        }
        if reflect_threshold < chunk_len / 2 {
            return Err(RestoreError::Config(format!(
                "reflect threshold {} must be at least half the chunk length {}",
                reflect_threshold, chunk_len
            )));
        }
        Ok(Self {
            chunk_len,
            step,
            reflect_threshold,
        })
    }

    pub fn chunk_len(&self) -> usize {
        self.chunk_len
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn reflect_threshold(&self) -> usize {
        self.reflect_threshold
    }

    fn role_at(&self, start: usize, padded_len: usize) -> ChunkRole {
        if start == 0 {
            ChunkRole::First
        } else if start + self.chunk_len >= padded_len {
            ChunkRole::Last
        } else {
            ChunkRole::Interior
        }
    }

    /// Lay out every chunk over a padded signal of `padded_len` samples.
    pub fn schedule(&self, padded_len: usize) -> Vec<ScheduledChunk> {
        let mut chunks = Vec::with_capacity(padded_len.div_ceil(self.step));
        let mut start = 0;

        while start < padded_len {
            let remaining = padded_len - start;
            let valid_len = remaining.min(self.chunk_len);
            let missing = self.chunk_len - valid_len;

            let tail = if missing == 0 {
                TailPadding::None
            } else if remaining > self.reflect_threshold {
                TailPadding::Reflect(missing)
            } else {
                TailPadding::Zero(missing)
            };

            chunks.push(ScheduledChunk {
                index: chunks.len(),
                spec: ChunkSpec {
                    start,
                    length: self.chunk_len,
                },
                role: self.role_at(start, padded_len),
                valid_len,
                tail,
            });

            start += self.step;
        }

        debug!(
            "Scheduled {} chunks of {} samples (step {}) over {} samples",
            chunks.len(),
            self.chunk_len,
            self.step,
            padded_len
        );
        chunks
    }
}
