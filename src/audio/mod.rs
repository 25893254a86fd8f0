pub mod extract;
pub mod wav;

pub use extract::{check_ffmpeg, decode_to_wav, get_audio_info};
pub use wav::{read_wav, write_wav, SampleFormat};

use std::time::Duration;

use crate::error::{RestoreError, Result};

/// Metadata about an audio file.
#[derive(Debug, Clone)]
pub struct AudioMetadata {
    pub duration: Duration,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Decoded audio, stored planar as `[channels, length]`.
///
/// Every channel has the same length and there is always at least one
/// channel. Mono audio is a single-channel signal.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl Signal {
    /// Build a signal from planar channel data.
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Result<Self> {
        if channels.is_empty() {
            return Err(RestoreError::InvalidSignal(
                "signal must have at least one channel".to_string(),
            ));
        }
        if sample_rate == 0 {
            return Err(RestoreError::InvalidSignal(
                "sample rate must be greater than 0".to_string(),
            ));
        }
        let len = channels[0].len();
        if let Some((index, ch)) = channels.iter().enumerate().find(|(_, c)| c.len() != len) {
            return Err(RestoreError::InvalidSignal(format!(
                "channel {} has {} samples, expected {}",
                index,
                ch.len(),
                len
            )));
        }
        Ok(Self {
            sample_rate,
            channels,
        })
    }

    /// Build a single-channel signal.
    pub fn mono(sample_rate: u32, samples: Vec<f32>) -> Result<Self> {
        Self::new(sample_rate, vec![samples])
    }

    /// Deinterleave frame-ordered samples (`L R L R ...`).
    pub fn from_interleaved(sample_rate: u32, channels: u16, samples: &[f32]) -> Result<Self> {
        let count = channels as usize;
        if count == 0 {
            return Err(RestoreError::InvalidSignal(
                "signal must have at least one channel".to_string(),
            ));
        }
        if samples.len() % count != 0 {
            return Err(RestoreError::InvalidSignal(format!(
                "{} interleaved samples do not divide into {} channels",
                samples.len(),
                count
            )));
        }

        let frames = samples.len() / count;
        let mut planar = vec![Vec::with_capacity(frames); count];
        for frame in samples.chunks_exact(count) {
            for (ch, &sample) in planar.iter_mut().zip(frame) {
                ch.push(sample);
            }
        }
        Self::new(sample_rate, planar)
    }

    /// Interleave into frame order for encoding.
    pub fn to_interleaved(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.len() * self.num_channels());
        for i in 0..self.len() {
            for ch in &self.channels {
                out.push(ch[i]);
            }
        }
        out
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Number of samples per channel.
    pub fn len(&self) -> usize {
        self.channels[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    pub fn into_channels(self) -> Vec<Vec<f32>> {
        self.channels
    }

    /// Get the duration of this signal.
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.len() as f64 / self.sample_rate as f64)
    }

    /// Copy out `[start, end)` of every channel, clamped to the signal length.
    pub fn slice(&self, start: usize, end: usize) -> Signal {
        let end = end.min(self.len());
        let start = start.min(end);
        Signal {
            sample_rate: self.sample_rate,
            channels: self
                .channels
                .iter()
                .map(|ch| ch[start..end].to_vec())
                .collect(),
        }
    }

    pub fn metadata(&self) -> AudioMetadata {
        AudioMetadata {
            duration: self.duration(),
            sample_rate: self.sample_rate,
            channels: self.num_channels() as u16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_no_channels() {
        assert!(Signal::new(44100, Vec::new()).is_err());
    }

    #[test]
    fn test_rejects_ragged_channels() {
        let result = Signal::new(44100, vec![vec![0.0; 4], vec![0.0; 3]]);
        match result {
            Err(RestoreError::InvalidSignal(msg)) => assert!(msg.contains("channel 1")),
            other => panic!("Expected InvalidSignal, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_signal_is_valid() {
        let signal = Signal::mono(16000, Vec::new()).unwrap();
        assert!(signal.is_empty());
        assert_eq!(signal.num_channels(), 1);
        assert_eq!(signal.duration(), Duration::ZERO);
    }

    #[test]
    fn test_interleave_roundtrip() {
        let interleaved = [1.0, -1.0, 2.0, -2.0, 3.0, -3.0];
        let signal = Signal::from_interleaved(8000, 2, &interleaved).unwrap();

        assert_eq!(signal.len(), 3);
        assert_eq!(signal.channel(0), &[1.0, 2.0, 3.0]);
        assert_eq!(signal.channel(1), &[-1.0, -2.0, -3.0]);
        assert_eq!(signal.to_interleaved(), interleaved.to_vec());
    }

    #[test]
    fn test_from_interleaved_uneven() {
        assert!(Signal::from_interleaved(8000, 2, &[1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn test_slice_clamps() {
        let signal = Signal::mono(10, vec![0.0, 1.0, 2.0, 3.0]).unwrap();
        assert_eq!(signal.slice(2, 10).channel(0), &[2.0, 3.0]);
        assert!(signal.slice(6, 10).is_empty());
    }

    #[test]
    fn test_duration() {
        let signal = Signal::mono(4, vec![0.0; 10]).unwrap();
        assert_eq!(signal.duration(), Duration::from_millis(2500));
        assert_eq!(signal.metadata().channels, 1);
    }
}
