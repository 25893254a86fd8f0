use std::path::Path;

use hound::{WavReader, WavSpec, WavWriter};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{RestoreError, Result};

use super::Signal;

/// Sample encoding for written WAV files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    /// 32-bit IEEE float.
    #[default]
    F32,
    /// 16-bit signed PCM.
    I16,
}

impl std::fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleFormat::F32 => write!(f, "f32"),
            SampleFormat::I16 => write!(f, "i16"),
        }
    }
}

impl std::str::FromStr for SampleFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "f32" | "float" => Ok(SampleFormat::F32),
            "i16" | "pcm16" => Ok(SampleFormat::I16),
            _ => Err(format!("Unknown sample format: {}. Use 'f32' or 'i16'", s)),
        }
    }
}

impl SampleFormat {
    fn wav_spec(&self, channels: u16, sample_rate: u32) -> WavSpec {
        match self {
            SampleFormat::F32 => WavSpec {
                channels,
                sample_rate,
                bits_per_sample: 32,
                sample_format: hound::SampleFormat::Float,
            },
            SampleFormat::I16 => WavSpec {
                channels,
                sample_rate,
                bits_per_sample: 16,
                sample_format: hound::SampleFormat::Int,
            },
        }
    }
}

/// Read a WAV file into a planar float signal.
///
/// Integer PCM of any bit depth is scaled into `[-1, 1)`.
pub fn read_wav(path: &Path) -> Result<Signal> {
    if !path.exists() {
        return Err(RestoreError::FileNotFound(path.display().to_string()));
    }

    let reader = WavReader::open(path)?;
    let spec = reader.spec();

    debug!(
        "Reading {}: {} Hz, {} channels, {} bits {:?}",
        path.display(),
        spec.sample_rate,
        spec.channels,
        spec.bits_per_sample,
        spec.sample_format
    );

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()?
        }
    };

    Signal::from_interleaved(spec.sample_rate, spec.channels, &samples)
}

/// Write a signal to a WAV file.
pub fn write_wav(path: &Path, signal: &Signal, format: SampleFormat) -> Result<()> {
    let spec = format.wav_spec(signal.num_channels() as u16, signal.sample_rate());
    let mut writer = WavWriter::create(path, spec)?;

    match format {
        SampleFormat::F32 => {
            for sample in signal.to_interleaved() {
                writer.write_sample(sample)?;
            }
        }
        SampleFormat::I16 => {
            for sample in signal.to_interleaved() {
                let clamped = sample.clamp(-1.0, 1.0);
                writer.write_sample((clamped * i16::MAX as f32).round() as i16)?;
            }
        }
    }

    writer.finalize()?;
    info!(
        "Wrote {} samples x {} channels to {}",
        signal.len(),
        signal.num_channels(),
        path.display()
    );
    Ok(())
}
