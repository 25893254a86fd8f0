use std::path::Path;
use std::process::Command;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{RestoreError, Result};

use super::AudioMetadata;

/// Check if FFmpeg is installed and accessible.
pub fn check_ffmpeg() -> Result<()> {
    check_tool("ffmpeg")
}

/// Check if FFprobe is installed and accessible.
pub fn check_ffprobe() -> Result<()> {
    check_tool("ffprobe")
}

fn check_tool(tool: &str) -> Result<()> {
    let output = Command::new(tool).arg("-version").output().map_err(|e| {
        RestoreError::AudioDecode(format!(
            "{tool} not found. Please install FFmpeg and ensure it's in your PATH. Error: {e}"
        ))
    })?;

    if !output.status.success() {
        return Err(RestoreError::AudioDecode(format!("{tool} check failed")));
    }

    debug!("{} is available", tool);
    Ok(())
}

/// Get the duration of the first audio stream using FFprobe.
pub fn get_audio_duration(input: &Path) -> Result<Duration> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(input)
        .output()
        .map_err(|e| RestoreError::AudioDecode(format!("Failed to run FFprobe: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(RestoreError::AudioDecode(format!("FFprobe failed: {stderr}")));
    }

    let duration_str = String::from_utf8_lossy(&output.stdout);
    let duration_secs: f64 = duration_str.trim().parse().map_err(|e| {
        RestoreError::AudioDecode(format!(
            "Failed to parse duration '{}': {e}",
            duration_str.trim()
        ))
    })?;

    Ok(Duration::from_secs_f64(duration_secs))
}

/// Get audio metadata (sample rate, channels) using FFprobe.
pub fn get_audio_info(input: &Path) -> Result<(u32, u16)> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "a:0",
            "-show_entries",
            "stream=sample_rate,channels",
            "-of",
            "csv=s=,:p=0",
        ])
        .arg(input)
        .output()
        .map_err(|e| RestoreError::AudioDecode(format!("Failed to run FFprobe: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(RestoreError::AudioDecode(format!("FFprobe failed: {stderr}")));
    }

    parse_audio_info(&String::from_utf8_lossy(&output.stdout))
}

fn parse_audio_info(info: &str) -> Result<(u32, u16)> {
    let parts: Vec<&str> = info.trim().split(',').collect();

    if parts.len() < 2 {
        return Err(RestoreError::AudioDecode(format!(
            "Failed to parse audio info: {}",
            info.trim()
        )));
    }

    let sample_rate: u32 = parts[0]
        .parse()
        .map_err(|e| RestoreError::AudioDecode(format!("Failed to parse sample rate: {e}")))?;

    let channels: u16 = parts[1]
        .parse()
        .map_err(|e| RestoreError::AudioDecode(format!("Failed to parse channels: {e}")))?;

    Ok((sample_rate, channels))
}

/// Transcode any audio/video file into a 32-bit float WAV at `sample_rate`.
///
/// All source channels are kept; only the first audio stream is decoded.
/// The returned metadata describes the source stream before resampling.
pub async fn decode_to_wav(input: &Path, output: &Path, sample_rate: u32) -> Result<AudioMetadata> {
    check_ffmpeg()?;
    check_ffprobe()?;

    if !input.exists() {
        return Err(RestoreError::FileNotFound(input.display().to_string()));
    }

    info!("Decoding audio from {}", input.display());

    let duration = get_audio_duration(input)?;
    let (source_rate, channels) = get_audio_info(input)?;
    debug!(
        "Source: {:?}, {} Hz, {} channels",
        duration, source_rate, channels
    );

    let status = tokio::process::Command::new("ffmpeg")
        .args(["-y", "-v", "error", "-i"])
        .arg(input)
        .args(["-vn", "-acodec", "pcm_f32le", "-ar"])
        .arg(sample_rate.to_string())
        .arg(output)
        .status()
        .await
        .map_err(|e| RestoreError::AudioDecode(format!("Failed to run FFmpeg: {e}")))?;

    if !status.success() {
        return Err(RestoreError::AudioDecode(
            "FFmpeg audio decoding failed".to_string(),
        ));
    }

    if !output.exists() {
        return Err(RestoreError::AudioDecode(
            "Output file was not created".to_string(),
        ));
    }

    info!("Audio decoded to {}", output.display());

    Ok(AudioMetadata {
        duration,
        sample_rate: source_rate,
        channels,
    })
}
