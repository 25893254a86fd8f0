use crate::audio::{decode_to_wav, read_wav, write_wav, AudioMetadata, SampleFormat, Signal};
use crate::config::Config;
use crate::error::{RestoreError, Result};
use crate::model::ModelAdapter;
use crate::reconstruct::Reconstructor;
use console::style;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tracing::{debug, info};

/// Per-run options layered on top of [`Config`].
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Sample encoding of the output file.
    pub output_format: SampleFormat,
    /// Number of concurrent model calls.
    pub concurrency: usize,
    /// Show progress bars.
    pub show_progress: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_format: SampleFormat::default(),
            concurrency: 1,
            show_progress: true,
        }
    }
}

impl PipelineConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            output_format: config.output_format,
            concurrency: config.concurrency,
            ..Default::default()
        }
    }
}

/// Statistics from one restoration run.
#[derive(Debug, Clone)]
pub struct PipelineStats {
    /// Total time taken for the entire pipeline.
    pub total_time: Duration,
    /// Time taken for decoding.
    pub decode_time: Duration,
    /// Time taken for chunked reconstruction.
    pub reconstruction_time: Duration,
    /// Number of chunks sent to the model.
    pub chunks_processed: usize,
    /// Whether the signal edges were reflect-padded.
    pub edge_padded: bool,
    /// Total audio duration.
    pub audio_duration: Duration,
    pub sample_rate: u32,
    pub channels: usize,
    /// Sample rate of the input before any resampling.
    pub source_sample_rate: u32,
    pub source_channels: u16,
    /// Model used for restoration.
    pub model: String,
}

impl PipelineStats {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "total_seconds": self.total_time.as_secs_f64(),
            "decode_seconds": self.decode_time.as_secs_f64(),
            "reconstruction_seconds": self.reconstruction_time.as_secs_f64(),
            "chunks_processed": self.chunks_processed,
            "edge_padded": self.edge_padded,
            "audio_seconds": self.audio_duration.as_secs_f64(),
            "sample_rate": self.sample_rate,
            "channels": self.channels,
            "source_sample_rate": self.source_sample_rate,
            "source_channels": self.source_channels,
            "model": self.model,
        })
    }

    /// Write the stats as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.to_json())?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Result of the restoration pipeline.
#[derive(Debug)]
pub struct PipelineResult {
    /// Path to the restored audio file.
    pub output_path: PathBuf,
    /// Pipeline statistics.
    pub stats: PipelineStats,
}

fn is_wav(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("wav"))
        .unwrap_or(false)
}

/// Decode `input` to a signal at `sample_rate`, along with metadata of the
/// source as it was on disk.
///
/// WAV files already at the target rate are read directly; everything else,
/// including `.wav` files hound cannot parse, goes through FFmpeg into
/// `scratch`.
pub async fn load_signal(
    input: &Path,
    sample_rate: u32,
    scratch: &Path,
) -> Result<(Signal, AudioMetadata)> {
    if !input.exists() {
        return Err(RestoreError::FileNotFound(input.display().to_string()));
    }

    if is_wav(input) {
        match read_wav(input) {
            Ok(signal) if signal.sample_rate() == sample_rate => {
                let source = signal.metadata();
                return Ok((signal, source));
            }
            Ok(signal) => debug!(
                "{} is {} Hz, resampling to {} Hz",
                input.display(),
                signal.sample_rate(),
                sample_rate
            ),
            Err(RestoreError::Wav(e)) => debug!(
                "{} is not readable as WAV ({}), decoding with FFmpeg",
                input.display(),
                e
            ),
            Err(e) => return Err(e),
        }
    }

    let decoded = scratch.join("decoded.wav");
    let source = decode_to_wav(input, &decoded, sample_rate).await?;
    info!(
        "Source audio: {:.1}s, {} Hz, {} channels",
        source.duration.as_secs_f64(),
        source.sample_rate,
        source.channels
    );
    Ok((read_wav(&decoded)?, source))
}

/// Restore an audio or video file through `model`.
///
/// This is the main entry point. It:
/// 1. Decodes the input to a float signal at the configured sample rate
/// 2. Runs chunked overlap-add reconstruction through the model
/// 3. Writes the restored signal as WAV
pub async fn restore_file(
    input: &Path,
    output: &Path,
    config: &Config,
    model: &dyn ModelAdapter,
    pipeline_config: PipelineConfig,
) -> Result<PipelineResult> {
    let cancelled = Arc::new(AtomicBool::new(false));
    restore_file_with_cancel(input, output, config, model, pipeline_config, cancelled).await
}

/// Restore a file with cancellation support.
pub async fn restore_file_with_cancel(
    input: &Path,
    output: &Path,
    config: &Config,
    model: &dyn ModelAdapter,
    pipeline_config: PipelineConfig,
    cancelled: Arc<AtomicBool>,
) -> Result<PipelineResult> {
    let start_time = Instant::now();

    if !input.exists() {
        return Err(RestoreError::FileNotFound(input.display().to_string()));
    }

    // Fail on bad chunking parameters before spending time decoding.
    let reconstruction = config.reconstruction(config.sample_rate)?;
    let reconstructor = Reconstructor::new(reconstruction)?
        .with_concurrency(pipeline_config.concurrency)
        .with_progress(pipeline_config.show_progress);

    // TempDir deletes its contents on drop, including on early return.
    let scratch = TempDir::new()?;
    debug!("Using temp directory: {:?}", scratch.path());

    // Stage 1: decode
    info!("Stage 1/3: Decoding {:?}", input);
    let decode_start = Instant::now();
    let (signal, source) = load_signal(input, config.sample_rate, scratch.path()).await?;
    let decode_time = decode_start.elapsed();
    info!(
        "Decoded {:.1}s of audio ({} Hz, {} channels) in {:.2}s",
        signal.duration().as_secs_f64(),
        signal.sample_rate(),
        signal.num_channels(),
        decode_time.as_secs_f64()
    );

    if cancelled.load(Ordering::Relaxed) {
        return Err(RestoreError::Cancelled);
    }

    // Stage 2: reconstruct
    info!("Stage 2/3: Restoring with {} model", model.name());
    let reconstruction_start = Instant::now();
    let (policy, chunks) = reconstructor.plan(signal.len());
    let restored = reconstructor
        .reconstruct_with_cancel(&signal, model, cancelled.clone())
        .await?;
    let reconstruction_time = reconstruction_start.elapsed();

    if cancelled.load(Ordering::Relaxed) {
        return Err(RestoreError::Cancelled);
    }

    // Stage 3: encode
    info!("Stage 3/3: Writing {}", output.display());
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    write_wav(output, &restored, pipeline_config.output_format)?;

    let stats = PipelineStats {
        total_time: start_time.elapsed(),
        decode_time,
        reconstruction_time,
        chunks_processed: chunks.len(),
        edge_padded: policy.is_applied(),
        audio_duration: restored.duration(),
        sample_rate: restored.sample_rate(),
        channels: restored.num_channels(),
        source_sample_rate: source.sample_rate,
        source_channels: source.channels,
        model: model.name().to_string(),
    };

    Ok(PipelineResult {
        output_path: output.to_path_buf(),
        stats,
    })
}

/// Print a summary of the pipeline results.
pub fn print_summary(result: &PipelineResult) {
    let rule = "═══════════════════════════════════════════════════════════════";
    println!();
    println!("{}", rule);
    println!("{}", style("                      Restoration Complete").bold().green());
    println!("{}", rule);
    println!();
    println!("  Output:     {}", style(result.output_path.display()).cyan());
    println!("  Model:      {}", result.stats.model);
    println!(
        "  Audio:      {:.1}s, {} Hz, {} channels",
        result.stats.audio_duration.as_secs_f64(),
        result.stats.sample_rate,
        result.stats.channels
    );
    if result.stats.source_sample_rate != result.stats.sample_rate {
        println!(
            "  Source:     {} Hz, {} channels",
            result.stats.source_sample_rate, result.stats.source_channels
        );
    }
    println!(
        "  Chunks:     {}{}",
        result.stats.chunks_processed,
        if result.stats.edge_padded {
            " (edges padded)"
        } else {
            ""
        }
    );
    println!();
    println!("  Timing:");
    println!(
        "    Decode:      {:.2}s",
        result.stats.decode_time.as_secs_f64()
    );
    println!(
        "    Restore:     {:.2}s",
        result.stats.reconstruction_time.as_secs_f64()
    );
    println!(
        "    Total:       {:.2}s",
        result.stats.total_time.as_secs_f64()
    );
    println!();
    println!("{}", rule);
}
