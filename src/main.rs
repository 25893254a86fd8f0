use anyhow::{Context, Result};
use audiorestore::audio::SampleFormat;
use audiorestore::config::Config;
use audiorestore::model::{CommandModel, IdentityModel, ModelAdapter};
use audiorestore::pipeline::{print_summary, restore_file_with_cancel, PipelineConfig};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "audiorestore")]
#[command(version, about = "Restore audio through a fixed-window model")]
#[command(
    long_about = "Run audio of any length through a restoration model that only accepts fixed-length chunks, stitching the outputs back together with overlap-add."
)]
struct Cli {
    /// Input audio/video file
    input: PathBuf,

    /// Output WAV file (defaults to <input>_restored.wav)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Model command with {input} and {output} placeholders; omit for a pass-through dry run
    #[arg(short, long)]
    model_command: Option<String>,

    /// Chunk length in seconds (must match the model window)
    #[arg(long)]
    chunk_seconds: Option<f64>,

    /// Overlap factor: chunks advance by chunk / overlap
    #[arg(long)]
    overlap: Option<usize>,

    /// Length of the discarded chunk tail in seconds
    #[arg(long)]
    fade_seconds: Option<f64>,

    /// Sample rate to decode at
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Output sample format: f32, i16
    #[arg(short, long)]
    format: Option<String>,

    /// Number of concurrent model calls
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Write run statistics as JSON to this path
    #[arg(long)]
    stats_json: Option<PathBuf>,

    /// Disable progress bars
    #[arg(long)]
    no_progress: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

fn derive_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default();
    let mut output = input.to_path_buf();
    output.set_file_name(format!("{}_restored.wav", stem.to_string_lossy()));
    output
}

fn apply_overrides(config: &mut Config, cli: &Cli) -> Result<()> {
    if let Some(s) = cli.chunk_seconds {
        config.chunk_duration_seconds = s;
    }
    if let Some(n) = cli.overlap {
        config.overlap_factor = n;
    }
    if let Some(s) = cli.fade_seconds {
        config.fade_duration_seconds = s;
    }
    if let Some(r) = cli.sample_rate {
        config.sample_rate = r;
    }
    if let Some(c) = cli.concurrency {
        config.concurrency = c;
    }
    if let Some(ref f) = cli.format {
        config.output_format = f
            .parse::<SampleFormat>()
            .map_err(|e: String| anyhow::anyhow!(e))?;
    }
    if let Some(ref cmd) = cli.model_command {
        config.model_command = Some(cmd.clone());
    }
    Ok(())
}

fn build_model(config: &Config) -> Result<Box<dyn ModelAdapter>> {
    match config.model_command {
        Some(ref template) => {
            let chunk = config.reconstruction(config.sample_rate)?.chunk_len;
            let model = CommandModel::parse(template)
                .context("Invalid model command")?
                .with_support_window(chunk);
            Ok(Box::new(model))
        }
        None => {
            warn!("No model command configured, running a pass-through reconstruction");
            Ok(Box::new(IdentityModel))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    if !cli.input.exists() {
        anyhow::bail!("Input file not found: {}", cli.input.display());
    }

    let mut config = Config::load().context("Failed to load configuration")?;
    apply_overrides(&mut config, &cli)?;
    config
        .validate()
        .context("Configuration validation failed")?;

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| derive_output_path(&cli.input));

    info!("Input:    {}", cli.input.display());
    info!("Output:   {}", output.display());
    info!(
        "Chunking: {}s chunks, overlap {}, {}s fade at {} Hz",
        config.chunk_duration_seconds,
        config.overlap_factor,
        config.fade_duration_seconds,
        config.sample_rate
    );

    let model = build_model(&config)?;

    let cancelled = Arc::new(AtomicBool::new(false));
    {
        let cancelled = cancelled.clone();
        ctrlc::set_handler(move || {
            cancelled.store(true, Ordering::Relaxed);
        })
        .context("Failed to install Ctrl+C handler")?;
    }

    let mut pipeline_config = PipelineConfig::from_config(&config);
    pipeline_config.show_progress = !cli.no_progress;

    let result = restore_file_with_cancel(
        &cli.input,
        &output,
        &config,
        model.as_ref(),
        pipeline_config,
        cancelled,
    )
    .await
    .context("Restoration failed")?;

    if let Some(ref path) = cli.stats_json {
        result
            .stats
            .write_json(path)
            .with_context(|| format!("Failed to write stats to {}", path.display()))?;
    }

    print_summary(&result);
    Ok(())
}
