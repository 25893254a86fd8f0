use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{FuturesUnordered, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::audio::Signal;
use crate::error::{RestoreError, Result};
use crate::model::ModelAdapter;

use super::accumulator::OverlapAccumulator;
use super::padding::PaddingPolicy;
use super::schedule::{ChunkScheduler, ScheduledChunk};
use super::window::WindowProfile;
use super::ReconstructionConfig;

/// Runs a model over a whole signal chunk by chunk and stitches the outputs.
pub struct Reconstructor {
    config: ReconstructionConfig,
    scheduler: ChunkScheduler,
    window: WindowProfile,
    concurrency: usize,
    show_progress: bool,
}

impl Reconstructor {
    pub fn new(config: ReconstructionConfig) -> Result<Self> {
        config.validate()?;
        if config.has_coverage_gap() {
            warn!(
                "Fade length {} exceeds step {}; parts of the signal may receive no weight",
                config.fade_len,
                config.step()
            );
        }
        let scheduler =
            ChunkScheduler::new(config.chunk_len, config.step(), config.reflect_threshold())?;
        let window = WindowProfile::new(config.chunk_len, config.fade_len)?;

        Ok(Self {
            config,
            scheduler,
            window,
            concurrency: 1,
            show_progress: false,
        })
    }

    /// Allow up to `concurrency` model calls in flight. Defaults to 1.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Enable or disable progress bar display.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn config(&self) -> &ReconstructionConfig {
        &self.config
    }

    /// Padding decision and chunk layout for a signal of `len` samples.
    pub fn plan(&self, len: usize) -> (PaddingPolicy, Vec<ScheduledChunk>) {
        let policy = PaddingPolicy::decide(self.config.border(), len);
        let chunks = self.scheduler.schedule(policy.padded_len(len));
        (policy, chunks)
    }

    fn check_model(&self, model: &dyn ModelAdapter, signal: &Signal) -> Result<()> {
        if let Some(window) = model.support_window() {
            if window != self.config.chunk_len {
                return Err(RestoreError::Config(format!(
                    "chunk length {} does not match the {} model window of {} samples",
                    self.config.chunk_len,
                    model.name(),
                    window
                )));
            }
        }
        if let Some(channels) = model.channels() {
            if channels != signal.num_channels() {
                return Err(RestoreError::Config(format!(
                    "{} model expects {} channels, signal has {}",
                    model.name(),
                    channels,
                    signal.num_channels()
                )));
            }
        }
        Ok(())
    }

    /// Reconstruct `signal` through `model`.
    pub async fn reconstruct(&self, signal: &Signal, model: &dyn ModelAdapter) -> Result<Signal> {
        let cancelled = Arc::new(AtomicBool::new(false));
        self.reconstruct_with_cancel(signal, model, cancelled).await
    }

    /// Reconstruct with a cancellation flag checked between chunks.
    ///
    /// A cancelled pass returns [`RestoreError::Cancelled`] and no partial
    /// signal. The first chunk failure aborts the pass and is returned as is.
    pub async fn reconstruct_with_cancel(
        &self,
        signal: &Signal,
        model: &dyn ModelAdapter,
        cancelled: Arc<AtomicBool>,
    ) -> Result<Signal> {
        self.check_model(model, signal)?;

        let (policy, chunks) = self.plan(signal.len());
        let padded = policy.pad(signal)?;
        let total_chunks = chunks.len();
        let start_time = Instant::now();

        info!(
            "Reconstructing {} samples x {} channels in {} chunks (C={}, step={}, fade={}, padded={}) using {}",
            signal.len(),
            signal.num_channels(),
            total_chunks,
            self.config.chunk_len,
            self.scheduler.step(),
            self.config.fade_len,
            policy.is_applied(),
            model.name()
        );

        let mut accumulator =
            OverlapAccumulator::new(padded.sample_rate(), padded.num_channels(), padded.len());

        let progress_bar = if self.show_progress && total_chunks > 0 {
            let pb = ProgressBar::new(total_chunks as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({eta})")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        let semaphore = Semaphore::new(self.concurrency);
        let mut futures = FuturesUnordered::new();

        for chunk in chunks {
            let semaphore = &semaphore;
            let padded = &padded;
            let cancelled = &cancelled;
            let window = &self.window;

            futures.push(async move {
                let _permit = semaphore
                    .acquire()
                    .await
                    .map_err(|_| RestoreError::Cancelled)?;
                if cancelled.load(Ordering::Relaxed) {
                    return Err(RestoreError::Cancelled);
                }

                // Weights depend only on position; fix them before inference.
                let mask = window.mask_for(chunk.role);
                let input = chunk.extract(padded)?;

                debug!(
                    "Chunk {} ({}) at {} with {} valid samples, tail {:?}",
                    chunk.index, chunk.role, chunk.spec.start, chunk.valid_len, chunk.tail
                );
                let output = model.restore(input).await?;
                Ok::<_, RestoreError>((chunk, mask, output))
            });
        }

        while let Some(result) = futures.next().await {
            let (chunk, mask, output) = result?;
            if cancelled.load(Ordering::Relaxed) {
                return Err(RestoreError::Cancelled);
            }
            accumulator.merge(chunk.spec.start, chunk.valid_len, &output, &mask)?;

            if let Some(ref pb) = progress_bar {
                pb.inc(1);
            }
        }

        if let Some(pb) = progress_bar {
            pb.finish_with_message("Reconstruction complete");
        }

        let merged = accumulator.merged();
        let restored = policy.strip(accumulator.finalize()?)?;

        info!(
            "Reconstruction complete: {} chunks in {:.2}s",
            merged,
            start_time.elapsed().as_secs_f64()
        );

        Ok(restored)
    }
}
