use crate::audio::SampleFormat;
use crate::error::{RestoreError, Result};
use crate::reconstruct::ReconstructionConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model context window in seconds.
    pub chunk_duration_seconds: f64,
    /// Chunks advance by `chunk / overlap_factor`.
    pub overlap_factor: usize,
    /// Length of the discarded tail of each non-final chunk, in seconds.
    pub fade_duration_seconds: f64,
    /// Remaining samples above which a short final chunk is reflect-padded.
    pub reflect_tail_threshold: Option<usize>,
    /// Rate audio is decoded at before reconstruction.
    pub sample_rate: u32,
    pub concurrency: usize,
    pub output_format: SampleFormat,
    /// External model invocation, with `{input}` and `{output}` placeholders.
    pub model_command: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_duration_seconds: 10.0,
            overlap_factor: 2,
            fade_duration_seconds: 3.0,
            reflect_tail_threshold: None,
            sample_rate: 44100,
            concurrency: 1,
            output_format: SampleFormat::default(),
            model_command: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        // Load from config file if it exists
        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                let contents = std::fs::read_to_string(&config_path)?;
                config = toml::from_str::<Config>(&contents).map_err(|e| {
                    RestoreError::Config(format!(
                        "Failed to parse {}: {e}",
                        config_path.display()
                    ))
                })?;
            }
        }

        config.apply_env();
        Ok(config)
    }

    /// Override fields from `AUDIORESTORE_*` environment variables.
    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("AUDIORESTORE_CHUNK_SECONDS") {
            if let Ok(s) = v.parse() {
                self.chunk_duration_seconds = s;
            }
        }
        if let Ok(v) = std::env::var("AUDIORESTORE_OVERLAP") {
            if let Ok(n) = v.parse() {
                self.overlap_factor = n;
            }
        }
        if let Ok(v) = std::env::var("AUDIORESTORE_FADE_SECONDS") {
            if let Ok(s) = v.parse() {
                self.fade_duration_seconds = s;
            }
        }
        if let Ok(v) = std::env::var("AUDIORESTORE_SAMPLE_RATE") {
            if let Ok(r) = v.parse() {
                self.sample_rate = r;
            }
        }
        if let Ok(v) = std::env::var("AUDIORESTORE_CONCURRENCY") {
            if let Ok(c) = v.parse() {
                self.concurrency = c;
            }
        }
        if let Ok(v) = std::env::var("AUDIORESTORE_OUTPUT_FORMAT") {
            if let Ok(f) = v.parse() {
                self.output_format = f;
            }
        }
        if let Ok(v) = std::env::var("AUDIORESTORE_MODEL_COMMAND") {
            self.model_command = Some(v);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(RestoreError::Config(
                "Sample rate must be greater than 0".to_string(),
            ));
        }

        if self.concurrency == 0 {
            return Err(RestoreError::Config(
                "Concurrency must be greater than 0".to_string(),
            ));
        }

        self.reconstruction(self.sample_rate).map(|_| ())
    }

    /// Chunking parameters in samples for audio at `sample_rate`.
    pub fn reconstruction(&self, sample_rate: u32) -> Result<ReconstructionConfig> {
        let mut config = ReconstructionConfig::from_durations(
            sample_rate,
            self.chunk_duration_seconds,
            self.overlap_factor,
            self.fade_duration_seconds,
        )?;
        if let Some(threshold) = self.reflect_tail_threshold {
            config = config.with_reflect_threshold(threshold);
            config.validate()?;
        }
        Ok(config)
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("audiorestore").join("config.toml"))
    }
}
