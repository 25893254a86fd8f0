use async_trait::async_trait;
use tempfile::TempDir;
use tracing::debug;

use crate::audio::{read_wav, write_wav, SampleFormat, Signal};
use crate::error::{RestoreError, Result};

use super::ModelAdapter;

const INPUT_PLACEHOLDER: &str = "{input}";
const OUTPUT_PLACEHOLDER: &str = "{output}";

/// Runs an external inference command once per chunk.
///
/// The chunk is written to a temporary float WAV, the command is invoked with
/// `{input}` and `{output}` replaced by the file paths, and the restored chunk
/// is read back from `{output}`. The command line is split on whitespace and
/// executed directly, not through a shell.
#[derive(Debug, Clone)]
pub struct CommandModel {
    program: String,
    args: Vec<String>,
    support_window: Option<usize>,
    channels: Option<usize>,
}

impl CommandModel {
    /// Parse a command template such as
    /// `python infer.py --in_wav {input} --out_wav {output}`.
    pub fn parse(template: &str) -> Result<Self> {
        let mut parts = template.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| RestoreError::Config("model command is empty".to_string()))?;
        let args: Vec<String> = parts.collect();

        for placeholder in [INPUT_PLACEHOLDER, OUTPUT_PLACEHOLDER] {
            if !args.iter().any(|a| a.contains(placeholder)) {
                return Err(RestoreError::Config(format!(
                    "model command must reference {placeholder}"
                )));
            }
        }

        Ok(Self {
            program,
            args,
            support_window: None,
            channels: None,
        })
    }

    /// Declare the chunk length the model was trained on.
    pub fn with_support_window(mut self, samples: usize) -> Self {
        self.support_window = Some(samples);
        self
    }

    /// Declare the channel count the model accepts.
    pub fn with_channels(mut self, channels: usize) -> Self {
        self.channels = Some(channels);
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn render_args(&self, input: &str, output: &str) -> Vec<String> {
        self.args
            .iter()
            .map(|a| {
                a.replace(INPUT_PLACEHOLDER, input)
                    .replace(OUTPUT_PLACEHOLDER, output)
            })
            .collect()
    }
}

#[async_trait]
impl ModelAdapter for CommandModel {
    async fn restore(&self, chunk: Signal) -> Result<Signal> {
        let workdir = TempDir::new()?;
        let input_path = workdir.path().join("chunk_in.wav");
        let output_path = workdir.path().join("chunk_out.wav");

        write_wav(&input_path, &chunk, SampleFormat::F32)?;

        let args = self.render_args(
            &input_path.to_string_lossy(),
            &output_path.to_string_lossy(),
        );
        debug!("Running model command: {} {}", self.program, args.join(" "));

        let output = tokio::process::Command::new(&self.program)
            .args(&args)
            .output()
            .await
            .map_err(|e| RestoreError::Model(format!("Failed to run {}: {e}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RestoreError::Model(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        if !output_path.exists() {
            return Err(RestoreError::Model(format!(
                "{} did not write {}",
                self.program,
                output_path.display()
            )));
        }

        let restored = read_wav(&output_path)?;
        if restored.sample_rate() != chunk.sample_rate() {
            return Err(RestoreError::Model(format!(
                "model returned {} Hz audio for a {} Hz chunk",
                restored.sample_rate(),
                chunk.sample_rate()
            )));
        }
        Ok(restored)
    }

    fn name(&self) -> &'static str {
        "command"
    }

    fn support_window(&self) -> Option<usize> {
        self.support_window
    }

    fn channels(&self) -> Option<usize> {
        self.channels
    }
}
