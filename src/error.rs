use thiserror::Error;

#[derive(Error, Debug)]
pub enum RestoreError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid signal: {0}")]
    InvalidSignal(String),

    #[error("Cannot reflect-pad {requested} samples from a signal of {available} samples")]
    PaddingTooWide { requested: usize, available: usize },

    #[error("Model output shape mismatch: expected [{expected_channels}, {expected_len}], got [{actual_channels}, {actual_len}]")]
    ShapeMismatch {
        expected_channels: usize,
        expected_len: usize,
        actual_channels: usize,
        actual_len: usize,
    },

    #[error("Model failed: {0}")]
    Model(String),

    #[error("Audio decoding failed: {0}")]
    AudioDecode(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Reconstruction cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RestoreError>;
