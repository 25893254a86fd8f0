pub mod audio;
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod reconstruct;

pub use audio::Signal;
pub use config::Config;
pub use error::{RestoreError, Result};
pub use model::{CommandModel, IdentityModel, ModelAdapter};
pub use pipeline::{
    print_summary, restore_file, restore_file_with_cancel, PipelineConfig, PipelineResult,
    PipelineStats,
};
pub use reconstruct::{ReconstructionConfig, Reconstructor};
