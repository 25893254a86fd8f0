pub mod command;
pub mod identity;

pub use command::CommandModel;
pub use identity::IdentityModel;

use crate::audio::Signal;
use crate::error::Result;
use async_trait::async_trait;

/// A restoration model that maps one fixed-length chunk to a chunk of the
/// same shape.
///
/// Where inference runs (CPU, accelerator, another process) is the
/// implementor's business.
#[async_trait]
pub trait ModelAdapter: Send + Sync {
    async fn restore(&self, chunk: Signal) -> Result<Signal>;

    fn name(&self) -> &'static str;

    /// Chunk length in samples the model requires, if it declares one.
    fn support_window(&self) -> Option<usize> {
        None
    }

    /// Channel count the model requires, if it declares one.
    fn channels(&self) -> Option<usize> {
        None
    }
}
