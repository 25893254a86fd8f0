use async_trait::async_trait;

use crate::audio::Signal;
use crate::error::Result;

use super::ModelAdapter;

/// Pass-through model. Useful for dry runs of the chunking itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityModel;

#[async_trait]
impl ModelAdapter for IdentityModel {
    async fn restore(&self, chunk: Signal) -> Result<Signal> {
        Ok(chunk)
    }

    fn name(&self) -> &'static str {
        "identity"
    }
}
