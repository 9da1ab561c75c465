use async_trait::async_trait;

use crate::error::GenerationError;

/// Raw text-generation capability.
///
/// Implementations send one prompt and return the model's text verbatim;
/// parsing, timeouts and fallbacks belong to
/// [`MessageGenerator`](crate::MessageGenerator).
#[async_trait]
pub trait GenerationTransport: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError>;
}
