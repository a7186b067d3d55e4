//! Generation backend boundary.
//!
//! The pipeline only needs `generate(prompt) -> text segments`. Concrete
//! services live in `testgen-llm`; tests plug in stubs.

use async_trait::async_trait;
use thiserror::Error;

/// One rendered prompt, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub model: String,
    pub max_tokens: u32,
}

/// Errors raised by a generation backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{0} environment variable not set")]
    MissingApiKey(&'static str),

    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// A text-completion service.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Send one prompt and return the text segments of the reply in order.
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<String>, BackendError>;
}
