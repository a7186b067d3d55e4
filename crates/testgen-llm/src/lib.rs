//! # testgen LLM backends
//!
//! Concrete text-completion services behind the core's `GenerationBackend`
//! seam: the Anthropic Messages API and a local Ollama server.

pub mod anthropic;
pub mod config;
pub mod ollama;

pub use anthropic::AnthropicBackend;
pub use config::{create_backend, BackendConfig, ConfigError, Provider};
pub use ollama::OllamaBackend;

use testgen_core::BackendError;

/// Map a reqwest failure onto the backend error taxonomy.
pub(crate) fn transport_error(err: reqwest::Error, timeout_secs: u64) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout(timeout_secs)
    } else {
        BackendError::Transport(Box::new(err))
    }
}
