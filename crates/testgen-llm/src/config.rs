//! Backend selection and construction.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use testgen_core::{BackendError, GenerationBackend};
use thiserror::Error;
use tracing::debug;

use crate::anthropic::{AnthropicBackend, DEFAULT_ANTHROPIC_URL};
use crate::ollama::{self, OllamaBackend, DEFAULT_OLLAMA_URL};

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown provider: '{0}'. Available: anthropic, ollama")]
    UnknownProvider(String),
}

/// Which completion service to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Anthropic,
    Ollama,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::Ollama => "ollama",
        }
    }

    /// Model used when none is configured.
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Anthropic => testgen_core::generator::DEFAULT_MODEL,
            Self::Ollama => ollama::DEFAULT_MODEL,
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Anthropic => DEFAULT_ANTHROPIC_URL,
            Self::Ollama => DEFAULT_OLLAMA_URL,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "ollama" => Ok(Self::Ollama),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

/// Fully resolved backend settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub provider: Provider,
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
    /// Overrides the provider's default endpoint.
    pub base_url: Option<String>,
}

impl BackendConfig {
    /// Defaults for a provider.
    pub fn for_provider(provider: Provider) -> Self {
        Self {
            provider,
            model: provider.default_model().to_string(),
            max_tokens: testgen_core::generator::DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            base_url: None,
        }
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::for_provider(Provider::default())
    }
}

/// Build the backend described by `config`.
///
/// The Anthropic backend reads its key from `ANTHROPIC_API_KEY` and fails
/// here, before any request is made, when it is missing.
pub fn create_backend(config: &BackendConfig) -> Result<Box<dyn GenerationBackend>, BackendError> {
    debug!(
        provider = %config.provider,
        base_url = config.base_url(),
        timeout_secs = config.timeout.as_secs(),
        "Creating generation backend"
    );

    match config.provider {
        Provider::Anthropic => Ok(Box::new(AnthropicBackend::from_env(
            config.base_url(),
            config.timeout,
        )?)),
        Provider::Ollama => Ok(Box::new(OllamaBackend::new(
            config.base_url(),
            config.timeout,
        )?)),
    }
}
