//! Ollama HTTP backend.
//!
//! Uses the non-streaming `/api/generate` endpoint of a local Ollama server.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use testgen_core::{BackendError, GenerationBackend, GenerationRequest};
use tracing::debug;

use crate::transport_error;

/// Default Ollama API URL.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Default model when talking to Ollama.
pub const DEFAULT_MODEL: &str = "llama3.1";

/// Ollama completion client.
#[derive(Clone)]
pub struct OllamaBackend {
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    num_predict: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

impl OllamaBackend {
    /// Create a client for the given server URL.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Transport(Box::new(e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl GenerationBackend for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<String>, BackendError> {
        let body = GenerateRequest {
            model: &request.model,
            prompt: &request.prompt,
            stream: false,
            options: GenerateOptions {
                num_predict: request.max_tokens,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout.as_secs()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| transport_error(e, self.timeout.as_secs()))?;

        if !status.is_success() {
            return Err(BackendError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        let segments = parse_response(&text)?;
        debug!(chars = segments.iter().map(String::len).sum::<usize>(), "Ollama completion received");
        Ok(segments)
    }
}

/// Extract the completion from an `/api/generate` reply.
fn parse_response(body: &str) -> Result<Vec<String>, BackendError> {
    let parsed: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| BackendError::MalformedResponse(e.to_string()))?;

    if parsed.response.is_empty() {
        Ok(Vec::new())
    } else {
        Ok(vec![parsed.response])
    }
}
