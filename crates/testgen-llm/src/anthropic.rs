//! Anthropic Messages API backend.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use testgen_core::{BackendError, GenerationBackend, GenerationRequest};
use tracing::debug;

use crate::transport_error;

/// Default API base URL.
pub const DEFAULT_ANTHROPIC_URL: &str = "https://api.anthropic.com";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

const API_VERSION: &str = "2023-06-01";

/// Client for `POST /v1/messages`.
#[derive(Clone)]
pub struct AnthropicBackend {
    api_key: String,
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: String,
}

impl AnthropicBackend {
    pub fn new(api_key: String, base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        if api_key.is_empty() {
            return Err(BackendError::MissingApiKey(API_KEY_ENV));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Transport(Box::new(e)))?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            client,
        })
    }

    /// Create a client with the API key from `ANTHROPIC_API_KEY`.
    pub fn from_env(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let api_key =
            std::env::var(API_KEY_ENV).map_err(|_| BackendError::MissingApiKey(API_KEY_ENV))?;
        Self::new(api_key, base_url, timeout)
    }
}

#[async_trait]
impl GenerationBackend for AnthropicBackend {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<String>, BackendError> {
        let body = MessagesRequest {
            model: &request.model,
            max_tokens: request.max_tokens,
            messages: [Message {
                role: "user",
                content: &request.prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
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
        debug!(segments = segments.len(), "Anthropic completion received");
        Ok(segments)
    }
}

/// Text of every `text` content block, in order.
fn parse_response(body: &str) -> Result<Vec<String>, BackendError> {
    let parsed: MessagesResponse = serde_json::from_str(body)
        .map_err(|e| BackendError::MalformedResponse(e.to_string()))?;

    Ok(parsed
        .content
        .into_iter()
        .filter(|block| block.block_type == "text")
        .map(|block| block.text)
        .collect())
}
