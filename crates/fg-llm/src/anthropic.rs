//! Anthropic provider implementing the [`Provider`] trait.
//!
//! Builds and sends non-streaming requests to the Anthropic Messages API.
//! One request per call, no retries — rate-limit and API errors surface
//! directly with their status so the caller can map them.

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, RETRY_AFTER};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::provider::{
    ChatMessage, Completion, CompletionRequest, Provider, ProviderError, ProviderResult,
    TokenUsage,
};

/// Default base URL for the Anthropic API.
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// API version header value.
const API_VERSION: &str = "2023-06-01";

/// Default max output tokens when the request doesn't specify one.
const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 4096;

/// Configuration for the Anthropic provider.
#[derive(Clone, Debug)]
pub struct AnthropicConfig {
    /// Anthropic API key.
    pub api_key: String,
    /// Model ID (e.g., `"claude-sonnet-4-20250514"`).
    pub model: String,
    /// Base URL override (tests point this at a mock server).
    pub base_url: Option<String>,
    /// Default max output tokens.
    pub max_tokens: u32,
}

impl AnthropicConfig {
    /// Config with the given key and model, default URL and output cap.
    #[must_use]
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
            max_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct AnthropicMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<AnthropicMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct AnthropicUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    usage: Option<AnthropicUsage>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    #[serde(rename = "type")]
    error_type: Option<String>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorEnvelope {
    error: Option<ApiErrorBody>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Provider
// ─────────────────────────────────────────────────────────────────────────────

/// Anthropic text-generation provider.
pub struct AnthropicProvider {
    config: AnthropicConfig,
    client: reqwest::Client,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider.
    #[must_use]
    pub fn new(config: AnthropicConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Create a new Anthropic provider with a shared HTTP client.
    #[must_use]
    pub fn with_client(config: AnthropicConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    fn build_headers(&self) -> ProviderResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        let _ = headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let _ = headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));
        let _ = headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.config.api_key).map_err(|e| ProviderError::Auth {
                message: format!("Invalid API key header: {e}"),
            })?,
        );
        Ok(headers)
    }

    fn build_body<'a>(&'a self, request: &'a CompletionRequest) -> AnthropicRequest<'a> {
        let messages = request
            .messages
            .iter()
            .map(|m: &ChatMessage| AnthropicMessage {
                role: m.role.as_str(),
                content: &m.content,
            })
            .collect();
        AnthropicRequest {
            model: &self.config.model,
            max_tokens: request.max_tokens.unwrap_or(self.config.max_tokens),
            system: request.system.as_deref(),
            messages,
            temperature: request.temperature,
        }
    }
}

fn retry_after_ms(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .parse::<u64>()
        .ok()
        .map(|secs| secs * 1000)
}

async fn error_from_response(resp: reqwest::Response) -> ProviderError {
    let status = resp.status();
    let retry_after = retry_after_ms(resp.headers());
    let body = resp.text().await.unwrap_or_default();
    let parsed: Option<ApiErrorBody> = serde_json::from_str::<ApiErrorEnvelope>(&body)
        .ok()
        .and_then(|e| e.error);

    let message = parsed
        .as_ref()
        .and_then(|e| e.message.clone())
        .unwrap_or_else(|| format!("HTTP {status}"));
    let code = parsed.and_then(|e| e.error_type);

    if status == StatusCode::TOO_MANY_REQUESTS {
        return ProviderError::RateLimited {
            retry_after_ms: retry_after,
            message,
        };
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return ProviderError::Auth { message };
    }
    ProviderError::Api {
        status: status.as_u16(),
        message,
        code,
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    #[instrument(skip_all, fields(model = %self.config.model))]
    async fn complete(&self, request: &CompletionRequest) -> ProviderResult<Completion> {
        let base_url = self.config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let url = format!("{base_url}/v1/messages");
        let headers = self.build_headers()?;
        let body = self.build_body(request);

        debug!(
            max_tokens = body.max_tokens,
            message_count = body.messages.len(),
            has_system = body.system.is_some(),
            "sending messages request"
        );

        let resp = self
            .client
            .post(&url)
            .headers(headers)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }

        let parsed: AnthropicResponse = resp.json().await?;
        let text: String = parsed
            .content
            .iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text.as_deref())
            .collect();

        if text.is_empty() {
            return Err(ProviderError::Other {
                message: "model returned no text content".into(),
            });
        }

        debug!(chars = text.len(), "received completion");

        Ok(Completion {
            text,
            model: parsed.model.unwrap_or_else(|| self.config.model.clone()),
            usage: parsed.usage.map(|u| TokenUsage {
                input_tokens: u.input_tokens,
                output_tokens: u.output_tokens,
            }),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
