//! OpenAI-compatible chat-completions provider.
//!
//! The coaching-chat function talks to a hosted gateway that speaks the
//! OpenAI `/v1/chat/completions` shape with bearer authentication. The
//! gateway's rate-limit (429) and billing (402) statuses are preserved so
//! the HTTP layer can pass them through.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::provider::{
    Completion, CompletionRequest, Provider, ProviderError, ProviderResult, TokenUsage,
};

/// Configuration for an OpenAI-compatible gateway.
#[derive(Clone, Debug)]
pub struct OpenAiCompatConfig {
    /// Bearer token.
    pub api_key: String,
    /// Model ID routed by the gateway (e.g., `"google/gemini-2.5-flash"`).
    pub model: String,
    /// Gateway base URL (no default — gateways differ).
    pub base_url: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Provider
// ─────────────────────────────────────────────────────────────────────────────

/// OpenAI-compatible gateway provider.
pub struct OpenAiCompatProvider {
    config: OpenAiCompatConfig,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Create a new gateway provider.
    #[must_use]
    pub fn new(config: OpenAiCompatConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Provider for OpenAiCompatProvider {
    fn name(&self) -> &'static str {
        "openai-compat"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    #[instrument(skip_all, fields(model = %self.config.model))]
    async fn complete(&self, request: &CompletionRequest) -> ProviderResult<Completion> {
        let url = format!("{}/v1/chat/completions", self.config.base_url);

        // The OpenAI shape carries the system prompt as the first message.
        let mut messages: Vec<WireMessage<'_>> = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = request.system.as_deref() {
            messages.push(WireMessage {
                role: "system",
                content: system,
            });
        }
        for m in &request.messages {
            messages.push(WireMessage {
                role: m.role.as_str(),
                content: &m.content,
            });
        }

        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        debug!(message_count = body.messages.len(), "sending chat completion");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited {
                    retry_after_ms: None,
                    message: "Rate limit exceeded. Please try again in a moment.".into(),
                },
                StatusCode::PAYMENT_REQUIRED => ProviderError::Api {
                    status: 402,
                    message: "AI credits depleted. Please add credits to continue.".into(),
                    code: None,
                },
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Auth {
                    message: format!("gateway rejected credentials: {text}"),
                },
                _ => ProviderError::Api {
                    status: status.as_u16(),
                    message: format!("AI Gateway error: {}", status.as_u16()),
                    code: None,
                },
            });
        }

        let parsed: ChatCompletionResponse = resp.json().await?;
        let text = parsed
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(ProviderError::Other {
                message: "gateway returned no response content".into(),
            });
        }

        Ok(Completion {
            text,
            model: parsed.model.unwrap_or_else(|| self.config.model.clone()),
            usage: parsed.usage.map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            }),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
