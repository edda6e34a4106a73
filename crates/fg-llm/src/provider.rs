//! # Provider Trait
//!
//! Core abstraction for text-generation backends. Every provider (Anthropic,
//! the OpenAI-compatible chat gateway) implements [`Provider`] to expose a
//! unified blocking request/response interface.
//!
//! There is deliberately no streaming and no retry machinery here: the
//! pipeline issues one call per invocation and surfaces any failure directly
//! to the caller.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result type alias for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors that can occur during provider operations.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Authentication failed (invalid or missing key).
    #[error("Auth error: {message}")]
    Auth {
        /// Error description.
        message: String,
    },

    /// Rate limited by the provider.
    #[error("Rate limited: {message}")]
    RateLimited {
        /// Suggested retry delay in milliseconds, if the provider sent one.
        retry_after_ms: Option<u64>,
        /// Error description.
        message: String,
    },

    /// Provider returned an API error.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error description.
        message: String,
        /// Provider-specific error code.
        code: Option<String>,
    },

    /// Provider-specific error (empty response, unexpected shape, …).
    #[error("{message}")]
    Other {
        /// Error description.
        message: String,
    },
}

impl ProviderError {
    /// Error category string for logging.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Http(_) => "network",
            Self::Json(_) => "parse",
            Self::Auth { .. } => "auth",
            Self::RateLimited { .. } => "rate_limit",
            Self::Api { .. } => "api",
            Self::Other { .. } => "unknown",
        }
    }

    /// HTTP status reported by the provider, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::RateLimited { .. } => Some(429),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Role of a chat message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// End-user message.
    User,
    /// Model response.
    Assistant,
}

impl ChatRole {
    /// Wire label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One turn of conversation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who said it.
    pub role: ChatRole,
    /// Plain-text content.
    pub content: String,
}

impl ChatMessage {
    /// Convenience constructor for a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// Convenience constructor for an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// A completion request: system prompt plus conversation turns.
#[derive(Clone, Debug, Default)]
pub struct CompletionRequest {
    /// System prompt, if any.
    pub system: Option<String>,
    /// Conversation turns, oldest first. Must end with a user message.
    pub messages: Vec<ChatMessage>,
    /// Max output tokens override (provider default when `None`).
    pub max_tokens: Option<u32>,
    /// Sampling temperature override.
    pub temperature: Option<f64>,
}

/// Token accounting reported by the provider.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Input tokens billed.
    pub input_tokens: u64,
    /// Output tokens billed.
    pub output_tokens: u64,
}

/// A completed generation.
#[derive(Clone, Debug)]
pub struct Completion {
    /// Concatenated response text.
    pub text: String,
    /// Model that produced it.
    pub model: String,
    /// Token usage, if reported.
    pub usage: Option<TokenUsage>,
}

/// Core text-generation provider trait.
///
/// Implementors must be `Send + Sync` for use across async tasks.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider identifier (e.g., `"anthropic"`, `"openai-compat"`).
    fn name(&self) -> &'static str;

    /// Configured model ID.
    fn model(&self) -> &str;

    /// Issue one completion call and wait for the full response.
    async fn complete(&self, request: &CompletionRequest) -> ProviderResult<Completion>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_is_object_safe() {
        fn assert_object_safe(_: &dyn Provider) {}
        let _ = assert_object_safe;
    }

    #[test]
    fn provider_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn Provider>();
    }

    #[test]
    fn error_categories() {
        let err = ProviderError::Auth {
            message: "missing key".into(),
        };
        assert_eq!(err.category(), "auth");
        assert_eq!(err.status(), None);

        let err = ProviderError::RateLimited {
            retry_after_ms: Some(5000),
            message: "slow down".into(),
        };
        assert_eq!(err.category(), "rate_limit");
        assert_eq!(err.status(), Some(429));

        let err = ProviderError::Api {
            status: 402,
            message: "credits depleted".into(),
            code: None,
        };
        assert_eq!(err.status(), Some(402));
        assert_eq!(err.to_string(), "API error (402): credits depleted");
    }

    #[test]
    fn chat_message_constructors() {
        let msg = ChatMessage::user("hello");
        assert_eq!(msg.role, ChatRole::User);
        let msg = ChatMessage::assistant("hi");
        assert_eq!(msg.role, ChatRole::Assistant);
    }

    #[test]
    fn chat_role_serde_lowercase() {
        assert_eq!(serde_json::to_string(&ChatRole::User).unwrap(), "\"user\"");
        assert_eq!(ChatRole::Assistant.as_str(), "assistant");
    }
}
