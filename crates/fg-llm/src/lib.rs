//! # fg-llm
//!
//! LLM provider trait and HTTP backends for the narrative-map service.
//!
//! - [`Provider`]: single blocking request/response completion call — no
//!   streaming, no retries; failures surface directly to the caller
//! - [`AnthropicProvider`]: Anthropic Messages API backend (insight
//!   generation)
//! - [`OpenAiCompatProvider`]: OpenAI-compatible chat-completions backend
//!   (coaching chat gateway)
//! - [`extract`]: markdown-fence stripping isolated from JSON parsing so the
//!   two concerns are testable independently

#![deny(unsafe_code)]

pub mod anthropic;
pub mod extract;
pub mod openai;
pub mod provider;

pub use anthropic::{AnthropicConfig, AnthropicProvider};
pub use extract::{extract_json, strip_code_fence};
pub use openai::{OpenAiCompatConfig, OpenAiCompatProvider};
pub use provider::{
    ChatMessage, ChatRole, Completion, CompletionRequest, Provider, ProviderError, ProviderResult,
    TokenUsage,
};
