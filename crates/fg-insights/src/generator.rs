//! Insight generator.
//!
//! One call to the text-generation provider, then fence-strip + parse +
//! structural validation. Failure at any point is all-or-nothing: the
//! caller gets an error and nothing is persisted.

use std::sync::Arc;

use tracing::{debug, instrument};

use fg_context::prompts::{NARRATIVE_SYSTEM_PROMPT, narrative_user_message};
use fg_core::GeneratedInsights;
use fg_llm::{ChatMessage, CompletionRequest, Provider, extract_json};

use crate::errors::InsightError;

/// Generates narrative-map insights from an aggregated context document.
pub struct InsightGenerator {
    provider: Arc<dyn Provider>,
}

impl InsightGenerator {
    /// Create a generator backed by the given provider.
    #[must_use]
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self { provider }
    }

    /// Issue one generation call and return the validated payload.
    #[instrument(skip_all, fields(provider = self.provider.name(), model = self.provider.model()))]
    pub async fn generate(&self, context_document: &str) -> Result<GeneratedInsights, InsightError> {
        let request = CompletionRequest {
            system: Some(NARRATIVE_SYSTEM_PROMPT.to_owned()),
            messages: vec![ChatMessage::user(narrative_user_message(context_document))],
            max_tokens: None,
            temperature: None,
        };

        let completion = self.provider.complete(&request).await?;
        debug!(chars = completion.text.len(), "parsing generated payload");

        let insights: GeneratedInsights =
            extract_json(&completion.text).map_err(|e| InsightError::Parse {
                message: e.to_string(),
            })?;
        insights.validate()?;
        Ok(insights)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
