//! Function endpoints.
//!
//! Wire shapes are `camelCase` to match the dashboard's existing calls;
//! response payloads reuse the persisted snake_case insight shapes.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use fg_core::{ClientEmail, EngagementId, MergedInsights};
use fg_insights::ChatRequest;
use fg_llm::{ChatMessage, ChatRole};

use crate::error::ApiError;
use crate::server::AppState;

/// Request body for `POST /functions/v1/generate-narrative-map`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateNarrativeMapRequest {
    /// Target client (required).
    #[serde(default)]
    pub client_email: Option<String>,
    /// Explicit engagement to analyze instead of the active one.
    #[serde(default)]
    pub engagement_id: Option<String>,
    /// Accepted for wire compatibility; currently unused.
    #[serde(default)]
    pub regenerate_all: bool,
}

/// Response body for a successful generation.
#[derive(Debug, Serialize)]
pub struct GenerateNarrativeMapResponse {
    /// Always `true` on the 200 path.
    pub success: bool,
    /// The engagement that was updated.
    pub engagement_id: String,
    /// The full merged payload, for immediate display.
    pub insights: MergedInsights,
    /// Human-readable confirmation.
    pub message: String,
}

/// `POST /functions/v1/generate-narrative-map`
pub async fn generate_narrative_map(
    State(state): State<AppState>,
    Json(request): Json<GenerateNarrativeMapRequest>,
) -> Result<Json<GenerateNarrativeMapResponse>, ApiError> {
    let email = request
        .client_email
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Client email is required".into()))?;
    let engagement_id = request.engagement_id.map(EngagementId::from);

    let outcome = state
        .narrative
        .generate(&ClientEmail::from(email), engagement_id.as_ref())
        .await?;

    Ok(Json(GenerateNarrativeMapResponse {
        success: true,
        engagement_id: outcome.engagement_id.to_string(),
        insights: outcome.insights,
        message: "Narrative Integrity Map generated successfully".into(),
    }))
}

/// One prior conversation turn on the wire.
#[derive(Debug, Deserialize)]
pub struct WireChatMessage {
    /// `"user"` or `"assistant"` (anything else is treated as user).
    pub role: String,
    /// Message text.
    pub content: String,
}

/// Request body for `POST /functions/v1/coaching-chat`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachingChatRequest {
    /// Selected client, if any.
    #[serde(default)]
    pub client_email: Option<String>,
    /// The coach's new message (required).
    #[serde(default)]
    pub message: Option<String>,
    /// Prior turns, oldest first.
    #[serde(default)]
    pub conversation_history: Vec<WireChatMessage>,
}

/// Response body for the chat endpoint.
#[derive(Debug, Serialize)]
pub struct CoachingChatResponse {
    /// The assistant's reply.
    pub response: String,
}

/// `POST /functions/v1/coaching-chat`
pub async fn coaching_chat(
    State(state): State<AppState>,
    Json(request): Json<CoachingChatRequest>,
) -> Result<Json<CoachingChatResponse>, ApiError> {
    let message = request
        .message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Message is required".into()))?;

    let history = request
        .conversation_history
        .into_iter()
        .map(|m| ChatMessage {
            role: if m.role == "assistant" {
                ChatRole::Assistant
            } else {
                ChatRole::User
            },
            content: m.content,
        })
        .collect();

    let reply = state
        .chat
        .respond(&ChatRequest {
            client_email: request
                .client_email
                .filter(|e| !e.trim().is_empty())
                .map(ClientEmail::from),
            message,
            history,
        })
        .await?;

    Ok(Json(CoachingChatResponse { response: reply }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_request_accepts_camel_case() {
        let req: GenerateNarrativeMapRequest = serde_json::from_str(
            r#"{"clientEmail": "a@x.com", "engagementId": "eng-1", "regenerateAll": true}"#,
        )
        .unwrap();
        assert_eq!(req.client_email.as_deref(), Some("a@x.com"));
        assert_eq!(req.engagement_id.as_deref(), Some("eng-1"));
        assert!(req.regenerate_all);
    }

    #[test]
    fn generate_request_fields_default() {
        let req: GenerateNarrativeMapRequest = serde_json::from_str("{}").unwrap();
        assert!(req.client_email.is_none());
        assert!(req.engagement_id.is_none());
        assert!(!req.regenerate_all);
    }

    #[test]
    fn chat_request_accepts_history() {
        let req: CoachingChatRequest = serde_json::from_str(
            r#"{"message": "hi", "conversationHistory": [{"role": "assistant", "content": "hello"}]}"#,
        )
        .unwrap();
        assert_eq!(req.message.as_deref(), Some("hi"));
        assert_eq!(req.conversation_history.len(), 1);
        assert_eq!(req.conversation_history[0].role, "assistant");
    }
}
