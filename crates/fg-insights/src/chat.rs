//! Coaching chat service.
//!
//! Single-pass prompt-and-respond for coaches: optional client context,
//! prior conversation history, one gateway call, one reply. No merge, no
//! versioning, no persistence — rate-limit and billing statuses from the
//! gateway pass through untouched.

use std::fmt::Write as _;
use std::sync::Arc;

use thiserror::Error;
use tracing::instrument;

use fg_context::prompts::chat_system_prompt;
use fg_core::{Client, ClientEmail, SessionTranscript};
use fg_llm::{ChatMessage, CompletionRequest, Provider, ProviderError};
use fg_store::{ClientRepo, ConnectionPool, StoreError, TranscriptRepo};

/// Sessions included in the chat client context.
const CHAT_SESSION_LIMIT: usize = 5;

/// Errors from the chat service.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The gateway call failed (statuses preserved for passthrough).
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Client context read failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A blocking task panicked or was cancelled.
    #[error("task failed: {0}")]
    Join(String),
}

/// A chat turn from the coach.
#[derive(Clone, Debug)]
pub struct ChatRequest {
    /// Selected client, if any.
    pub client_email: Option<ClientEmail>,
    /// The coach's new message.
    pub message: String,
    /// Prior conversation turns, oldest first.
    pub history: Vec<ChatMessage>,
}

/// The coaching chat service.
pub struct ChatService {
    pool: ConnectionPool,
    provider: Arc<dyn Provider>,
}

fn format_client_context(client: &Client, sessions: &[SessionTranscript]) -> String {
    let mut ctx = String::new();
    let _ = writeln!(ctx, "## Current Client: {}", client.display_name());
    ctx.push('\n');
    let _ = writeln!(ctx, "**Personal Info:**");
    let _ = writeln!(ctx, "- Email: {}", client.email);
    let _ = writeln!(ctx, "- Start Date: {}", client.created_at.format("%Y-%m-%d"));
    if !sessions.is_empty() {
        ctx.push('\n');
        let _ = writeln!(ctx, "**Recent Sessions:**");
        for session in sessions {
            let _ = writeln!(
                ctx,
                "- {}: {}",
                session.session_date.format("%Y-%m-%d"),
                session.summary.as_deref().unwrap_or("No summary")
            );
        }
    }
    ctx
}

impl ChatService {
    /// Create the chat service over a store pool and a gateway provider.
    #[must_use]
    pub fn new(pool: ConnectionPool, provider: Arc<dyn Provider>) -> Self {
        Self { pool, provider }
    }

    /// Answer one coach message.
    #[instrument(skip_all, fields(has_client = request.client_email.is_some()))]
    pub async fn respond(&self, request: &ChatRequest) -> Result<String, ChatError> {
        let client_context = match &request.client_email {
            Some(email) => self.load_client_context(email).await?,
            None => None,
        };

        let system = chat_system_prompt(client_context.as_deref());
        let mut messages = request.history.clone();
        messages.push(ChatMessage::user(request.message.clone()));

        let completion = self
            .provider
            .complete(&CompletionRequest {
                system: Some(system),
                messages,
                max_tokens: None,
                temperature: None,
            })
            .await?;

        Ok(completion.text)
    }

    /// Load a compact client context (identity + recent sessions).
    ///
    /// An unknown client email yields no context rather than an error — the
    /// assistant falls back to general coaching guidance.
    async fn load_client_context(&self, email: &ClientEmail) -> Result<Option<String>, ChatError> {
        let pool = self.pool.clone();
        let email = email.clone();
        tokio::task::spawn_blocking(move || -> Result<Option<String>, ChatError> {
            let conn = pool.get().map_err(StoreError::from)?;
            let Some(client) = ClientRepo::get(&conn, &email)? else {
                return Ok(None);
            };
            let sessions = TranscriptRepo::recent_for_client(&conn, &email, CHAT_SESSION_LIMIT)?;
            Ok(Some(format_client_context(&client, &sessions)))
        })
        .await
        .map_err(|e| ChatError::Join(e.to_string()))?
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::tests_support::ScriptedProvider;
    use chrono::Utc;
    use fg_core::{ClientStatus, TranscriptId};

    fn seed_client_with_session(pool: &ConnectionPool, email: &str) {
        let conn = pool.get().unwrap();
        ClientRepo::insert(
            &conn,
            &Client {
                email: ClientEmail::from(email),
                name: Some("Avery Chen".into()),
                status: ClientStatus::Approved,
                coach_email: None,
                created_at: Utc::now(),
            },
        )
        .unwrap();
        TranscriptRepo::insert(
            &conn,
            &SessionTranscript {
                id: TranscriptId::new(),
                client_email: ClientEmail::from(email),
                session_number: 1,
                session_date: Utc::now().date_naive(),
                summary: Some("Worked the delegation story".into()),
                key_themes: vec![],
                client_breakthroughs: None,
                coach_observations: None,
                next_session_focus: None,
                key_quotes: vec![],
                transcript_text: None,
                created_at: Utc::now(),
            },
        )
        .unwrap();
    }

    #[tokio::test]
    async fn responds_without_client_context() {
        let pool = fg_store::open_in_memory().unwrap();
        let provider = Arc::new(ScriptedProvider::ok("Try an open question.".into()));
        let svc = ChatService::new(pool, provider.clone());

        let reply = svc
            .respond(&ChatRequest {
                client_email: None,
                message: "How do I open a first session?".into(),
                history: vec![],
            })
            .await
            .unwrap();
        assert_eq!(reply, "Try an open question.");

        let seen = provider.last_request().unwrap();
        assert!(seen.system.unwrap().contains("No client is currently selected"));
    }

    #[tokio::test]
    async fn client_context_includes_sessions_and_history_order() {
        let pool = fg_store::open_in_memory().unwrap();
        seed_client_with_session(&pool, "a@x.com");

        let provider = Arc::new(ScriptedProvider::ok("Lead with the win.".into()));
        let svc = ChatService::new(pool, provider.clone());

        let reply = svc
            .respond(&ChatRequest {
                client_email: Some(ClientEmail::from("a@x.com")),
                message: "What should we focus on next?".into(),
                history: vec![
                    ChatMessage::user("Earlier question"),
                    ChatMessage::assistant("Earlier answer"),
                ],
            })
            .await
            .unwrap();
        assert_eq!(reply, "Lead with the win.");

        let seen = provider.last_request().unwrap();
        let system = seen.system.unwrap();
        assert!(system.contains("## Current Client: Avery Chen"));
        assert!(system.contains("Worked the delegation story"));
        assert_eq!(seen.messages.len(), 3);
        assert_eq!(seen.messages[2].content, "What should we focus on next?");
    }

    #[tokio::test]
    async fn unknown_client_falls_back_to_general_guidance() {
        let pool = fg_store::open_in_memory().unwrap();
        let provider = Arc::new(ScriptedProvider::ok("General advice.".into()));
        let svc = ChatService::new(pool, provider.clone());

        let _ = svc
            .respond(&ChatRequest {
                client_email: Some(ClientEmail::from("ghost@x.com")),
                message: "hi".into(),
                history: vec![],
            })
            .await
            .unwrap();

        let seen = provider.last_request().unwrap();
        assert!(seen.system.unwrap().contains("No client is currently selected"));
    }

    #[tokio::test]
    async fn gateway_errors_pass_through() {
        let pool = fg_store::open_in_memory().unwrap();
        let provider = Arc::new(ScriptedProvider::api_error(402, "credits depleted"));
        let svc = ChatService::new(pool, provider);

        let err = svc
            .respond(&ChatRequest {
                client_email: None,
                message: "hi".into(),
                history: vec![],
            })
            .await
            .unwrap_err();
        match err {
            ChatError::Provider(provider_err) => assert_eq!(provider_err.status(), Some(402)),
            other => panic!("expected provider error, got {other:?}"),
        }
    }
}
