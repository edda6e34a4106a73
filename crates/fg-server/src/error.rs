//! API error type and status mapping.
//!
//! Every error body is `{"error": "<message>"}` to match the function
//! contract the dashboard consumes.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use fg_insights::{ChatError, InsightError};
use fg_llm::ProviderError;
use fg_store::StoreError;

/// HTTP-mapped API error.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed input → 400.
    BadRequest(String),
    /// No active engagement → 404.
    NotFound(String),
    /// Concurrent generation lost the version race → 409.
    Conflict(String),
    /// Gateway rate limit → 429.
    TooManyRequests(String),
    /// Gateway billing failure → 402.
    PaymentRequired(String),
    /// Everything else → 500 with the underlying message.
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::PaymentRequired(_) => StatusCode::PAYMENT_REQUIRED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::BadRequest(m)
            | Self::NotFound(m)
            | Self::Conflict(m)
            | Self::TooManyRequests(m)
            | Self::PaymentRequired(m)
            | Self::Internal(m) => m,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = %status, error = self.message(), "request failed");
        }
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}

impl From<InsightError> for ApiError {
    fn from(err: InsightError) -> Self {
        match err {
            InsightError::NoActiveEngagement => Self::NotFound(err.to_string()),
            InsightError::Store(StoreError::VersionConflict { .. }) => {
                Self::Conflict(err.to_string())
            }
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Provider(ProviderError::RateLimited { message, .. }) => {
                Self::TooManyRequests(message)
            }
            ChatError::Provider(ProviderError::Api {
                status: 402,
                message,
                ..
            }) => Self::PaymentRequired(message),
            other => Self::Internal(other.to_string()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insight_not_found_maps_to_404() {
        let api: ApiError = InsightError::NoActiveEngagement.into();
        assert!(matches!(api, ApiError::NotFound(_)));
        assert_eq!(api.status(), StatusCode::NOT_FOUND);
        assert_eq!(api.message(), "No active engagement found for this client");
    }

    #[test]
    fn version_conflict_maps_to_409() {
        let api: ApiError = InsightError::Store(StoreError::VersionConflict {
            engagement_id: "eng-1".into(),
            expected: 4,
        })
        .into();
        assert_eq!(api.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn generation_failure_maps_to_500() {
        let api: ApiError = InsightError::Parse {
            message: "bad json".into(),
        }
        .into();
        assert_eq!(api.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn chat_rate_limit_passes_through() {
        let api: ApiError = ChatError::Provider(ProviderError::RateLimited {
            retry_after_ms: None,
            message: "Rate limit exceeded. Please try again in a moment.".into(),
        })
        .into();
        assert_eq!(api.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn chat_billing_passes_through() {
        let api: ApiError = ChatError::Provider(ProviderError::Api {
            status: 402,
            message: "AI credits depleted. Please add credits to continue.".into(),
            code: None,
        })
        .into();
        assert_eq!(api.status(), StatusCode::PAYMENT_REQUIRED);
    }

    #[test]
    fn other_chat_errors_are_500() {
        let api: ApiError = ChatError::Provider(ProviderError::Api {
            status: 503,
            message: "AI Gateway error: 503".into(),
            code: None,
        })
        .into();
        assert_eq!(api.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
