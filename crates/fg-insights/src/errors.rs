//! Insight pipeline error type.

use thiserror::Error;

use fg_context::AggregateError;
use fg_core::insights::ValidationError;
use fg_llm::ProviderError;
use fg_store::StoreError;

/// Errors from the narrative-map pipeline.
///
/// The variants map onto the HTTP taxonomy: [`NoActiveEngagement`] → 404,
/// a store [`VersionConflict`](StoreError::VersionConflict) → 409, and
/// everything else → 500 with the underlying message.
#[derive(Debug, Error)]
pub enum InsightError {
    /// The client has no active engagement; nothing was generated or stored.
    #[error("No active engagement found for this client")]
    NoActiveEngagement,

    /// The generation service call failed.
    #[error("generation failed: {0}")]
    Generation(#[from] ProviderError),

    /// The generation service returned unparseable content.
    #[error("Failed to parse AI response as JSON: {message}")]
    Parse {
        /// Parser error description.
        message: String,
    },

    /// The parsed payload violates the output contract.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// A store read or the terminal write failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A blocking task panicked or was cancelled.
    #[error("task failed: {0}")]
    Join(String),

    /// Internal invariant failure (payload encoding).
    #[error("internal error: {message}")]
    Internal {
        /// What went wrong.
        message: String,
    },
}

impl From<AggregateError> for InsightError {
    fn from(err: AggregateError) -> Self {
        match err {
            AggregateError::NoActiveEngagement => Self::NoActiveEngagement,
            AggregateError::Store(e) => Self::Store(e),
            AggregateError::Join(message) => Self::Join(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_not_found_maps_through() {
        let err = InsightError::from(AggregateError::NoActiveEngagement);
        assert!(matches!(err, InsightError::NoActiveEngagement));
        assert_eq!(err.to_string(), "No active engagement found for this client");
    }

    #[test]
    fn parse_error_message() {
        let err = InsightError::Parse {
            message: "expected value at line 1".into(),
        };
        assert!(err.to_string().starts_with("Failed to parse AI response"));
    }
}
