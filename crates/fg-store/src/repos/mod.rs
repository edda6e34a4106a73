//! Stateless repositories, one per table.
//!
//! Every method takes a `&Connection` so callers decide pooling and
//! blocking-task placement. Decoding follows the validate-on-read policy:
//! evidence rows that fail validation are quarantined (skipped with a
//! warning), while a corrupt engagement row is a hard [`StoreError::Decode`]
//! because the engagement is the merge target.

pub mod clients;
pub mod engagements;
pub mod history;
pub mod journal;
pub mod markers;
pub mod snapshots;
pub mod zones;

pub use clients::ClientRepo;
pub use engagements::EngagementRepo;
pub use history::HistoryRepo;
pub use journal::{FileRepo, ImpactRepo, NoteRepo, TranscriptRepo, VoiceMemoRepo};
pub use markers::MarkerRepo;
pub use snapshots::SnapshotRepo;
pub use zones::ZoneDefaultRepo;

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;

/// Parse an RFC 3339 timestamp column.
pub(crate) fn parse_ts(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("bad timestamp {raw:?}: {e}"))
}

/// Parse an ISO-8601 date column.
pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| format!("bad date {raw:?}: {e}"))
}

/// Decode an optional JSON column; `NULL` and empty text decode to `None`.
pub(crate) fn decode_opt<T: DeserializeOwned>(
    column: &str,
    raw: Option<&str>,
) -> Result<Option<T>, String> {
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => serde_json::from_str(s)
            .map(Some)
            .map_err(|e| format!("{column}: {e}")),
    }
}

/// Decode a JSON list column; `NULL` decodes to an empty list.
pub(crate) fn decode_list<T: DeserializeOwned>(
    column: &str,
    raw: Option<&str>,
) -> Result<Vec<T>, String> {
    match raw {
        None => Ok(Vec::new()),
        Some(s) if s.trim().is_empty() => Ok(Vec::new()),
        Some(s) => serde_json::from_str(s).map_err(|e| format!("{column}: {e}")),
    }
}

/// Encode a value into a JSON text column.
pub(crate) fn encode_json<T: serde::Serialize>(
    table: &'static str,
    value: &T,
) -> crate::errors::Result<String> {
    serde_json::to_string(value).map_err(|e| crate::errors::StoreError::Decode {
        table,
        message: format!("failed to encode column: {e}"),
    })
}
