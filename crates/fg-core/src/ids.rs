//! Branded ID newtypes for type safety.
//!
//! Every persisted entity has a distinct ID type implemented as a newtype
//! wrapper around `String`. This prevents accidentally passing a snapshot ID
//! where an engagement ID is expected.
//!
//! All IDs are UUID v7 (time-ordered) generated via [`uuid::Uuid::now_v7`].
//! Clients are the one exception: they are keyed by email address, modeled by
//! [`ClientEmail`].

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Generate a new UUID v7 string (time-ordered).
fn new_v7() -> String {
    Uuid::now_v7().to_string()
}

macro_rules! branded_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new random ID (UUID v7, time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(new_v7())
            }

            /// Create from an existing string value.
            #[must_use]
            pub fn from_string(s: String) -> Self {
                Self(s)
            }

            /// Return the inner string as a slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume self and return the inner `String`.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

branded_id! {
    /// Unique identifier for a coaching engagement.
    EngagementId
}

branded_id! {
    /// Unique identifier for a FIRES snapshot.
    SnapshotId
}

branded_id! {
    /// Unique identifier for a more/less marker.
    MarkerId
}

branded_id! {
    /// Unique identifier for a marker progress update.
    UpdateId
}

branded_id! {
    /// Unique identifier for an impact verification entry.
    ImpactId
}

branded_id! {
    /// Unique identifier for a session transcript.
    TranscriptId
}

branded_id! {
    /// Unique identifier for a coaching note.
    NoteId
}

branded_id! {
    /// Unique identifier for a voice memo.
    MemoId
}

branded_id! {
    /// Unique identifier for a client file record.
    FileId
}

branded_id! {
    /// Unique identifier for a narrative-map history entry.
    HistoryId
}

/// Client identity key — an email address.
///
/// Clients are keyed by email across every table, so this gets its own
/// newtype rather than a UUID-backed branded ID. Comparison and storage are
/// case-sensitive; callers normalize at the boundary if needed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientEmail(String);

impl ClientEmail {
    /// Create from an existing email string.
    #[must_use]
    pub fn from_string(s: String) -> Self {
        Self(s)
    }

    /// Return the inner string as a slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume self and return the inner `String`.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Whether the address is empty after trimming.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl AsRef<str> for ClientEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ClientEmail {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ClientEmail {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<ClientEmail> for String {
    fn from(email: ClientEmail) -> Self {
        email.0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
