//! Store error type.

use thiserror::Error;

/// Result alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors from the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to get a connection from the pool.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Underlying `SQLite` error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A migration failed to apply.
    #[error("migration failed: {message}")]
    Migration {
        /// What went wrong.
        message: String,
    },

    /// A stored row failed validate-on-read decoding.
    ///
    /// Only raised for rows the caller cannot proceed without (the
    /// engagement row); evidence rows are quarantined instead.
    #[error("corrupt row in {table}: {message}")]
    Decode {
        /// Table the row came from.
        table: &'static str,
        /// What failed to decode.
        message: String,
    },

    /// A row the operation requires does not exist.
    #[error("{what} not found")]
    NotFound {
        /// Description of the missing row.
        what: String,
    },

    /// Conditional update lost the race: the engagement's insight version
    /// moved between read and write.
    #[error("engagement {engagement_id} was updated concurrently (expected version {expected})")]
    VersionConflict {
        /// Engagement whose update was rejected.
        engagement_id: String,
        /// Version the writer read at aggregation time.
        expected: i64,
    },
}
