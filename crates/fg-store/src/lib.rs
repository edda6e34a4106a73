//! # fg-store
//!
//! `SQLite` persistence for the narrative-map service.
//!
//! - Connection pooling via `r2d2` with WAL mode and foreign keys enabled
//! - Versioned, embedded, transactional migrations (including the
//!   zone-defaults seed)
//! - Stateless repositories, one per table — every method takes a
//!   `&Connection` so callers control pooling and blocking-task placement
//! - Validate-on-read decoding: evidence rows that fail validation are
//!   quarantined with a warning; a corrupt engagement row is a hard error

#![deny(unsafe_code)]

pub mod connection;
pub mod errors;
pub mod migrations;
pub mod repos;

pub use connection::{ConnectionConfig, ConnectionPool, PooledConnection, new_file, new_in_memory};
pub use errors::{Result, StoreError};
pub use repos::{
    ClientRepo, EngagementRepo, FileRepo, HistoryRepo, ImpactRepo, MarkerRepo, NoteRepo,
    SnapshotRepo, TranscriptRepo, VoiceMemoRepo, ZoneDefaultRepo,
};

/// Open a file-backed pool and bring the schema up to date.
pub fn open(path: &str, config: &ConnectionConfig) -> Result<ConnectionPool> {
    let pool = new_file(path, config)?;
    let conn = pool.get()?;
    let _ = migrations::run_migrations(&conn)?;
    Ok(pool)
}

/// Open an in-memory pool (shared cache) and bring the schema up to date.
///
/// Intended for tests: every pooled connection sees the same database.
pub fn open_in_memory() -> Result<ConnectionPool> {
    let pool = new_in_memory(&ConnectionConfig::default())?;
    let conn = pool.get()?;
    let _ = migrations::run_migrations(&conn)?;
    Ok(pool)
}
