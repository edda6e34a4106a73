//! Context aggregator.
//!
//! Loads everything the generator needs for one client in a fan-out/fan-in
//! join: the independent read queries run concurrently on pooled
//! connections inside blocking tasks, and all must complete before the
//! caller proceeds. Marker progress updates are a second, dependent read
//! (they need the active marker ids).
//!
//! Read-only — never modifies state. Any failing read aborts the whole
//! aggregation rather than substituting an empty list, so a store outage is
//! never mistaken for an empty history.

use thiserror::Error;
use tracing::instrument;

use fg_core::{
    Client, ClientEmail, ClientFile, CoachingEngagement, CoachingNote, EngagementId,
    ImpactVerification, MarkerUpdate, MoreLessMarker, SessionTranscript, Snapshot, VoiceMemo,
    ZoneDefault,
};
use fg_store::{
    ClientRepo, ConnectionPool, EngagementRepo, FileRepo, ImpactRepo, MarkerRepo, NoteRepo,
    SnapshotRepo, StoreError, TranscriptRepo, VoiceMemoRepo, ZoneDefaultRepo,
};

use crate::constants::{
    FILE_LIMIT, IMPACT_LIMIT, MARKER_UPDATE_LIMIT, NOTE_LIMIT, SESSION_LIMIT, SNAPSHOT_LIMIT,
    VOICE_MEMO_LIMIT,
};

/// Errors from context aggregation.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// The client has no active engagement (or the explicitly requested
    /// engagement doesn't exist).
    #[error("No active engagement found for this client")]
    NoActiveEngagement,

    /// A read query failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A blocking read task panicked or was cancelled.
    #[error("data fetch task failed: {0}")]
    Join(String),
}

/// Everything the generator and merger need for one client.
#[derive(Clone, Debug)]
pub struct ClientContext {
    /// Client identity row (absent rows fall back to the email address).
    pub client: Option<Client>,
    /// The engagement being analyzed.
    pub engagement: CoachingEngagement,
    /// Active more/less markers.
    pub markers: Vec<MoreLessMarker>,
    /// Recent snapshots, newest first.
    pub snapshots: Vec<Snapshot>,
    /// Recent impact entries, newest first.
    pub impacts: Vec<ImpactVerification>,
    /// Recent sessions, newest first.
    pub sessions: Vec<SessionTranscript>,
    /// Recent coaching notes, newest first.
    pub notes: Vec<CoachingNote>,
    /// Recent marker progress updates, newest first.
    pub marker_updates: Vec<MarkerUpdate>,
    /// Recent voice memos, newest first.
    pub voice_memos: Vec<VoiceMemo>,
    /// Recent file records, newest first.
    pub files: Vec<ClientFile>,
    /// Zone reference rows (for the merger).
    pub zone_defaults: Vec<ZoneDefault>,
}

/// Runs one read closure on a pooled connection inside a blocking task.
async fn spawn_read<T, F>(pool: ConnectionPool, read: F) -> Result<T, AggregateError>
where
    T: Send + 'static,
    F: FnOnce(&rusqlite::Connection) -> Result<T, StoreError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let conn = pool.get()?;
        read(&conn)
    })
    .await
    .map_err(|e| AggregateError::Join(e.to_string()))?
    .map_err(AggregateError::Store)
}

/// Read-only context aggregator over the store.
#[derive(Clone)]
pub struct ContextAggregator {
    pool: ConnectionPool,
}

impl ContextAggregator {
    /// Create an aggregator over the given pool.
    #[must_use]
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    /// Load the full context for a client.
    ///
    /// With an explicit `engagement_id` that engagement is loaded directly;
    /// otherwise the client's active engagement is used. Either way, no
    /// engagement means [`AggregateError::NoActiveEngagement`] and the
    /// pipeline aborts before the generator.
    #[instrument(skip(self), fields(client = %email))]
    pub async fn load(
        &self,
        email: &ClientEmail,
        engagement_id: Option<&EngagementId>,
    ) -> Result<ClientContext, AggregateError> {
        let email = email.clone();
        let engagement_id = engagement_id.cloned();

        let client_fut = spawn_read(self.pool.clone(), {
            let email = email.clone();
            move |conn| ClientRepo::get(conn, &email)
        });
        let engagement_fut = spawn_read(self.pool.clone(), {
            let email = email.clone();
            move |conn| match engagement_id {
                Some(id) => EngagementRepo::get(conn, &id),
                None => EngagementRepo::active_for_client(conn, &email),
            }
        });
        let markers_fut = spawn_read(self.pool.clone(), {
            let email = email.clone();
            move |conn| MarkerRepo::active_for_client(conn, &email)
        });
        let snapshots_fut = spawn_read(self.pool.clone(), {
            let email = email.clone();
            move |conn| SnapshotRepo::recent_for_client(conn, &email, SNAPSHOT_LIMIT)
        });
        let impacts_fut = spawn_read(self.pool.clone(), {
            let email = email.clone();
            move |conn| ImpactRepo::recent_for_client(conn, &email, IMPACT_LIMIT)
        });
        let sessions_fut = spawn_read(self.pool.clone(), {
            let email = email.clone();
            move |conn| TranscriptRepo::recent_for_client(conn, &email, SESSION_LIMIT)
        });
        let notes_fut = spawn_read(self.pool.clone(), {
            let email = email.clone();
            move |conn| NoteRepo::recent_for_client(conn, &email, NOTE_LIMIT)
        });
        let zones_fut = spawn_read(self.pool.clone(), ZoneDefaultRepo::all);
        let memos_fut = spawn_read(self.pool.clone(), {
            let email = email.clone();
            move |conn| VoiceMemoRepo::recent_for_client(conn, &email, VOICE_MEMO_LIMIT)
        });
        let files_fut = spawn_read(self.pool.clone(), {
            let email = email.clone();
            move |conn| FileRepo::recent_for_client(conn, &email, FILE_LIMIT)
        });

        // Fan-in: every read must succeed before the generator stage.
        let (client, engagement, markers, snapshots, impacts, sessions, notes, zone_defaults, voice_memos, files) =
            tokio::try_join!(
                client_fut,
                engagement_fut,
                markers_fut,
                snapshots_fut,
                impacts_fut,
                sessions_fut,
                notes_fut,
                zones_fut,
                memos_fut,
                files_fut,
            )?;

        let engagement = engagement.ok_or(AggregateError::NoActiveEngagement)?;

        // Dependent read: progress updates need the marker ids.
        let marker_updates = if markers.is_empty() {
            Vec::new()
        } else {
            let ids: Vec<_> = markers.iter().map(|m| m.id.clone()).collect();
            spawn_read(self.pool.clone(), move |conn| {
                MarkerRepo::recent_updates(conn, &ids, MARKER_UPDATE_LIMIT)
            })
            .await?
        };

        Ok(ClientContext {
            client,
            engagement,
            markers,
            snapshots,
            impacts,
            sessions,
            notes,
            marker_updates,
            voice_memos,
            files,
            zone_defaults,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
