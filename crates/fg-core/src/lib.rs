//! # fg-core
//!
//! Foundation types for the Finding Good narrative-map service.
//!
//! - Branded ID newtypes (UUID v7, time-ordered) for every persisted entity
//! - Domain vocabulary: FIRES elements, zones, statuses
//! - Domain records: clients, engagements, and the evidence tables the
//!   context aggregator reads
//! - Insight payloads: the generator's raw output contract and the merged
//!   shape that is persisted and returned to callers

#![deny(unsafe_code)]

pub mod engagement;
pub mod evidence;
pub mod fires;
pub mod ids;
pub mod insights;

pub use engagement::{Challenge, Client, ClientStatus, CoachingEngagement, EngagementStatus, Goal, Phase};
pub use evidence::{
    ClientFile, CoachingNote, ImpactResponses, ImpactVerification, KeyQuote, MarkerKind,
    MarkerUpdate, MoreLessMarker, SessionTranscript, Snapshot, SnapshotNarrative, VoiceMemo,
};
pub use fires::{FiresElement, Zone};
pub use ids::{
    ClientEmail, EngagementId, FileId, HistoryId, ImpactId, MarkerId, MemoId, NoteId, SnapshotId,
    TranscriptId, UpdateId,
};
pub use insights::{
    ActionStatus, GeneratedInsights, GeneratedSuperpower, GeneratedWorldInsight,
    GeneratedZone, InsightSource, MergedInsights, NarrativeMapHistory, SuggestedAction,
    Superpower, ValidationError, WeeklyAction, WorldInsight, ZoneDefault, ZoneInterpretation,
};
