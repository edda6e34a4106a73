//! Context size limits.
//!
//! Per-section caps keep the prompt bounded no matter how much history a
//! client has accumulated. Raw file bytes never enter the context — file
//! records contribute metadata and description only.

/// Most recent snapshots included.
pub const SNAPSHOT_LIMIT: usize = 5;

/// Most recent impact entries included.
pub const IMPACT_LIMIT: usize = 20;

/// Most recent sessions included.
pub const SESSION_LIMIT: usize = 5;

/// Most recent coaching notes included.
pub const NOTE_LIMIT: usize = 10;

/// Most recent marker progress updates included (across all active markers).
pub const MARKER_UPDATE_LIMIT: usize = 20;

/// Most recent voice memos included.
pub const VOICE_MEMO_LIMIT: usize = 10;

/// Most recent file records included.
pub const FILE_LIMIT: usize = 10;

/// Transcripts at or above this many characters are omitted entirely.
pub const TRANSCRIPT_INLINE_MAX_CHARS: usize = 5_000;

/// Characters of transcript excerpt included for short transcripts.
pub const TRANSCRIPT_EXCERPT_CHARS: usize = 2_000;

/// Characters of voice-memo transcription included per memo.
pub const MEMO_EXCERPT_CHARS: usize = 1_000;
