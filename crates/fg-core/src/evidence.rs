//! Evidence records: the append-mostly tables the context aggregator reads.
//!
//! All of these are immutable once written except [`MoreLessMarker`]'s
//! `current_score` and `exchange_insight`, which a coach can update.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::fires::{FiresElement, Zone};
use crate::ids::{
    ClientEmail, FileId, ImpactId, MarkerId, MemoId, NoteId, SnapshotId, TranscriptId, UpdateId,
};

// ─────────────────────────────────────────────────────────────────────────────
// Snapshots
// ─────────────────────────────────────────────────────────────────────────────

/// Optional AI narrative attached to a snapshot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SnapshotNarrative {
    /// One-paragraph summary.
    pub summary: Option<String>,
}

/// Point-in-time FIRES self-assessment.
///
/// `overall_zone` and the per-category zones are quarantined to `None` when
/// the stored label doesn't parse, rather than failing the read.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    /// Primary key.
    pub id: SnapshotId,
    /// Owning client.
    pub client_email: ClientEmail,
    /// The goal the snapshot was taken against.
    pub goal: Option<String>,
    /// Overall zone placement.
    pub overall_zone: Option<Zone>,
    /// Confidence score (0–10).
    pub confidence_score: Option<f64>,
    /// Alignment score (0–10).
    pub alignment_score: Option<f64>,
    /// FIRES category with the most growth room.
    pub growth_opportunity_category: Option<String>,
    /// Zone of the growth-opportunity category.
    pub growth_opportunity_zone: Option<Zone>,
    /// FIRES category most firmly owned.
    pub owning_highlight_category: Option<String>,
    /// Zone of the owning-highlight category.
    pub owning_highlight_zone: Option<Zone>,
    /// Per-element zone labels (kept as raw strings — display only).
    pub zone_breakdown: Option<BTreeMap<String, String>>,
    /// Future-story answers keyed by question code (`fs1`…`fs6`).
    pub fs_answers: Option<BTreeMap<String, String>>,
    /// Past-story answers keyed by question code (`ps1`…`ps4`).
    pub ps_answers: Option<BTreeMap<String, String>>,
    /// Who helped in the past.
    pub past_support: Option<String>,
    /// Who they'll rely on going forward.
    pub future_support: Option<String>,
    /// Optional AI narrative summary.
    pub narrative: Option<SnapshotNarrative>,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
}

// ─────────────────────────────────────────────────────────────────────────────
// More/Less markers
// ─────────────────────────────────────────────────────────────────────────────

/// Direction of a more/less marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    /// The client wants more of this.
    More,
    /// The client wants less of this.
    Less,
}

impl MarkerKind {
    /// Uppercase label used in the context document.
    #[must_use]
    pub fn as_upper(self) -> &'static str {
        match self {
            Self::More => "MORE",
            Self::Less => "LESS",
        }
    }
}

/// A behavioral marker tracked from baseline toward a target score.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MoreLessMarker {
    /// Primary key.
    pub id: MarkerId,
    /// Owning client.
    pub client_email: ClientEmail,
    /// Direction.
    pub marker_type: MarkerKind,
    /// What is being tracked.
    pub marker_text: String,
    /// Score when the marker was created.
    pub baseline_score: i64,
    /// Latest score (coach-updatable).
    pub current_score: i64,
    /// Score the client is working toward.
    pub target_score: i64,
    /// FIRES lever the marker connects to.
    pub fires_connection: Option<FiresElement>,
    /// What the client is exchanging to move the score (coach-updatable).
    pub exchange_insight: Option<String>,
    /// Whether the marker is currently tracked.
    pub is_active: bool,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
}

impl MoreLessMarker {
    /// Signed progress since baseline, oriented so positive always means
    /// progress: `current − baseline` for "more" markers, `baseline −
    /// current` for "less" markers.
    #[must_use]
    pub fn progress_delta(&self) -> i64 {
        match self.marker_type {
            MarkerKind::More => self.current_score - self.baseline_score,
            MarkerKind::Less => self.baseline_score - self.current_score,
        }
    }

    /// Fraction of the baseline→target span covered, clamped to `0.0..=1.0`.
    ///
    /// A marker created already at its target (`baseline == target`) reports
    /// `1.0` — fully achieved — instead of dividing by zero.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress_fraction(&self) -> f64 {
        let span = match self.marker_type {
            MarkerKind::More => self.target_score - self.baseline_score,
            MarkerKind::Less => self.baseline_score - self.target_score,
        };
        if span == 0 {
            return 1.0;
        }
        (self.progress_delta() as f64 / span as f64).clamp(0.0, 1.0)
    }

    /// Parenthesized progress annotation for the context document.
    #[must_use]
    pub fn progress_label(&self) -> String {
        if self.baseline_score == self.target_score {
            return "(target achieved)".to_owned();
        }
        let delta = self.progress_delta();
        if delta > 0 {
            format!("(+{delta} progress)")
        } else if delta < 0 {
            format!("({delta} regression)")
        } else {
            "(no change)".to_owned()
        }
    }
}

/// One progress update row for a marker.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MarkerUpdate {
    /// Primary key.
    pub id: UpdateId,
    /// Marker being updated.
    pub marker_id: MarkerId,
    /// Date of the update.
    pub update_date: NaiveDate,
    /// Score recorded.
    pub score: i64,
    /// Optional note.
    pub note: Option<String>,
    /// Optional exchange note.
    pub exchange_note: Option<String>,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Impact verifications
// ─────────────────────────────────────────────────────────────────────────────

/// Free-text responses attached to an impact entry.
///
/// Two generations of the capture form exist; the newer codes (`what_did`,
/// `how_did`, `what_impact`) take precedence over the legacy ones
/// (`moment`, `role`, `impact`) when both are present.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ImpactResponses {
    /// What the client did.
    pub what_did: Option<String>,
    /// Legacy alias for `what_did`.
    pub moment: Option<String>,
    /// How they did it.
    pub how_did: Option<String>,
    /// Legacy alias for `how_did`.
    pub role: Option<String>,
    /// The impact created.
    pub what_impact: Option<String>,
    /// Legacy alias for `what_impact`.
    pub impact: Option<String>,
}

impl ImpactResponses {
    /// What the client did, preferring the current question code.
    #[must_use]
    pub fn what_happened(&self) -> Option<&str> {
        self.what_did.as_deref().or(self.moment.as_deref())
    }

    /// How they did it, preferring the current question code.
    #[must_use]
    pub fn how(&self) -> Option<&str> {
        self.how_did.as_deref().or(self.role.as_deref())
    }

    /// The impact created, preferring the current question code.
    #[must_use]
    pub fn impact_created(&self) -> Option<&str> {
        self.what_impact.as_deref().or(self.impact.as_deref())
    }
}

/// A verified impact entry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImpactVerification {
    /// Primary key.
    pub id: ImpactId,
    /// Owning client.
    pub client_email: ClientEmail,
    /// Capture-form responses.
    #[serde(default)]
    pub responses: ImpactResponses,
    /// The client's one-line integrity statement.
    pub integrity_line: Option<String>,
    /// FIRES levers this impact exercised.
    #[serde(default)]
    pub fires_focus: Vec<FiresElement>,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Sessions, notes, memos, files
// ─────────────────────────────────────────────────────────────────────────────

/// A quoted line from a session with optional context.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeyQuote {
    /// The quote itself.
    pub quote: String,
    /// Where it came up.
    pub context: Option<String>,
}

/// A coaching session record with optional raw transcript.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionTranscript {
    /// Primary key.
    pub id: TranscriptId,
    /// Owning client.
    pub client_email: ClientEmail,
    /// Session number within the engagement.
    pub session_number: i64,
    /// Date of the session.
    pub session_date: NaiveDate,
    /// Coach-written summary.
    pub summary: Option<String>,
    /// Key themes.
    #[serde(default)]
    pub key_themes: Vec<String>,
    /// Breakthroughs the client had.
    pub client_breakthroughs: Option<String>,
    /// Coach observations.
    pub coach_observations: Option<String>,
    /// Focus for the next session.
    pub next_session_focus: Option<String>,
    /// Key quotes.
    #[serde(default)]
    pub key_quotes: Vec<KeyQuote>,
    /// Raw transcript text (may be large).
    pub transcript_text: Option<String>,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
}

/// A dated coach note.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CoachingNote {
    /// Primary key.
    pub id: NoteId,
    /// Owning client.
    pub client_email: ClientEmail,
    /// Date of the note.
    pub note_date: NaiveDate,
    /// Note content.
    pub content: String,
    /// What the coach is curious about.
    pub coach_curiosity: Option<String>,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
}

/// A voice memo with its transcription.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VoiceMemo {
    /// Primary key.
    pub id: MemoId,
    /// Owning client.
    pub client_email: ClientEmail,
    /// Memo title.
    pub title: Option<String>,
    /// Transcription text.
    pub transcription: Option<String>,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
}

/// File metadata only — bytes live in hosted object storage.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientFile {
    /// Primary key.
    pub id: FileId,
    /// Owning client.
    pub client_email: ClientEmail,
    /// Original file name.
    pub file_name: String,
    /// MIME type or extension label.
    pub file_type: Option<String>,
    /// Coach-entered description.
    pub description: Option<String>,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
