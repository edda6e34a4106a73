//! Insight payloads: the generator's raw output contract, the merged shape
//! that is persisted, zone reference rows, and the audit-log entry.
//!
//! [`GeneratedInsights`] is exactly what the model is asked to return;
//! [`GeneratedInsights::validate`] enforces the output contract after
//! parsing. [`MergedInsights`] is the post-merge shape written to the
//! engagement row and echoed back to the caller.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fires::{FiresElement, Zone};
use crate::ids::{EngagementId, HistoryId};

// ─────────────────────────────────────────────────────────────────────────────
// Persisted insight fields
// ─────────────────────────────────────────────────────────────────────────────

/// Who authored an insight field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightSource {
    /// Written by the generation pipeline.
    Ai,
    /// Written or edited by a coach.
    Coach,
}

/// A named superpower with supporting evidence.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Superpower {
    /// Name of the superpower (usually a FIRES element or related quality).
    pub superpower: String,
    /// One sentence about what this means for the client.
    pub description: String,
    /// Concrete examples from the client's data.
    #[serde(default)]
    pub evidence: Vec<String>,
    /// The FIRES element it maps to.
    pub fires_element: FiresElement,
    /// Provenance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<InsightSource>,
    /// When the entry was produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Zone interpretation: static reference content overlaid with a
/// client-specific note.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ZoneInterpretation {
    /// The effective zone.
    pub zone: Zone,
    /// Static headline from the zone defaults (empty if no default row).
    #[serde(default)]
    pub headline: String,
    /// Static description from the zone defaults.
    #[serde(default)]
    pub description: String,
    /// Static "the work" guidance from the zone defaults.
    #[serde(default)]
    pub the_work: String,
    /// What this zone means for this client right now.
    #[serde(default)]
    pub custom_note: String,
    /// Provenance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<InsightSource>,
    /// When the interpretation was produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// One "what the world is asking" insight.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorldInsight {
    /// Full insight paragraph.
    pub insight: String,
    /// The FIRES element it speaks to.
    pub fires_element: FiresElement,
    /// Provenance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<InsightSource>,
    /// When the entry was produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Status of an assigned weekly action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    /// Assigned and open.
    Active,
    /// Marked done by the client or coach.
    Completed,
}

/// An assigned weekly action.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WeeklyAction {
    /// The action to take this week.
    pub action: String,
    /// The FIRES element it exercises.
    pub fires_element: FiresElement,
    /// Date the action was assigned.
    pub assigned_date: NaiveDate,
    /// Current status.
    pub status: ActionStatus,
}

/// Static reference row mapping a zone to its default content.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ZoneDefault {
    /// The zone this row describes.
    pub zone_name: Zone,
    /// Default headline.
    pub headline: String,
    /// Default description.
    pub description: String,
    /// Default "the work" guidance.
    pub the_work: String,
}

/// Append-only audit entry for narrative-map changes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NarrativeMapHistory {
    /// Primary key.
    pub id: HistoryId,
    /// Engagement the change applies to.
    pub engagement_id: EngagementId,
    /// Which field changed (`"ai_generation"` for pipeline writes).
    pub field_name: String,
    /// Prior value (`null` for pipeline writes).
    pub old_value: Option<Value>,
    /// New value (the full merged payload for pipeline writes).
    pub new_value: Value,
    /// Who made the change (`"ai"` for pipeline writes).
    pub changed_by: String,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Generator output contract
// ─────────────────────────────────────────────────────────────────────────────

/// A superpower as emitted by the generator (no provenance yet).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeneratedSuperpower {
    /// Name of the superpower.
    pub superpower: String,
    /// One-sentence description.
    pub description: String,
    /// Concrete examples from the client's data.
    #[serde(default)]
    pub evidence: Vec<String>,
    /// The FIRES element it maps to.
    pub fires_element: FiresElement,
}

/// The generator's zone block. Only `custom_note` survives the merge; the
/// effective zone is derived from stored data, not from the model.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GeneratedZone {
    /// Zone the model believes the client is in.
    #[serde(default)]
    pub zone: Option<Zone>,
    /// What this zone means for this client right now.
    #[serde(default)]
    pub custom_note: String,
}

/// One "what the world is asking" insight as emitted by the generator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeneratedWorldInsight {
    /// Full insight paragraph.
    pub insight: String,
    /// The FIRES element it speaks to.
    pub fires_element: FiresElement,
}

/// A suggested weekly action as emitted by the generator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SuggestedAction {
    /// The action to take this week.
    pub action: String,
    /// The FIRES element it exercises.
    pub fires_element: FiresElement,
}

/// The single JSON object the generator must return.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeneratedInsights {
    /// Superpowers the client knows and owns (2–3).
    pub superpowers_claimed: Vec<GeneratedSuperpower>,
    /// Superpowers the client is building confidence in (2–3).
    pub superpowers_emerging: Vec<GeneratedSuperpower>,
    /// Superpowers in the data the client hasn't claimed (2–3).
    pub superpowers_hidden: Vec<GeneratedSuperpower>,
    /// Zone block.
    #[serde(default)]
    pub zone_interpretation: GeneratedZone,
    /// What the world is asking (3–4).
    pub world_asking: Vec<GeneratedWorldInsight>,
    /// Suggested weekly actions (exactly 2).
    pub suggested_weekly_actions: Vec<SuggestedAction>,
    /// Anchor quote for the journey.
    #[serde(default)]
    pub suggested_anchor_quote: Option<String>,
}

/// A structural violation of the generator output contract.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("generated payload rejected: {field} {message}")]
pub struct ValidationError {
    /// Offending top-level field.
    pub field: &'static str,
    /// What went wrong.
    pub message: String,
}

fn check_count(
    field: &'static str,
    len: usize,
    min: usize,
    max: usize,
) -> Result<(), ValidationError> {
    if len < min || len > max {
        return Err(ValidationError {
            field,
            message: format!("has {len} items, expected {min}\u{2013}{max}"),
        });
    }
    Ok(())
}

impl GeneratedInsights {
    /// Enforce the output contract: 2–3 items per superpower list, 3–4
    /// world-asking insights, exactly 2 suggested actions.
    ///
    /// FIRES/zone enum validity is already guaranteed by deserialization; a
    /// missing anchor quote is tolerated (stored as `null`).
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_count("superpowers_claimed", self.superpowers_claimed.len(), 2, 3)?;
        check_count("superpowers_emerging", self.superpowers_emerging.len(), 2, 3)?;
        check_count("superpowers_hidden", self.superpowers_hidden.len(), 2, 3)?;
        check_count("world_asking", self.world_asking.len(), 3, 4)?;
        check_count(
            "suggested_weekly_actions",
            self.suggested_weekly_actions.len(),
            2,
            2,
        )?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Merged payload
// ─────────────────────────────────────────────────────────────────────────────

/// The fully merged insight payload: persisted onto the engagement row,
/// recorded verbatim in the history table, and returned to the caller.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MergedInsights {
    /// Superpowers claimed, stamped with provenance.
    pub superpowers_claimed: Vec<Superpower>,
    /// Superpowers emerging, stamped with provenance.
    pub superpowers_emerging: Vec<Superpower>,
    /// Superpowers hidden, stamped with provenance.
    pub superpowers_hidden: Vec<Superpower>,
    /// Zone interpretation with defaults overlaid.
    pub zone_interpretation: ZoneInterpretation,
    /// World-asking insights, stamped with provenance.
    pub world_asking: Vec<WorldInsight>,
    /// Weekly actions with assignment date and status.
    pub weekly_actions: Vec<WeeklyAction>,
    /// Anchor quote (may be absent).
    pub anchor_quote: Option<String>,
    /// When this payload was generated.
    pub ai_insights_generated_at: DateTime<Utc>,
    /// Version after the merge (prior value + 1).
    pub ai_insights_version: i64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
