//! Clients and coaching engagements.
//!
//! The engagement is the unit the narrative-map pipeline operates on. Its
//! loosely structured list columns (`goals`, `challenges`, `fires_focus`, and
//! the generated-insight fields) are stored as JSON and decoded into the
//! explicit types here on read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fires::FiresElement;
use crate::ids::{ClientEmail, EngagementId};
use crate::insights::{Superpower, WeeklyAction, WorldInsight, ZoneInterpretation};

/// Client lifecycle status. Gates portal access; the core only reads it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    /// Signed up, awaiting coach approval.
    Pending,
    /// Active client.
    Approved,
    /// Deactivated by the coach.
    Inactive,
    /// Soft-deleted.
    Deleted,
}

/// Client identity record, keyed by email.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Client {
    /// Primary key.
    pub email: ClientEmail,
    /// Display name.
    pub name: Option<String>,
    /// Lifecycle status.
    pub status: ClientStatus,
    /// Assigned coach (email).
    pub coach_email: Option<String>,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
}

impl Client {
    /// Display name, falling back to the email address.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.email.as_str())
    }
}

/// Engagement lifecycle status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngagementStatus {
    /// In progress — the only status the pipeline targets.
    Active,
    /// Finished.
    Completed,
}

/// The three phases of the 12-week arc.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Weeks 1–4: name the story.
    Name,
    /// Weeks 5–8: validate it against lived evidence.
    Validate,
    /// Weeks 9–12: communicate it outward.
    Communicate,
}

impl Phase {
    /// Uppercase label used in the context document.
    #[must_use]
    pub fn as_upper(self) -> &'static str {
        match self {
            Self::Name => "NAME",
            Self::Validate => "VALIDATE",
            Self::Communicate => "COMMUNICATE",
        }
    }
}

/// A goal with its FIRES lever.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Goal {
    /// Goal text.
    pub goal: String,
    /// The FIRES lever this goal pulls on.
    pub fires_lever: FiresElement,
}

/// A challenge with its FIRES lever.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Challenge {
    /// Challenge text.
    pub challenge: String,
    /// The FIRES lever this challenge presses on.
    pub fires_lever: FiresElement,
}

/// A coaching engagement — the merge target of the insight pipeline.
///
/// The generated-insight fields (`superpowers_*`, `zone_interpretation`,
/// `world_asking`, `weekly_actions`, `anchor_quote`, and the
/// `ai_insights_*` metadata) are written exclusively by the insight merger;
/// coaches edit the story fields outside this pipeline.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CoachingEngagement {
    /// Primary key.
    pub id: EngagementId,
    /// Owning client.
    pub client_email: ClientEmail,
    /// Lifecycle status.
    pub status: EngagementStatus,
    /// Current phase of the arc.
    pub current_phase: Phase,
    /// Current week (1–12).
    pub current_week: u8,
    /// Primary arena of focus (free text).
    pub primary_arena: Option<String>,
    /// Story: where they are now.
    pub story_present: Option<String>,
    /// Story: what brought them here.
    pub story_past: Option<String>,
    /// Story: where they're going.
    pub story_potential: Option<String>,
    /// Structured goal list.
    #[serde(default)]
    pub goals: Vec<Goal>,
    /// Structured challenge list.
    #[serde(default)]
    pub challenges: Vec<Challenge>,
    /// Active FIRES focus set.
    #[serde(default)]
    pub fires_focus: Vec<FiresElement>,
    /// Superpowers the client knows and owns.
    #[serde(default)]
    pub superpowers_claimed: Vec<Superpower>,
    /// Superpowers the client is building confidence in.
    #[serde(default)]
    pub superpowers_emerging: Vec<Superpower>,
    /// Superpowers present in the data but not yet claimed.
    #[serde(default)]
    pub superpowers_hidden: Vec<Superpower>,
    /// Current zone interpretation.
    pub zone_interpretation: Option<ZoneInterpretation>,
    /// What the world is asking of the client.
    #[serde(default)]
    pub world_asking: Vec<WorldInsight>,
    /// Assigned weekly actions.
    #[serde(default)]
    pub weekly_actions: Vec<WeeklyAction>,
    /// Anchor quote for the journey.
    pub anchor_quote: Option<String>,
    /// When insights were last generated.
    pub ai_insights_generated_at: Option<DateTime<Utc>>,
    /// Generation counter — +1 per successful generation, never decremented.
    pub ai_insights_version: i64,
    /// Row creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_upper_labels() {
        assert_eq!(Phase::Name.as_upper(), "NAME");
        assert_eq!(Phase::Validate.as_upper(), "VALIDATE");
        assert_eq!(Phase::Communicate.as_upper(), "COMMUNICATE");
    }

    #[test]
    fn client_display_name_falls_back_to_email() {
        let client = Client {
            email: ClientEmail::from("a@x.com"),
            name: None,
            status: ClientStatus::Approved,
            coach_email: None,
            created_at: Utc::now(),
        };
        assert_eq!(client.display_name(), "a@x.com");
    }

    #[test]
    fn goal_serde_uses_snake_case_fields() {
        let goal = Goal {
            goal: "Lead the platform team".into(),
            fires_lever: FiresElement::Influence,
        };
        let json = serde_json::to_value(&goal).unwrap();
        assert_eq!(json["goal"], "Lead the platform team");
        assert_eq!(json["fires_lever"], "influence");
    }

    #[test]
    fn engagement_status_serde() {
        assert_eq!(
            serde_json::to_string(&EngagementStatus::Active).unwrap(),
            "\"active\""
        );
        let back: Phase = serde_json::from_str("\"validate\"").unwrap();
        assert_eq!(back, Phase::Validate);
    }
}
