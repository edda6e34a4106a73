//! Insight merger.
//!
//! Pure function: reconciles the generator's output against the stored
//! engagement and the zone reference rows. The caller supplies `now` so the
//! merge is deterministic and testable.
//!
//! Zone resolution order: most recent snapshot's zone, else the
//! engagement's previously stored zone, else `exploring`. The generator's
//! own zone claim is deliberately ignored — only its `custom_note` survives.

use chrono::{DateTime, Utc};

use fg_context::ClientContext;
use fg_core::{
    GeneratedInsights, GeneratedSuperpower, GeneratedWorldInsight, InsightSource, MergedInsights,
    Superpower, WeeklyAction, WorldInsight, Zone, ZoneInterpretation,
    insights::ActionStatus,
};

fn stamp_superpowers(
    items: &[GeneratedSuperpower],
    now: DateTime<Utc>,
) -> Vec<Superpower> {
    items
        .iter()
        .map(|item| Superpower {
            superpower: item.superpower.clone(),
            description: item.description.clone(),
            evidence: item.evidence.clone(),
            fires_element: item.fires_element,
            source: Some(InsightSource::Ai),
            created_at: Some(now),
        })
        .collect()
}

fn stamp_world(items: &[GeneratedWorldInsight], now: DateTime<Utc>) -> Vec<WorldInsight> {
    items
        .iter()
        .map(|item| WorldInsight {
            insight: item.insight.clone(),
            fires_element: item.fires_element,
            source: Some(InsightSource::Ai),
            created_at: Some(now),
        })
        .collect()
}

/// The zone the merged interpretation should use.
fn effective_zone(ctx: &ClientContext) -> Zone {
    ctx.snapshots
        .first()
        .and_then(|s| s.overall_zone)
        .or_else(|| ctx.engagement.zone_interpretation.as_ref().map(|z| z.zone))
        .unwrap_or(Zone::Exploring)
}

/// Merge generated insights with stored state and zone reference content.
#[must_use]
pub fn merge_insights(
    generated: &GeneratedInsights,
    ctx: &ClientContext,
    now: DateTime<Utc>,
) -> MergedInsights {
    let zone = effective_zone(ctx);

    // A missing reference row yields empty static content, not an error.
    let zone_default = ctx.zone_defaults.iter().find(|z| z.zone_name == zone);
    let zone_interpretation = ZoneInterpretation {
        zone,
        headline: zone_default.map_or_else(String::new, |z| z.headline.clone()),
        description: zone_default.map_or_else(String::new, |z| z.description.clone()),
        the_work: zone_default.map_or_else(String::new, |z| z.the_work.clone()),
        custom_note: generated.zone_interpretation.custom_note.clone(),
        source: Some(InsightSource::Ai),
        updated_at: Some(now),
    };

    let weekly_actions = generated
        .suggested_weekly_actions
        .iter()
        .map(|suggested| WeeklyAction {
            action: suggested.action.clone(),
            fires_element: suggested.fires_element,
            assigned_date: now.date_naive(),
            status: ActionStatus::Active,
        })
        .collect();

    MergedInsights {
        superpowers_claimed: stamp_superpowers(&generated.superpowers_claimed, now),
        superpowers_emerging: stamp_superpowers(&generated.superpowers_emerging, now),
        superpowers_hidden: stamp_superpowers(&generated.superpowers_hidden, now),
        zone_interpretation,
        world_asking: stamp_world(&generated.world_asking, now),
        weekly_actions,
        anchor_quote: generated.suggested_anchor_quote.clone(),
        ai_insights_generated_at: now,
        ai_insights_version: ctx.engagement.ai_insights_version + 1,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::tests_support::{empty_context, valid_payload_json};
    use fg_core::{Snapshot, SnapshotId, ZoneDefault, ClientEmail};

    fn generated() -> GeneratedInsights {
        serde_json::from_value(valid_payload_json()).unwrap()
    }

    fn snapshot(zone: Zone) -> Snapshot {
        Snapshot {
            id: SnapshotId::new(),
            client_email: ClientEmail::from("a@x.com"),
            goal: None,
            overall_zone: Some(zone),
            confidence_score: None,
            alignment_score: None,
            growth_opportunity_category: None,
            growth_opportunity_zone: None,
            owning_highlight_category: None,
            owning_highlight_zone: None,
            zone_breakdown: None,
            fs_answers: None,
            ps_answers: None,
            past_support: None,
            future_support: None,
            narrative: None,
            created_at: Utc::now(),
        }
    }

    fn zone_defaults() -> Vec<ZoneDefault> {
        vec![ZoneDefault {
            zone_name: Zone::Performing,
            headline: "Reconnect to identity".into(),
            description: "desc".into(),
            the_work: "work".into(),
        }]
    }

    #[test]
    fn version_is_prior_plus_one() {
        let mut ctx = empty_context("a@x.com");
        ctx.engagement.ai_insights_version = 6;
        let merged = merge_insights(&generated(), &ctx, Utc::now());
        assert_eq!(merged.ai_insights_version, 7);
    }

    #[test]
    fn snapshot_zone_wins() {
        let mut ctx = empty_context("a@x.com");
        ctx.snapshots = vec![snapshot(Zone::Performing)];
        ctx.engagement.zone_interpretation = Some(ZoneInterpretation {
            zone: Zone::Owning,
            headline: String::new(),
            description: String::new(),
            the_work: String::new(),
            custom_note: String::new(),
            source: None,
            updated_at: None,
        });
        ctx.zone_defaults = zone_defaults();

        let merged = merge_insights(&generated(), &ctx, Utc::now());
        assert_eq!(merged.zone_interpretation.zone, Zone::Performing);
        assert_eq!(merged.zone_interpretation.headline, "Reconnect to identity");
    }

    #[test]
    fn stored_zone_is_the_fallback() {
        let mut ctx = empty_context("a@x.com");
        ctx.engagement.zone_interpretation = Some(ZoneInterpretation {
            zone: Zone::Owning,
            headline: String::new(),
            description: String::new(),
            the_work: String::new(),
            custom_note: String::new(),
            source: None,
            updated_at: None,
        });
        let merged = merge_insights(&generated(), &ctx, Utc::now());
        assert_eq!(merged.zone_interpretation.zone, Zone::Owning);
    }

    #[test]
    fn default_zone_is_exploring() {
        let ctx = empty_context("a@x.com");
        let merged = merge_insights(&generated(), &ctx, Utc::now());
        assert_eq!(merged.zone_interpretation.zone, Zone::Exploring);
    }

    #[test]
    fn generator_zone_claim_is_ignored() {
        // The payload claims "discovering" but stored data says otherwise.
        let mut ctx = empty_context("a@x.com");
        ctx.snapshots = vec![snapshot(Zone::Performing)];
        let merged = merge_insights(&generated(), &ctx, Utc::now());
        assert_eq!(merged.zone_interpretation.zone, Zone::Performing);
    }

    #[test]
    fn missing_zone_default_yields_empty_content() {
        let mut ctx = empty_context("a@x.com");
        ctx.zone_defaults = Vec::new();
        let merged = merge_insights(&generated(), &ctx, Utc::now());
        assert_eq!(merged.zone_interpretation.headline, "");
        assert_eq!(merged.zone_interpretation.description, "");
        assert_eq!(merged.zone_interpretation.the_work, "");
        // The generated note still survives.
        assert!(!merged.zone_interpretation.custom_note.is_empty());
    }

    #[test]
    fn superpowers_and_world_are_stamped() {
        let now = Utc::now();
        let merged = merge_insights(&generated(), &empty_context("a@x.com"), now);
        for sp in merged
            .superpowers_claimed
            .iter()
            .chain(&merged.superpowers_emerging)
            .chain(&merged.superpowers_hidden)
        {
            assert_eq!(sp.source, Some(InsightSource::Ai));
            assert_eq!(sp.created_at, Some(now));
        }
        for w in &merged.world_asking {
            assert_eq!(w.source, Some(InsightSource::Ai));
            assert_eq!(w.created_at, Some(now));
        }
    }

    #[test]
    fn weekly_actions_assigned_today_and_active() {
        let now = Utc::now();
        let merged = merge_insights(&generated(), &empty_context("a@x.com"), now);
        assert_eq!(merged.weekly_actions.len(), 2);
        for action in &merged.weekly_actions {
            assert_eq!(action.assigned_date, now.date_naive());
            assert_eq!(action.status, ActionStatus::Active);
        }
    }
}
