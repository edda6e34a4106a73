//! Engagement repository.
//!
//! The engagement row is the merge target of the insight pipeline, so its
//! JSON columns are decoded strictly: any column that fails to decode is a
//! hard [`StoreError::Decode`], never a silent default.
//!
//! [`EngagementRepo::apply_insights`] is the pipeline's single terminal
//! write. It is a conditional update on `ai_insights_version`: if the
//! version moved between read and write, the update affects zero rows and a
//! [`StoreError::VersionConflict`] is returned instead of silently
//! overwriting a concurrent generation.

use rusqlite::{Connection, OptionalExtension, params};

use fg_core::{
    Challenge, ClientEmail, CoachingEngagement, EngagementId, EngagementStatus, FiresElement,
    Goal, MergedInsights, Phase, Superpower, WeeklyAction, WorldInsight, ZoneInterpretation,
};

use crate::errors::{Result, StoreError};
use crate::repos::{decode_list, decode_opt, encode_json, parse_ts};

const TABLE: &str = "coaching_engagements";

const SELECT_COLUMNS: &str = "id, client_email, status, current_phase, current_week, \
     primary_arena, story_present, story_past, story_potential, goals, challenges, \
     fires_focus, superpowers_claimed, superpowers_emerging, superpowers_hidden, \
     zone_interpretation, world_asking, weekly_actions, anchor_quote, \
     ai_insights_generated_at, ai_insights_version, created_at, updated_at";

/// Raw engagement row before validate-on-read decoding.
struct RawEngagement {
    id: String,
    client_email: String,
    status: String,
    current_phase: String,
    current_week: i64,
    primary_arena: Option<String>,
    story_present: Option<String>,
    story_past: Option<String>,
    story_potential: Option<String>,
    goals: Option<String>,
    challenges: Option<String>,
    fires_focus: Option<String>,
    superpowers_claimed: Option<String>,
    superpowers_emerging: Option<String>,
    superpowers_hidden: Option<String>,
    zone_interpretation: Option<String>,
    world_asking: Option<String>,
    weekly_actions: Option<String>,
    anchor_quote: Option<String>,
    ai_insights_generated_at: Option<String>,
    ai_insights_version: i64,
    created_at: String,
    updated_at: String,
}

fn read_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEngagement> {
    Ok(RawEngagement {
        id: row.get(0)?,
        client_email: row.get(1)?,
        status: row.get(2)?,
        current_phase: row.get(3)?,
        current_week: row.get(4)?,
        primary_arena: row.get(5)?,
        story_present: row.get(6)?,
        story_past: row.get(7)?,
        story_potential: row.get(8)?,
        goals: row.get(9)?,
        challenges: row.get(10)?,
        fires_focus: row.get(11)?,
        superpowers_claimed: row.get(12)?,
        superpowers_emerging: row.get(13)?,
        superpowers_hidden: row.get(14)?,
        zone_interpretation: row.get(15)?,
        world_asking: row.get(16)?,
        weekly_actions: row.get(17)?,
        anchor_quote: row.get(18)?,
        ai_insights_generated_at: row.get(19)?,
        ai_insights_version: row.get(20)?,
        created_at: row.get(21)?,
        updated_at: row.get(22)?,
    })
}

fn decode_error(message: String) -> StoreError {
    StoreError::Decode {
        table: TABLE,
        message,
    }
}

fn status_from_str(raw: &str) -> Result<EngagementStatus> {
    match raw {
        "active" => Ok(EngagementStatus::Active),
        "completed" => Ok(EngagementStatus::Completed),
        other => Err(decode_error(format!("unknown status {other:?}"))),
    }
}

fn status_to_str(status: EngagementStatus) -> &'static str {
    match status {
        EngagementStatus::Active => "active",
        EngagementStatus::Completed => "completed",
    }
}

fn phase_from_str(raw: &str) -> Result<Phase> {
    match raw {
        "name" => Ok(Phase::Name),
        "validate" => Ok(Phase::Validate),
        "communicate" => Ok(Phase::Communicate),
        other => Err(decode_error(format!("unknown phase {other:?}"))),
    }
}

fn phase_to_str(phase: Phase) -> &'static str {
    match phase {
        Phase::Name => "name",
        Phase::Validate => "validate",
        Phase::Communicate => "communicate",
    }
}

fn decode(raw: RawEngagement) -> Result<CoachingEngagement> {
    let goals: Vec<Goal> = decode_list("goals", raw.goals.as_deref()).map_err(decode_error)?;
    let challenges: Vec<Challenge> =
        decode_list("challenges", raw.challenges.as_deref()).map_err(decode_error)?;
    let fires_focus: Vec<FiresElement> =
        decode_list("fires_focus", raw.fires_focus.as_deref()).map_err(decode_error)?;
    let superpowers_claimed: Vec<Superpower> =
        decode_list("superpowers_claimed", raw.superpowers_claimed.as_deref())
            .map_err(decode_error)?;
    let superpowers_emerging: Vec<Superpower> =
        decode_list("superpowers_emerging", raw.superpowers_emerging.as_deref())
            .map_err(decode_error)?;
    let superpowers_hidden: Vec<Superpower> =
        decode_list("superpowers_hidden", raw.superpowers_hidden.as_deref())
            .map_err(decode_error)?;
    let zone_interpretation: Option<ZoneInterpretation> =
        decode_opt("zone_interpretation", raw.zone_interpretation.as_deref())
            .map_err(decode_error)?;
    let world_asking: Vec<WorldInsight> =
        decode_list("world_asking", raw.world_asking.as_deref()).map_err(decode_error)?;
    let weekly_actions: Vec<WeeklyAction> =
        decode_list("weekly_actions", raw.weekly_actions.as_deref()).map_err(decode_error)?;

    let current_week = u8::try_from(raw.current_week)
        .map_err(|_| decode_error(format!("current_week out of range: {}", raw.current_week)))?;

    let ai_insights_generated_at = raw
        .ai_insights_generated_at
        .as_deref()
        .map(parse_ts)
        .transpose()
        .map_err(decode_error)?;

    Ok(CoachingEngagement {
        id: EngagementId::from(raw.id),
        client_email: ClientEmail::from(raw.client_email),
        status: status_from_str(&raw.status)?,
        current_phase: phase_from_str(&raw.current_phase)?,
        current_week,
        primary_arena: raw.primary_arena,
        story_present: raw.story_present,
        story_past: raw.story_past,
        story_potential: raw.story_potential,
        goals,
        challenges,
        fires_focus,
        superpowers_claimed,
        superpowers_emerging,
        superpowers_hidden,
        zone_interpretation,
        world_asking,
        weekly_actions,
        anchor_quote: raw.anchor_quote,
        ai_insights_generated_at,
        ai_insights_version: raw.ai_insights_version,
        created_at: parse_ts(&raw.created_at).map_err(decode_error)?,
        updated_at: parse_ts(&raw.updated_at).map_err(decode_error)?,
    })
}

/// Engagement repository — stateless, every method takes `&Connection`.
pub struct EngagementRepo;

impl EngagementRepo {
    /// Insert an engagement row.
    pub fn insert(conn: &Connection, engagement: &CoachingEngagement) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO coaching_engagements (
                id, client_email, status, current_phase, current_week, primary_arena,
                story_present, story_past, story_potential, goals, challenges, fires_focus,
                superpowers_claimed, superpowers_emerging, superpowers_hidden,
                zone_interpretation, world_asking, weekly_actions, anchor_quote,
                ai_insights_generated_at, ai_insights_version, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                     ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23)",
            params![
                engagement.id.as_str(),
                engagement.client_email.as_str(),
                status_to_str(engagement.status),
                phase_to_str(engagement.current_phase),
                i64::from(engagement.current_week),
                engagement.primary_arena,
                engagement.story_present,
                engagement.story_past,
                engagement.story_potential,
                encode_json(TABLE, &engagement.goals)?,
                encode_json(TABLE, &engagement.challenges)?,
                encode_json(TABLE, &engagement.fires_focus)?,
                encode_json(TABLE, &engagement.superpowers_claimed)?,
                encode_json(TABLE, &engagement.superpowers_emerging)?,
                encode_json(TABLE, &engagement.superpowers_hidden)?,
                engagement
                    .zone_interpretation
                    .as_ref()
                    .map(|z| encode_json(TABLE, z))
                    .transpose()?,
                encode_json(TABLE, &engagement.world_asking)?,
                encode_json(TABLE, &engagement.weekly_actions)?,
                engagement.anchor_quote,
                engagement.ai_insights_generated_at.map(|t| t.to_rfc3339()),
                engagement.ai_insights_version,
                engagement.created_at.to_rfc3339(),
                engagement.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Fetch an engagement by id.
    pub fn get(conn: &Connection, id: &EngagementId) -> Result<Option<CoachingEngagement>> {
        let raw = conn
            .query_row(
                &format!("SELECT {SELECT_COLUMNS} FROM coaching_engagements WHERE id = ?1"),
                [id.as_str()],
                read_raw,
            )
            .optional()?;
        raw.map(decode).transpose()
    }

    /// Fetch the client's active engagement (most recent if several).
    pub fn active_for_client(
        conn: &Connection,
        email: &ClientEmail,
    ) -> Result<Option<CoachingEngagement>> {
        let raw = conn
            .query_row(
                &format!(
                    "SELECT {SELECT_COLUMNS} FROM coaching_engagements \
                     WHERE client_email = ?1 AND status = 'active' \
                     ORDER BY created_at DESC LIMIT 1"
                ),
                [email.as_str()],
                read_raw,
            )
            .optional()?;
        raw.map(decode).transpose()
    }

    /// Apply a merged insight payload as one conditional update.
    ///
    /// `expected_version` is the `ai_insights_version` read at aggregation
    /// time. Zero affected rows on an existing engagement means a concurrent
    /// generation won the race → [`StoreError::VersionConflict`]; on a
    /// missing engagement → [`StoreError::NotFound`].
    pub fn apply_insights(
        conn: &Connection,
        id: &EngagementId,
        expected_version: i64,
        merged: &MergedInsights,
    ) -> Result<()> {
        let changed = conn.execute(
            "UPDATE coaching_engagements SET
                superpowers_claimed = ?1,
                superpowers_emerging = ?2,
                superpowers_hidden = ?3,
                zone_interpretation = ?4,
                world_asking = ?5,
                weekly_actions = ?6,
                anchor_quote = ?7,
                ai_insights_generated_at = ?8,
                ai_insights_version = ?9,
                updated_at = ?10
             WHERE id = ?11 AND ai_insights_version = ?12",
            params![
                encode_json(TABLE, &merged.superpowers_claimed)?,
                encode_json(TABLE, &merged.superpowers_emerging)?,
                encode_json(TABLE, &merged.superpowers_hidden)?,
                encode_json(TABLE, &merged.zone_interpretation)?,
                encode_json(TABLE, &merged.world_asking)?,
                encode_json(TABLE, &merged.weekly_actions)?,
                merged.anchor_quote,
                merged.ai_insights_generated_at.to_rfc3339(),
                merged.ai_insights_version,
                merged.ai_insights_generated_at.to_rfc3339(),
                id.as_str(),
                expected_version,
            ],
        )?;

        if changed == 1 {
            return Ok(());
        }

        let exists: bool = conn
            .query_row(
                "SELECT 1 FROM coaching_engagements WHERE id = ?1",
                [id.as_str()],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);

        if exists {
            Err(StoreError::VersionConflict {
                engagement_id: id.to_string(),
                expected: expected_version,
            })
        } else {
            Err(StoreError::NotFound {
                what: format!("engagement {id}"),
            })
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fg_core::{ActionStatus, Client, ClientStatus, InsightSource, Zone};
    use rusqlite::Connection;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        let _ = crate::migrations::run_migrations(&conn).unwrap();
        conn
    }

    fn seed_client(conn: &Connection, email: &str) {
        crate::repos::ClientRepo::insert(
            conn,
            &Client {
                email: ClientEmail::from(email),
                name: Some("Avery".into()),
                status: ClientStatus::Approved,
                coach_email: None,
                created_at: Utc::now(),
            },
        )
        .unwrap();
    }

    fn engagement(email: &str) -> CoachingEngagement {
        let now = Utc::now();
        CoachingEngagement {
            id: EngagementId::new(),
            client_email: ClientEmail::from(email),
            status: EngagementStatus::Active,
            current_phase: Phase::Validate,
            current_week: 5,
            primary_arena: Some("Engineering leadership".into()),
            story_present: Some("Leading a team of eight".into()),
            story_past: None,
            story_potential: None,
            goals: vec![Goal {
                goal: "Delegate the roadmap".into(),
                fires_lever: FiresElement::Influence,
            }],
            challenges: vec![],
            fires_focus: vec![FiresElement::Influence, FiresElement::Strengths],
            superpowers_claimed: vec![],
            superpowers_emerging: vec![],
            superpowers_hidden: vec![],
            zone_interpretation: None,
            world_asking: vec![],
            weekly_actions: vec![],
            anchor_quote: None,
            ai_insights_generated_at: None,
            ai_insights_version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn merged(version: i64) -> MergedInsights {
        let now = Utc::now();
        MergedInsights {
            superpowers_claimed: vec![Superpower {
                superpower: "Steadiness".into(),
                description: "d".into(),
                evidence: vec!["e".into()],
                fires_element: FiresElement::Resilience,
                source: Some(InsightSource::Ai),
                created_at: Some(now),
            }],
            superpowers_emerging: vec![],
            superpowers_hidden: vec![],
            zone_interpretation: ZoneInterpretation {
                zone: Zone::Discovering,
                headline: "Bring forward past wins".into(),
                description: "d".into(),
                the_work: "w".into(),
                custom_note: "n".into(),
                source: Some(InsightSource::Ai),
                updated_at: Some(now),
            },
            world_asking: vec![],
            weekly_actions: vec![WeeklyAction {
                action: "Ask for feedback".into(),
                fires_element: FiresElement::Feelings,
                assigned_date: now.date_naive(),
                status: ActionStatus::Active,
            }],
            anchor_quote: Some("Own it.".into()),
            ai_insights_generated_at: now,
            ai_insights_version: version,
        }
    }

    #[test]
    fn insert_and_get_roundtrip() {
        let conn = test_conn();
        seed_client(&conn, "a@x.com");
        let eng = engagement("a@x.com");
        EngagementRepo::insert(&conn, &eng).unwrap();

        let loaded = EngagementRepo::get(&conn, &eng.id).unwrap().unwrap();
        assert_eq!(loaded.current_week, 5);
        assert_eq!(loaded.current_phase, Phase::Validate);
        assert_eq!(loaded.goals.len(), 1);
        assert_eq!(loaded.fires_focus.len(), 2);
        assert_eq!(loaded.ai_insights_version, 0);
    }

    #[test]
    fn active_for_client_picks_active_row() {
        let conn = test_conn();
        seed_client(&conn, "a@x.com");
        let mut done = engagement("a@x.com");
        done.status = EngagementStatus::Completed;
        EngagementRepo::insert(&conn, &done).unwrap();
        let active = engagement("a@x.com");
        EngagementRepo::insert(&conn, &active).unwrap();

        let found = EngagementRepo::active_for_client(&conn, &ClientEmail::from("a@x.com"))
            .unwrap()
            .unwrap();
        assert_eq!(found.id, active.id);
    }

    #[test]
    fn active_for_client_none_when_all_completed() {
        let conn = test_conn();
        seed_client(&conn, "a@x.com");
        let mut done = engagement("a@x.com");
        done.status = EngagementStatus::Completed;
        EngagementRepo::insert(&conn, &done).unwrap();

        assert!(
            EngagementRepo::active_for_client(&conn, &ClientEmail::from("a@x.com"))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn apply_insights_bumps_version() {
        let conn = test_conn();
        seed_client(&conn, "a@x.com");
        let eng = engagement("a@x.com");
        EngagementRepo::insert(&conn, &eng).unwrap();

        EngagementRepo::apply_insights(&conn, &eng.id, 0, &merged(1)).unwrap();

        let loaded = EngagementRepo::get(&conn, &eng.id).unwrap().unwrap();
        assert_eq!(loaded.ai_insights_version, 1);
        assert_eq!(loaded.superpowers_claimed.len(), 1);
        assert_eq!(loaded.anchor_quote.as_deref(), Some("Own it."));
        assert!(loaded.ai_insights_generated_at.is_some());
    }

    #[test]
    fn apply_insights_stale_version_conflicts() {
        let conn = test_conn();
        seed_client(&conn, "a@x.com");
        let eng = engagement("a@x.com");
        EngagementRepo::insert(&conn, &eng).unwrap();

        EngagementRepo::apply_insights(&conn, &eng.id, 0, &merged(1)).unwrap();
        let err = EngagementRepo::apply_insights(&conn, &eng.id, 0, &merged(1)).unwrap_err();
        assert!(matches!(err, StoreError::VersionConflict { expected: 0, .. }));

        // The winning write is untouched.
        let loaded = EngagementRepo::get(&conn, &eng.id).unwrap().unwrap();
        assert_eq!(loaded.ai_insights_version, 1);
    }

    #[test]
    fn apply_insights_missing_engagement_is_not_found() {
        let conn = test_conn();
        let err =
            EngagementRepo::apply_insights(&conn, &EngagementId::from("ghost"), 0, &merged(1))
                .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn corrupt_goals_column_is_a_decode_error() {
        let conn = test_conn();
        seed_client(&conn, "a@x.com");
        let eng = engagement("a@x.com");
        EngagementRepo::insert(&conn, &eng).unwrap();
        let _ = conn
            .execute(
                "UPDATE coaching_engagements SET goals = '{not json' WHERE id = ?1",
                [eng.id.as_str()],
            )
            .unwrap();

        let err = EngagementRepo::get(&conn, &eng.id).unwrap_err();
        assert!(matches!(err, StoreError::Decode { table: "coaching_engagements", .. }));
    }
}
