//! Snapshot repository.
//!
//! Snapshots are evidence rows: a row that fails validate-on-read decoding
//! is quarantined (skipped with a warning) rather than failing the read.
//! Zone labels that don't parse are quarantined at field level to `None`.

use std::collections::BTreeMap;

use rusqlite::{Connection, params};
use tracing::warn;

use fg_core::{ClientEmail, Snapshot, SnapshotId, SnapshotNarrative, Zone};

use crate::errors::Result;
use crate::repos::{decode_opt, encode_json, parse_ts};

const TABLE: &str = "snapshots";

struct RawSnapshot {
    id: String,
    client_email: String,
    goal: Option<String>,
    overall_zone: Option<String>,
    confidence_score: Option<f64>,
    alignment_score: Option<f64>,
    growth_opportunity_category: Option<String>,
    growth_opportunity_zone: Option<String>,
    owning_highlight_category: Option<String>,
    owning_highlight_zone: Option<String>,
    zone_breakdown: Option<String>,
    fs_answers: Option<String>,
    ps_answers: Option<String>,
    past_support: Option<String>,
    future_support: Option<String>,
    narrative: Option<String>,
    created_at: String,
}

fn decode(raw: RawSnapshot) -> std::result::Result<Snapshot, String> {
    let zone_breakdown: Option<BTreeMap<String, String>> =
        decode_opt("zone_breakdown", raw.zone_breakdown.as_deref())?;
    let fs_answers: Option<BTreeMap<String, String>> =
        decode_opt("fs_answers", raw.fs_answers.as_deref())?;
    let ps_answers: Option<BTreeMap<String, String>> =
        decode_opt("ps_answers", raw.ps_answers.as_deref())?;
    let narrative: Option<SnapshotNarrative> =
        decode_opt("narrative", raw.narrative.as_deref())?;

    Ok(Snapshot {
        id: SnapshotId::from(raw.id),
        client_email: ClientEmail::from(raw.client_email),
        goal: raw.goal,
        overall_zone: raw.overall_zone.as_deref().and_then(Zone::parse_lossy),
        confidence_score: raw.confidence_score,
        alignment_score: raw.alignment_score,
        growth_opportunity_category: raw.growth_opportunity_category,
        growth_opportunity_zone: raw
            .growth_opportunity_zone
            .as_deref()
            .and_then(Zone::parse_lossy),
        owning_highlight_category: raw.owning_highlight_category,
        owning_highlight_zone: raw
            .owning_highlight_zone
            .as_deref()
            .and_then(Zone::parse_lossy),
        zone_breakdown,
        fs_answers,
        ps_answers,
        past_support: raw.past_support,
        future_support: raw.future_support,
        narrative,
        created_at: parse_ts(&raw.created_at)?,
    })
}

/// Snapshot repository — stateless, every method takes `&Connection`.
pub struct SnapshotRepo;

impl SnapshotRepo {
    /// Insert a snapshot row.
    pub fn insert(conn: &Connection, snapshot: &Snapshot) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO snapshots (
                id, client_email, goal, overall_zone, confidence_score, alignment_score,
                growth_opportunity_category, growth_opportunity_zone,
                owning_highlight_category, owning_highlight_zone, zone_breakdown,
                fs_answers, ps_answers, past_support, future_support, narrative, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            params![
                snapshot.id.as_str(),
                snapshot.client_email.as_str(),
                snapshot.goal,
                snapshot.overall_zone.map(Zone::as_str),
                snapshot.confidence_score,
                snapshot.alignment_score,
                snapshot.growth_opportunity_category,
                snapshot.growth_opportunity_zone.map(Zone::as_str),
                snapshot.owning_highlight_category,
                snapshot.owning_highlight_zone.map(Zone::as_str),
                snapshot
                    .zone_breakdown
                    .as_ref()
                    .map(|v| encode_json(TABLE, v))
                    .transpose()?,
                snapshot
                    .fs_answers
                    .as_ref()
                    .map(|v| encode_json(TABLE, v))
                    .transpose()?,
                snapshot
                    .ps_answers
                    .as_ref()
                    .map(|v| encode_json(TABLE, v))
                    .transpose()?,
                snapshot.past_support,
                snapshot.future_support,
                snapshot
                    .narrative
                    .as_ref()
                    .map(|v| encode_json(TABLE, v))
                    .transpose()?,
                snapshot.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// The client's most recent snapshots, newest first.
    pub fn recent_for_client(
        conn: &Connection,
        email: &ClientEmail,
        limit: usize,
    ) -> Result<Vec<Snapshot>> {
        let mut stmt = conn.prepare(
            "SELECT id, client_email, goal, overall_zone, confidence_score, alignment_score,
                    growth_opportunity_category, growth_opportunity_zone,
                    owning_highlight_category, owning_highlight_zone, zone_breakdown,
                    fs_answers, ps_answers, past_support, future_support, narrative, created_at
             FROM snapshots WHERE client_email = ?1
             ORDER BY created_at DESC LIMIT ?2",
        )?;

        #[allow(clippy::cast_possible_wrap)]
        let raws = stmt
            .query_map(params![email.as_str(), limit as i64], |row| {
                Ok(RawSnapshot {
                    id: row.get(0)?,
                    client_email: row.get(1)?,
                    goal: row.get(2)?,
                    overall_zone: row.get(3)?,
                    confidence_score: row.get(4)?,
                    alignment_score: row.get(5)?,
                    growth_opportunity_category: row.get(6)?,
                    growth_opportunity_zone: row.get(7)?,
                    owning_highlight_category: row.get(8)?,
                    owning_highlight_zone: row.get(9)?,
                    zone_breakdown: row.get(10)?,
                    fs_answers: row.get(11)?,
                    ps_answers: row.get(12)?,
                    past_support: row.get(13)?,
                    future_support: row.get(14)?,
                    narrative: row.get(15)?,
                    created_at: row.get(16)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut out = Vec::with_capacity(raws.len());
        for raw in raws {
            let id = raw.id.clone();
            match decode(raw) {
                Ok(snapshot) => out.push(snapshot),
                Err(error) => warn!(table = TABLE, id, %error, "quarantined row"),
            }
        }
        Ok(out)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
