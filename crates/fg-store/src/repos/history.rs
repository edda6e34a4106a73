//! Narrative-map history repository.
//!
//! Append-only audit trail. The pipeline writes exactly one row per
//! successful generation, after the engagement update commits.

use rusqlite::{Connection, params};
use serde_json::Value;
use tracing::warn;

use fg_core::{EngagementId, HistoryId, NarrativeMapHistory};

use crate::errors::Result;
use crate::repos::{encode_json, parse_ts};

/// History repository — stateless, every method takes `&Connection`.
pub struct HistoryRepo;

impl HistoryRepo {
    /// Append an audit entry.
    pub fn append(conn: &Connection, entry: &NarrativeMapHistory) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO narrative_map_history (id, engagement_id, field_name, old_value, new_value, changed_by, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                entry.id.as_str(),
                entry.engagement_id.as_str(),
                entry.field_name,
                entry
                    .old_value
                    .as_ref()
                    .map(|v| encode_json("narrative_map_history", v))
                    .transpose()?,
                encode_json("narrative_map_history", &entry.new_value)?,
                entry.changed_by,
                entry.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// All entries for an engagement, newest first.
    pub fn for_engagement(
        conn: &Connection,
        engagement_id: &EngagementId,
    ) -> Result<Vec<NarrativeMapHistory>> {
        let mut stmt = conn.prepare(
            "SELECT id, engagement_id, field_name, old_value, new_value, changed_by, created_at
             FROM narrative_map_history WHERE engagement_id = ?1
             ORDER BY created_at DESC",
        )?;

        let raws = stmt
            .query_map([engagement_id.as_str()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut out = Vec::with_capacity(raws.len());
        for (id, engagement_id, field_name, old_value, new_value, changed_by, created_at) in raws {
            let decoded = (|| {
                let old_value: Option<Value> = old_value
                    .as_deref()
                    .map(serde_json::from_str)
                    .transpose()
                    .map_err(|e| format!("old_value: {e}"))?;
                let new_value: Value =
                    serde_json::from_str(&new_value).map_err(|e| format!("new_value: {e}"))?;
                Ok::<_, String>(NarrativeMapHistory {
                    id: HistoryId::from(id.clone()),
                    engagement_id: EngagementId::from(engagement_id),
                    field_name,
                    old_value,
                    new_value,
                    changed_by,
                    created_at: parse_ts(&created_at)?,
                })
            })();
            match decoded {
                Ok(entry) => out.push(entry),
                Err(error) => warn!(table = "narrative_map_history", id, %error, "quarantined row"),
            }
        }
        Ok(out)
    }

    /// Number of entries for an engagement.
    pub fn count_for_engagement(conn: &Connection, engagement_id: &EngagementId) -> Result<i64> {
        let count = conn.query_row(
            "SELECT COUNT(*) FROM narrative_map_history WHERE engagement_id = ?1",
            [engagement_id.as_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
