//! More/less marker repository, including per-marker progress updates.

use std::fmt::Write as _;

use rusqlite::{Connection, params};
use tracing::warn;

use fg_core::{ClientEmail, FiresElement, MarkerId, MarkerKind, MarkerUpdate, MoreLessMarker, UpdateId};

use crate::errors::Result;
use crate::repos::{parse_date, parse_ts};

struct RawMarker {
    id: String,
    client_email: String,
    marker_type: String,
    marker_text: String,
    baseline_score: i64,
    current_score: i64,
    target_score: i64,
    fires_connection: Option<String>,
    exchange_insight: Option<String>,
    is_active: bool,
    created_at: String,
}

fn decode_marker(raw: RawMarker) -> std::result::Result<MoreLessMarker, String> {
    let marker_type = match raw.marker_type.as_str() {
        "more" => MarkerKind::More,
        "less" => MarkerKind::Less,
        other => return Err(format!("unknown marker_type {other:?}")),
    };
    // Unknown FIRES labels are quarantined at field level.
    let fires_connection = raw
        .fires_connection
        .as_deref()
        .and_then(|s| s.parse::<FiresElement>().ok());

    Ok(MoreLessMarker {
        id: MarkerId::from(raw.id),
        client_email: ClientEmail::from(raw.client_email),
        marker_type,
        marker_text: raw.marker_text,
        baseline_score: raw.baseline_score,
        current_score: raw.current_score,
        target_score: raw.target_score,
        fires_connection,
        exchange_insight: raw.exchange_insight,
        is_active: raw.is_active,
        created_at: parse_ts(&raw.created_at)?,
    })
}

/// Marker repository — stateless, every method takes `&Connection`.
pub struct MarkerRepo;

impl MarkerRepo {
    /// Insert a marker row.
    pub fn insert(conn: &Connection, marker: &MoreLessMarker) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO more_less_markers (
                id, client_email, marker_type, marker_text, baseline_score, current_score,
                target_score, fires_connection, exchange_insight, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                marker.id.as_str(),
                marker.client_email.as_str(),
                match marker.marker_type {
                    MarkerKind::More => "more",
                    MarkerKind::Less => "less",
                },
                marker.marker_text,
                marker.baseline_score,
                marker.current_score,
                marker.target_score,
                marker.fires_connection.map(FiresElement::as_str),
                marker.exchange_insight,
                marker.is_active,
                marker.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Update the coach-editable fields of a marker.
    pub fn update_progress(
        conn: &Connection,
        id: &MarkerId,
        current_score: i64,
        exchange_insight: Option<&str>,
    ) -> Result<()> {
        let _ = conn.execute(
            "UPDATE more_less_markers SET current_score = ?1, exchange_insight = ?2 WHERE id = ?3",
            params![current_score, exchange_insight, id.as_str()],
        )?;
        Ok(())
    }

    /// All active markers for a client.
    pub fn active_for_client(
        conn: &Connection,
        email: &ClientEmail,
    ) -> Result<Vec<MoreLessMarker>> {
        let mut stmt = conn.prepare(
            "SELECT id, client_email, marker_type, marker_text, baseline_score, current_score,
                    target_score, fires_connection, exchange_insight, is_active, created_at
             FROM more_less_markers WHERE client_email = ?1 AND is_active = 1
             ORDER BY created_at ASC",
        )?;

        let raws = stmt
            .query_map([email.as_str()], |row| {
                Ok(RawMarker {
                    id: row.get(0)?,
                    client_email: row.get(1)?,
                    marker_type: row.get(2)?,
                    marker_text: row.get(3)?,
                    baseline_score: row.get(4)?,
                    current_score: row.get(5)?,
                    target_score: row.get(6)?,
                    fires_connection: row.get(7)?,
                    exchange_insight: row.get(8)?,
                    is_active: row.get(9)?,
                    created_at: row.get(10)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut out = Vec::with_capacity(raws.len());
        for raw in raws {
            let id = raw.id.clone();
            match decode_marker(raw) {
                Ok(marker) => out.push(marker),
                Err(error) => warn!(table = "more_less_markers", id, %error, "quarantined row"),
            }
        }
        Ok(out)
    }

    /// Insert a progress update row.
    pub fn insert_update(conn: &Connection, update: &MarkerUpdate) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO more_less_updates (id, marker_id, update_date, score, note, exchange_note, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                update.id.as_str(),
                update.marker_id.as_str(),
                update.update_date.format("%Y-%m-%d").to_string(),
                update.score,
                update.note,
                update.exchange_note,
                update.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// The most recent progress updates across the given markers,
    /// newest first.
    pub fn recent_updates(
        conn: &Connection,
        marker_ids: &[MarkerId],
        limit: usize,
    ) -> Result<Vec<MarkerUpdate>> {
        if marker_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut sql = String::from(
            "SELECT id, marker_id, update_date, score, note, exchange_note, created_at
             FROM more_less_updates WHERE marker_id IN (",
        );
        for (i, _) in marker_ids.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            let _ = write!(sql, "?{}", i + 1);
        }
        #[allow(clippy::cast_possible_wrap)]
        let _ = write!(
            sql,
            ") ORDER BY created_at DESC LIMIT {}",
            limit as i64
        );

        let mut stmt = conn.prepare(&sql)?;
        let param_strs: Vec<&str> = marker_ids.iter().map(MarkerId::as_str).collect();
        let param_refs: Vec<&dyn rusqlite::types::ToSql> = param_strs
            .iter()
            .map(|s| s as &dyn rusqlite::types::ToSql)
            .collect();

        let raws = stmt
            .query_map(param_refs.as_slice(), |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, Option<String>>(5)?,
                    row.get::<_, String>(6)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut out = Vec::with_capacity(raws.len());
        for (id, marker_id, update_date, score, note, exchange_note, created_at) in raws {
            let decoded = parse_date(&update_date).and_then(|date| {
                Ok(MarkerUpdate {
                    id: UpdateId::from(id.clone()),
                    marker_id: MarkerId::from(marker_id),
                    update_date: date,
                    score,
                    note,
                    exchange_note,
                    created_at: parse_ts(&created_at)?,
                })
            });
            match decoded {
                Ok(update) => out.push(update),
                Err(error) => warn!(table = "more_less_updates", id, %error, "quarantined row"),
            }
        }
        Ok(out)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, Utc};
    use rusqlite::Connection;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        let _ = crate::migrations::run_migrations(&conn).unwrap();
        conn
    }

    fn marker(email: &str, kind: MarkerKind, active: bool) -> MoreLessMarker {
        MoreLessMarker {
            id: MarkerId::new(),
            client_email: ClientEmail::from(email),
            marker_type: kind,
            marker_text: "delegate weekly planning".into(),
            baseline_score: 3,
            current_score: 5,
            target_score: 9,
            fires_connection: Some(FiresElement::Influence),
            exchange_insight: None,
            is_active: active,
            created_at: Utc::now(),
        }
    }

    fn update(marker_id: &MarkerId, score: i64, age_days: i64) -> MarkerUpdate {
        MarkerUpdate {
            id: UpdateId::new(),
            marker_id: marker_id.clone(),
            update_date: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
            score,
            note: Some("kept the standup short".into()),
            exchange_note: None,
            created_at: Utc::now() - Duration::days(age_days),
        }
    }

    #[test]
    fn active_filter_excludes_inactive() {
        let conn = test_conn();
        MarkerRepo::insert(&conn, &marker("a@x.com", MarkerKind::More, true)).unwrap();
        MarkerRepo::insert(&conn, &marker("a@x.com", MarkerKind::Less, false)).unwrap();

        let active = MarkerRepo::active_for_client(&conn, &ClientEmail::from("a@x.com")).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].marker_type, MarkerKind::More);
    }

    #[test]
    fn update_progress_changes_only_editable_fields() {
        let conn = test_conn();
        let m = marker("a@x.com", MarkerKind::More, true);
        MarkerRepo::insert(&conn, &m).unwrap();
        MarkerRepo::update_progress(&conn, &m.id, 7, Some("traded control for trust")).unwrap();

        let loaded = MarkerRepo::active_for_client(&conn, &ClientEmail::from("a@x.com")).unwrap();
        assert_eq!(loaded[0].current_score, 7);
        assert_eq!(
            loaded[0].exchange_insight.as_deref(),
            Some("traded control for trust")
        );
        assert_eq!(loaded[0].baseline_score, 3);
    }

    #[test]
    fn recent_updates_scoped_to_markers_and_limited() {
        let conn = test_conn();
        let mine = marker("a@x.com", MarkerKind::More, true);
        let other = marker("b@x.com", MarkerKind::More, true);
        MarkerRepo::insert(&conn, &mine).unwrap();
        MarkerRepo::insert(&conn, &other).unwrap();

        for (score, age) in [(4, 3), (5, 2), (6, 1)] {
            MarkerRepo::insert_update(&conn, &update(&mine.id, score, age)).unwrap();
        }
        MarkerRepo::insert_update(&conn, &update(&other.id, 9, 0)).unwrap();

        let updates = MarkerRepo::recent_updates(&conn, &[mine.id.clone()], 2).unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].score, 6, "newest first");
        assert!(updates.iter().all(|u| u.marker_id == mine.id));
    }

    #[test]
    fn recent_updates_empty_marker_list_is_empty() {
        let conn = test_conn();
        assert!(MarkerRepo::recent_updates(&conn, &[], 20).unwrap().is_empty());
    }

    #[test]
    fn unknown_fires_connection_quarantined_to_none() {
        let conn = test_conn();
        let m = marker("a@x.com", MarkerKind::More, true);
        MarkerRepo::insert(&conn, &m).unwrap();
        let _ = conn
            .execute(
                "UPDATE more_less_markers SET fires_connection = 'focus' WHERE id = ?1",
                [m.id.as_str()],
            )
            .unwrap();

        let loaded = MarkerRepo::active_for_client(&conn, &ClientEmail::from("a@x.com")).unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded[0].fires_connection.is_none());
    }
}
