//! Zone defaults repository.
//!
//! Static reference content, seeded by migration and read-only to the
//! pipeline. A missing row is not an error — the merger falls back to empty
//! content.

use rusqlite::{Connection, OptionalExtension, params};
use tracing::warn;

use fg_core::{Zone, ZoneDefault};

use crate::errors::Result;

fn decode(
    zone_name: &str,
    headline: String,
    description: String,
    the_work: String,
) -> Option<ZoneDefault> {
    let zone = Zone::parse_lossy(zone_name)?;
    Some(ZoneDefault {
        zone_name: zone,
        headline,
        description,
        the_work,
    })
}

/// Zone defaults repository — stateless, every method takes `&Connection`.
pub struct ZoneDefaultRepo;

impl ZoneDefaultRepo {
    /// All zone default rows (rows with unknown zone names are quarantined).
    pub fn all(conn: &Connection) -> Result<Vec<ZoneDefault>> {
        let mut stmt =
            conn.prepare("SELECT zone_name, headline, description, the_work FROM zone_defaults")?;
        let raws = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut out = Vec::with_capacity(raws.len());
        for (zone_name, headline, description, the_work) in raws {
            match decode(&zone_name, headline, description, the_work) {
                Some(row) => out.push(row),
                None => warn!(table = "zone_defaults", zone_name, "quarantined row"),
            }
        }
        Ok(out)
    }

    /// Look up the defaults for one zone.
    pub fn get(conn: &Connection, zone: Zone) -> Result<Option<ZoneDefault>> {
        let raw = conn
            .query_row(
                "SELECT zone_name, headline, description, the_work FROM zone_defaults WHERE zone_name = ?1",
                [zone.as_str()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;
        Ok(raw.and_then(|(zone_name, headline, description, the_work)| {
            decode(&zone_name, headline, description, the_work)
        }))
    }

    /// Replace the content for one zone (coach-managed reference data).
    pub fn upsert(conn: &Connection, row: &ZoneDefault) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO zone_defaults (zone_name, headline, description, the_work)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(zone_name) DO UPDATE SET
                headline = excluded.headline,
                description = excluded.description,
                the_work = excluded.the_work",
            params![
                row.zone_name.as_str(),
                row.headline,
                row.description,
                row.the_work,
            ],
        )?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        let _ = crate::migrations::run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn seed_provides_all_four_zones() {
        let conn = test_conn();
        let all = ZoneDefaultRepo::all(&conn).unwrap();
        assert_eq!(all.len(), 4);
        for zone in [Zone::Exploring, Zone::Discovering, Zone::Performing, Zone::Owning] {
            assert!(all.iter().any(|z| z.zone_name == zone), "missing {zone}");
        }
    }

    #[test]
    fn get_returns_seeded_content() {
        let conn = test_conn();
        let row = ZoneDefaultRepo::get(&conn, Zone::Discovering).unwrap().unwrap();
        assert_eq!(row.headline, "Bring forward past wins");
        assert!(!row.the_work.is_empty());
    }

    #[test]
    fn upsert_replaces_content() {
        let conn = test_conn();
        ZoneDefaultRepo::upsert(
            &conn,
            &ZoneDefault {
                zone_name: Zone::Owning,
                headline: "New headline".into(),
                description: "New description".into(),
                the_work: "New work".into(),
            },
        )
        .unwrap();
        let row = ZoneDefaultRepo::get(&conn, Zone::Owning).unwrap().unwrap();
        assert_eq!(row.headline, "New headline");
        assert_eq!(ZoneDefaultRepo::all(&conn).unwrap().len(), 4);
    }
}
