//! Client repository.

use rusqlite::{Connection, OptionalExtension, params};

use fg_core::{Client, ClientEmail, ClientStatus};

use crate::errors::{Result, StoreError};
use crate::repos::parse_ts;

fn status_from_str(raw: &str) -> Result<ClientStatus> {
    match raw {
        "pending" => Ok(ClientStatus::Pending),
        "approved" => Ok(ClientStatus::Approved),
        "inactive" => Ok(ClientStatus::Inactive),
        "deleted" => Ok(ClientStatus::Deleted),
        other => Err(StoreError::Decode {
            table: "clients",
            message: format!("unknown status {other:?}"),
        }),
    }
}

fn status_to_str(status: ClientStatus) -> &'static str {
    match status {
        ClientStatus::Pending => "pending",
        ClientStatus::Approved => "approved",
        ClientStatus::Inactive => "inactive",
        ClientStatus::Deleted => "deleted",
    }
}

/// Client repository — stateless, every method takes `&Connection`.
pub struct ClientRepo;

impl ClientRepo {
    /// Insert a client row.
    pub fn insert(conn: &Connection, client: &Client) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO clients (email, name, status, coach_email, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                client.email.as_str(),
                client.name,
                status_to_str(client.status),
                client.coach_email,
                client.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Fetch a client by email.
    pub fn get(conn: &Connection, email: &ClientEmail) -> Result<Option<Client>> {
        let raw = conn
            .query_row(
                "SELECT email, name, status, coach_email, created_at
                 FROM clients WHERE email = ?1",
                [email.as_str()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Option<String>>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()?;

        let Some((email, name, status, coach_email, created_at)) = raw else {
            return Ok(None);
        };

        Ok(Some(Client {
            email: ClientEmail::from(email),
            name,
            status: status_from_str(&status)?,
            coach_email,
            created_at: parse_ts(&created_at).map_err(|message| StoreError::Decode {
                table: "clients",
                message,
            })?,
        }))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rusqlite::Connection;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        let _ = crate::migrations::run_migrations(&conn).unwrap();
        conn
    }

    fn client(email: &str) -> Client {
        Client {
            email: ClientEmail::from(email),
            name: Some("Avery Chen".into()),
            status: ClientStatus::Approved,
            coach_email: Some("coach@findinggood.com".into()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn insert_and_get() {
        let conn = test_conn();
        ClientRepo::insert(&conn, &client("a@x.com")).unwrap();
        let loaded = ClientRepo::get(&conn, &ClientEmail::from("a@x.com"))
            .unwrap()
            .unwrap();
        assert_eq!(loaded.display_name(), "Avery Chen");
        assert_eq!(loaded.status, ClientStatus::Approved);
    }

    #[test]
    fn get_missing_returns_none() {
        let conn = test_conn();
        assert!(
            ClientRepo::get(&conn, &ClientEmail::from("nobody@x.com"))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn unknown_status_is_a_decode_error() {
        let conn = test_conn();
        let _ = conn
            .execute(
                "INSERT INTO clients (email, name, status, created_at)
                 VALUES ('bad@x.com', NULL, 'frozen', ?1)",
                [Utc::now().to_rfc3339()],
            )
            .unwrap();
        let err = ClientRepo::get(&conn, &ClientEmail::from("bad@x.com")).unwrap_err();
        assert!(matches!(err, StoreError::Decode { table: "clients", .. }));
    }
}
