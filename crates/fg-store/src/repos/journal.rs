//! Append-mostly journal repositories: impact entries, session transcripts,
//! coaching notes, voice memos, and client file records.
//!
//! All are evidence rows — decode failures quarantine the row rather than
//! failing the read.

use rusqlite::{Connection, params};
use tracing::warn;

use fg_core::{
    ClientEmail, ClientFile, CoachingNote, FileId, FiresElement, ImpactId, ImpactResponses,
    ImpactVerification, KeyQuote, NoteId, SessionTranscript, TranscriptId, MemoId, VoiceMemo,
};

use crate::errors::Result;
use crate::repos::{decode_list, decode_opt, encode_json, parse_date, parse_ts};

/// Impact verification repository.
pub struct ImpactRepo;

impl ImpactRepo {
    /// Insert an impact entry.
    pub fn insert(conn: &Connection, impact: &ImpactVerification) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO impact_verifications (id, client_email, responses, integrity_line, fires_focus, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                impact.id.as_str(),
                impact.client_email.as_str(),
                encode_json("impact_verifications", &impact.responses)?,
                impact.integrity_line,
                encode_json("impact_verifications", &impact.fires_focus)?,
                impact.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// The client's most recent impact entries, newest first.
    pub fn recent_for_client(
        conn: &Connection,
        email: &ClientEmail,
        limit: usize,
    ) -> Result<Vec<ImpactVerification>> {
        let mut stmt = conn.prepare(
            "SELECT id, client_email, responses, integrity_line, fires_focus, created_at
             FROM impact_verifications WHERE client_email = ?1
             ORDER BY created_at DESC LIMIT ?2",
        )?;

        #[allow(clippy::cast_possible_wrap)]
        let raws = stmt
            .query_map(params![email.as_str(), limit as i64], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut out = Vec::with_capacity(raws.len());
        for (id, client_email, responses, integrity_line, fires_focus, created_at) in raws {
            let decoded = (|| {
                let responses: Option<ImpactResponses> =
                    decode_opt("responses", responses.as_deref())?;
                let fires_focus: Vec<FiresElement> =
                    decode_list("fires_focus", fires_focus.as_deref())?;
                Ok::<_, String>(ImpactVerification {
                    id: ImpactId::from(id.clone()),
                    client_email: ClientEmail::from(client_email),
                    responses: responses.unwrap_or_default(),
                    integrity_line,
                    fires_focus,
                    created_at: parse_ts(&created_at)?,
                })
            })();
            match decoded {
                Ok(impact) => out.push(impact),
                Err(error) => warn!(table = "impact_verifications", id, %error, "quarantined row"),
            }
        }
        Ok(out)
    }
}

/// Session transcript repository.
pub struct TranscriptRepo;

impl TranscriptRepo {
    /// Insert a session record.
    pub fn insert(conn: &Connection, session: &SessionTranscript) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO session_transcripts (
                id, client_email, session_number, session_date, summary, key_themes,
                client_breakthroughs, coach_observations, next_session_focus, key_quotes,
                transcript_text, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                session.id.as_str(),
                session.client_email.as_str(),
                session.session_number,
                session.session_date.format("%Y-%m-%d").to_string(),
                session.summary,
                encode_json("session_transcripts", &session.key_themes)?,
                session.client_breakthroughs,
                session.coach_observations,
                session.next_session_focus,
                encode_json("session_transcripts", &session.key_quotes)?,
                session.transcript_text,
                session.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// The client's most recent sessions by session date, newest first.
    pub fn recent_for_client(
        conn: &Connection,
        email: &ClientEmail,
        limit: usize,
    ) -> Result<Vec<SessionTranscript>> {
        let mut stmt = conn.prepare(
            "SELECT id, client_email, session_number, session_date, summary, key_themes,
                    client_breakthroughs, coach_observations, next_session_focus, key_quotes,
                    transcript_text, created_at
             FROM session_transcripts WHERE client_email = ?1
             ORDER BY session_date DESC LIMIT ?2",
        )?;

        #[allow(clippy::cast_possible_wrap)]
        let raws = stmt
            .query_map(params![email.as_str(), limit as i64], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, Option<String>>(5)?,
                    row.get::<_, Option<String>>(6)?,
                    row.get::<_, Option<String>>(7)?,
                    row.get::<_, Option<String>>(8)?,
                    row.get::<_, Option<String>>(9)?,
                    row.get::<_, Option<String>>(10)?,
                    row.get::<_, String>(11)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut out = Vec::with_capacity(raws.len());
        for (
            id,
            client_email,
            session_number,
            session_date,
            summary,
            key_themes,
            client_breakthroughs,
            coach_observations,
            next_session_focus,
            key_quotes,
            transcript_text,
            created_at,
        ) in raws
        {
            let decoded = (|| {
                let key_themes: Vec<String> = decode_list("key_themes", key_themes.as_deref())?;
                let key_quotes: Vec<KeyQuote> = decode_list("key_quotes", key_quotes.as_deref())?;
                Ok::<_, String>(SessionTranscript {
                    id: TranscriptId::from(id.clone()),
                    client_email: ClientEmail::from(client_email),
                    session_number,
                    session_date: parse_date(&session_date)?,
                    summary,
                    key_themes,
                    client_breakthroughs,
                    coach_observations,
                    next_session_focus,
                    key_quotes,
                    transcript_text,
                    created_at: parse_ts(&created_at)?,
                })
            })();
            match decoded {
                Ok(session) => out.push(session),
                Err(error) => warn!(table = "session_transcripts", id, %error, "quarantined row"),
            }
        }
        Ok(out)
    }
}

/// Coaching note repository.
pub struct NoteRepo;

impl NoteRepo {
    /// Insert a note.
    pub fn insert(conn: &Connection, note: &CoachingNote) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO coaching_notes (id, client_email, note_date, content, coach_curiosity, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                note.id.as_str(),
                note.client_email.as_str(),
                note.note_date.format("%Y-%m-%d").to_string(),
                note.content,
                note.coach_curiosity,
                note.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// The client's most recent notes by note date, newest first.
    pub fn recent_for_client(
        conn: &Connection,
        email: &ClientEmail,
        limit: usize,
    ) -> Result<Vec<CoachingNote>> {
        let mut stmt = conn.prepare(
            "SELECT id, client_email, note_date, content, coach_curiosity, created_at
             FROM coaching_notes WHERE client_email = ?1
             ORDER BY note_date DESC LIMIT ?2",
        )?;

        #[allow(clippy::cast_possible_wrap)]
        let raws = stmt
            .query_map(params![email.as_str(), limit as i64], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut out = Vec::with_capacity(raws.len());
        for (id, client_email, note_date, content, coach_curiosity, created_at) in raws {
            let decoded = (|| {
                Ok::<_, String>(CoachingNote {
                    id: NoteId::from(id.clone()),
                    client_email: ClientEmail::from(client_email),
                    note_date: parse_date(&note_date)?,
                    content,
                    coach_curiosity,
                    created_at: parse_ts(&created_at)?,
                })
            })();
            match decoded {
                Ok(note) => out.push(note),
                Err(error) => warn!(table = "coaching_notes", id, %error, "quarantined row"),
            }
        }
        Ok(out)
    }
}

/// Voice memo repository.
pub struct VoiceMemoRepo;

impl VoiceMemoRepo {
    /// Insert a memo.
    pub fn insert(conn: &Connection, memo: &VoiceMemo) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO voice_memos (id, client_email, title, transcription, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                memo.id.as_str(),
                memo.client_email.as_str(),
                memo.title,
                memo.transcription,
                memo.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// The client's most recent memos, newest first.
    pub fn recent_for_client(
        conn: &Connection,
        email: &ClientEmail,
        limit: usize,
    ) -> Result<Vec<VoiceMemo>> {
        let mut stmt = conn.prepare(
            "SELECT id, client_email, title, transcription, created_at
             FROM voice_memos WHERE client_email = ?1
             ORDER BY created_at DESC LIMIT ?2",
        )?;

        #[allow(clippy::cast_possible_wrap)]
        let raws = stmt
            .query_map(params![email.as_str(), limit as i64], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut out = Vec::with_capacity(raws.len());
        for (id, client_email, title, transcription, created_at) in raws {
            match parse_ts(&created_at) {
                Ok(created_at) => out.push(VoiceMemo {
                    id: MemoId::from(id),
                    client_email: ClientEmail::from(client_email),
                    title,
                    transcription,
                    created_at,
                }),
                Err(error) => warn!(table = "voice_memos", id, %error, "quarantined row"),
            }
        }
        Ok(out)
    }
}

/// Client file metadata repository.
pub struct FileRepo;

impl FileRepo {
    /// Insert a file record.
    pub fn insert(conn: &Connection, file: &ClientFile) -> Result<()> {
        let _ = conn.execute(
            "INSERT INTO client_files (id, client_email, file_name, file_type, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                file.id.as_str(),
                file.client_email.as_str(),
                file.file_name,
                file.file_type,
                file.description,
                file.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// The client's most recent file records, newest first.
    pub fn recent_for_client(
        conn: &Connection,
        email: &ClientEmail,
        limit: usize,
    ) -> Result<Vec<ClientFile>> {
        let mut stmt = conn.prepare(
            "SELECT id, client_email, file_name, file_type, description, created_at
             FROM client_files WHERE client_email = ?1
             ORDER BY created_at DESC LIMIT ?2",
        )?;

        #[allow(clippy::cast_possible_wrap)]
        let raws = stmt
            .query_map(params![email.as_str(), limit as i64], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut out = Vec::with_capacity(raws.len());
        for (id, client_email, file_name, file_type, description, created_at) in raws {
            match parse_ts(&created_at) {
                Ok(created_at) => out.push(ClientFile {
                    id: FileId::from(id),
                    client_email: ClientEmail::from(client_email),
                    file_name,
                    file_type,
                    description,
                    created_at,
                }),
                Err(error) => warn!(table = "client_files", id, %error, "quarantined row"),
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

    fn impact(email: &str, age_days: i64) -> ImpactVerification {
        ImpactVerification {
            id: ImpactId::new(),
            client_email: ClientEmail::from(email),
            responses: ImpactResponses {
                what_did: Some("Ran the incident review".into()),
                how_did: Some("Kept it blameless".into()),
                what_impact: Some("Team shipped the fix same day".into()),
                ..Default::default()
            },
            integrity_line: Some("I steady the room".into()),
            fires_focus: vec![FiresElement::Resilience],
            created_at: Utc::now() - Duration::days(age_days),
        }
    }

    fn session(email: &str, number: i64, date: NaiveDate) -> SessionTranscript {
        SessionTranscript {
            id: TranscriptId::new(),
            client_email: ClientEmail::from(email),
            session_number: number,
            session_date: date,
            summary: Some("Worked the delegation story".into()),
            key_themes: vec!["delegation".into(), "trust".into()],
            client_breakthroughs: Some("Named the fear under control".into()),
            coach_observations: None,
            next_session_focus: Some("Practice the ask".into()),
            key_quotes: vec![KeyQuote {
                quote: "I don't have to carry all of it".into(),
                context: Some("closing round".into()),
            }],
            transcript_text: Some("short transcript".into()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn impacts_recent_limit_and_order() {
        let conn = test_conn();
        for age in 0..4 {
            ImpactRepo::insert(&conn, &impact("a@x.com", age)).unwrap();
        }
        let recent =
            ImpactRepo::recent_for_client(&conn, &ClientEmail::from("a@x.com"), 3).unwrap();
        assert_eq!(recent.len(), 3);
        assert!(recent[0].created_at >= recent[1].created_at);
        assert_eq!(recent[0].responses.what_happened(), Some("Ran the incident review"));
    }

    #[test]
    fn corrupt_impact_responses_quarantined() {
        let conn = test_conn();
        let bad = impact("a@x.com", 0);
        ImpactRepo::insert(&conn, &bad).unwrap();
        let _ = conn
            .execute(
                "UPDATE impact_verifications SET responses = '[not-an-object' WHERE id = ?1",
                [bad.id.as_str()],
            )
            .unwrap();
        ImpactRepo::insert(&conn, &impact("a@x.com", 1)).unwrap();

        let recent =
            ImpactRepo::recent_for_client(&conn, &ClientEmail::from("a@x.com"), 10).unwrap();
        assert_eq!(recent.len(), 1);
    }

    #[test]
    fn transcripts_order_by_session_date() {
        let conn = test_conn();
        let d = |day| NaiveDate::from_ymd_opt(2026, 6, day).unwrap();
        TranscriptRepo::insert(&conn, &session("a@x.com", 1, d(1))).unwrap();
        TranscriptRepo::insert(&conn, &session("a@x.com", 3, d(20))).unwrap();
        TranscriptRepo::insert(&conn, &session("a@x.com", 2, d(10))).unwrap();

        let recent =
            TranscriptRepo::recent_for_client(&conn, &ClientEmail::from("a@x.com"), 2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].session_number, 3);
        assert_eq!(recent[1].session_number, 2);
    }

    #[test]
    fn notes_roundtrip() {
        let conn = test_conn();
        NoteRepo::insert(
            &conn,
            &CoachingNote {
                id: NoteId::new(),
                client_email: ClientEmail::from("a@x.com"),
                note_date: NaiveDate::from_ymd_opt(2026, 7, 4).unwrap(),
                content: "Prep the validate-phase review".into(),
                coach_curiosity: Some("What are they avoiding?".into()),
                created_at: Utc::now(),
            },
        )
        .unwrap();

        let notes = NoteRepo::recent_for_client(&conn, &ClientEmail::from("a@x.com"), 10).unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].content, "Prep the validate-phase review");
    }

    #[test]
    fn memos_and_files_roundtrip() {
        let conn = test_conn();
        VoiceMemoRepo::insert(
            &conn,
            &VoiceMemo {
                id: MemoId::new(),
                client_email: ClientEmail::from("a@x.com"),
                title: Some("Morning check-in".into()),
                transcription: Some("Feeling steadier this week".into()),
                created_at: Utc::now(),
            },
        )
        .unwrap();
        FileRepo::insert(
            &conn,
            &ClientFile {
                id: FileId::new(),
                client_email: ClientEmail::from("a@x.com"),
                file_name: "values-inventory.pdf".into(),
                file_type: Some("application/pdf".into()),
                description: Some("Completed values worksheet".into()),
                created_at: Utc::now(),
            },
        )
        .unwrap();

        let memos =
            VoiceMemoRepo::recent_for_client(&conn, &ClientEmail::from("a@x.com"), 10).unwrap();
        let files = FileRepo::recent_for_client(&conn, &ClientEmail::from("a@x.com"), 10).unwrap();
        assert_eq!(memos.len(), 1);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name, "values-inventory.pdf");
    }
}
