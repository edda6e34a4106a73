//! Context document rendering.
//!
//! Turns a loaded [`ClientContext`] into the single ordered text document
//! the generator consumes. Section order and labels are part of the prompt
//! contract — tests pin the load-bearing literals.

use std::fmt::Write as _;

use fg_core::{FiresElement, Snapshot};

use crate::aggregator::ClientContext;
use crate::constants::{MEMO_EXCERPT_CHARS, TRANSCRIPT_EXCERPT_CHARS, TRANSCRIPT_INLINE_MAX_CHARS};

/// Truncate to at most `max` characters (not bytes), appending an ellipsis
/// when anything was cut.
fn excerpt(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_owned();
    }
    let mut out: String = text.chars().take(max).collect();
    out.push_str("...");
    out
}

fn fires_list(elements: &[FiresElement]) -> String {
    elements
        .iter()
        .map(|e| e.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn push_line(doc: &mut String, line: &str) {
    doc.push_str(line);
    doc.push('\n');
}

fn push_snapshot(doc: &mut String, index: usize, snapshot: &Snapshot) {
    let _ = writeln!(
        doc,
        "Snapshot {} ({}):",
        index + 1,
        snapshot.created_at.format("%Y-%m-%d")
    );
    if let Some(goal) = &snapshot.goal {
        let _ = writeln!(doc, "  Goal: {goal}");
    }
    if let Some(zone) = snapshot.overall_zone {
        let _ = writeln!(doc, "  Overall Zone: {zone}");
    }
    if let Some(category) = &snapshot.growth_opportunity_category {
        let zone = snapshot
            .growth_opportunity_zone
            .map_or_else(String::new, |z| format!(" ({z})"));
        let _ = writeln!(doc, "  Growth Opportunity: {category}{zone}");
    }
    if let Some(category) = &snapshot.owning_highlight_category {
        let zone = snapshot
            .owning_highlight_zone
            .map_or_else(String::new, |z| format!(" ({z})"));
        let _ = writeln!(doc, "  Owning Highlight: {category}{zone}");
    }
    if let Some(breakdown) = &snapshot.zone_breakdown {
        push_line(doc, "  Zone Breakdown:");
        for (element, zone) in breakdown {
            let _ = writeln!(doc, "    {element}: {zone}");
        }
    }

    // Fixed set of key free-text answers, by question code.
    let fs = snapshot.fs_answers.as_ref();
    let ps = snapshot.ps_answers.as_ref();
    let answers: [(&str, Option<&String>); 8] = [
        ("Future goal", fs.and_then(|a| a.get("fs1"))),
        ("Emotion needed", fs.and_then(|a| a.get("fs3"))),
        ("Staying in difficulty", fs.and_then(|a| a.get("fs4"))),
        ("Values alignment", fs.and_then(|a| a.get("fs5"))),
        ("Strengths needed", fs.and_then(|a| a.get("fs6"))),
        ("Past success", ps.and_then(|a| a.get("ps1"))),
        ("What worked", ps.and_then(|a| a.get("ps3"))),
        ("How stayed in difficulty", ps.and_then(|a| a.get("ps4"))),
    ];
    let has_answers = answers.iter().any(|(_, v)| v.is_some())
        || snapshot.past_support.is_some()
        || snapshot.future_support.is_some();
    if has_answers {
        push_line(doc, "  Key Answers:");
        for (label, value) in answers {
            if let Some(value) = value {
                let _ = writeln!(doc, "    {label}: {value}");
            }
        }
        if let Some(who) = &snapshot.past_support {
            let _ = writeln!(doc, "    Who helped: {who}");
        }
        if let Some(who) = &snapshot.future_support {
            let _ = writeln!(doc, "    Who they'll rely on: {who}");
        }
    }

    if let Some(summary) = snapshot.narrative.as_ref().and_then(|n| n.summary.as_ref()) {
        let _ = writeln!(doc, "  AI Narrative: {summary}");
    }
    doc.push('\n');
}

/// Render the full analysis context document.
#[must_use]
pub fn render_document(ctx: &ClientContext) -> String {
    let mut doc = String::new();
    let engagement = &ctx.engagement;

    // Client basics.
    let display_name = ctx
        .client
        .as_ref()
        .map_or(engagement.client_email.as_str(), |c| c.display_name());
    let _ = writeln!(doc, "CLIENT: {display_name}");
    doc.push('\n');

    // Engagement context.
    push_line(&mut doc, "=== ENGAGEMENT CONTEXT ===");
    let _ = writeln!(
        doc,
        "Phase: {} - Week {} of 12",
        engagement.current_phase.as_upper(),
        engagement.current_week
    );
    let _ = writeln!(
        doc,
        "Primary Arena: {}",
        engagement.primary_arena.as_deref().unwrap_or("Not set")
    );
    doc.push('\n');

    // The story (3Ps). Absent fields are explicitly marked.
    push_line(&mut doc, "=== THE STORY WE'RE STRENGTHENING ===");
    let _ = writeln!(
        doc,
        "PRESENT (Where they are now): {}",
        engagement.story_present.as_deref().unwrap_or("Not captured")
    );
    let _ = writeln!(
        doc,
        "PAST (What brought them here): {}",
        engagement.story_past.as_deref().unwrap_or("Not captured")
    );
    let _ = writeln!(
        doc,
        "POTENTIAL (Where they're going): {}",
        engagement.story_potential.as_deref().unwrap_or("Not captured")
    );
    doc.push('\n');

    // Goals & challenges.
    if !engagement.goals.is_empty() || !engagement.challenges.is_empty() {
        push_line(&mut doc, "=== GOALS & CHALLENGES ===");
        if !engagement.goals.is_empty() {
            push_line(&mut doc, "Goals:");
            for g in &engagement.goals {
                let _ = writeln!(doc, "  \u{2022} {} (FIRES: {})", g.goal, g.fires_lever);
            }
        }
        if !engagement.challenges.is_empty() {
            push_line(&mut doc, "Challenges:");
            for c in &engagement.challenges {
                let _ = writeln!(doc, "  \u{2022} {} (FIRES: {})", c.challenge, c.fires_lever);
            }
        }
        doc.push('\n');
    }

    // FIRES focus.
    if !engagement.fires_focus.is_empty() {
        let _ = writeln!(doc, "FIRES FOCUS: {}", fires_list(&engagement.fires_focus));
        doc.push('\n');
    }

    // More/less markers with progress.
    if !ctx.markers.is_empty() {
        push_line(&mut doc, "=== MORE/LESS MARKERS ===");
        for m in &ctx.markers {
            let _ = writeln!(doc, "{}: \"{}\"", m.marker_type.as_upper(), m.marker_text);
            let _ = writeln!(
                doc,
                "  Baseline: {} \u{2192} Current: {} \u{2192} Target: {} {}",
                m.baseline_score,
                m.current_score,
                m.target_score,
                m.progress_label()
            );
            if let Some(fires) = m.fires_connection {
                let _ = writeln!(doc, "  FIRES: {fires}");
            }
            if let Some(exchange) = &m.exchange_insight {
                let _ = writeln!(doc, "  Exchange: {exchange}");
            }
        }
        doc.push('\n');
    }

    // Snapshots.
    if !ctx.snapshots.is_empty() {
        push_line(&mut doc, "=== FIRES SNAPSHOTS ===");
        for (i, snapshot) in ctx.snapshots.iter().enumerate() {
            push_snapshot(&mut doc, i, snapshot);
        }
    }

    // Impact entries.
    if !ctx.impacts.is_empty() {
        push_line(&mut doc, "=== RECENT IMPACT ENTRIES ===");
        for impact in &ctx.impacts {
            let _ = writeln!(doc, "{}:", impact.created_at.format("%Y-%m-%d"));
            if let Some(what) = impact.responses.what_happened() {
                let _ = writeln!(doc, "  What they did: {what}");
            }
            if let Some(how) = impact.responses.how() {
                let _ = writeln!(doc, "  How they did it: {how}");
            }
            if let Some(created) = impact.responses.impact_created() {
                let _ = writeln!(doc, "  Impact created: {created}");
            }
            if let Some(line) = &impact.integrity_line {
                let _ = writeln!(doc, "  Integrity Line: \"{line}\"");
            }
            if !impact.fires_focus.is_empty() {
                let _ = writeln!(doc, "  FIRES Focus: {}", fires_list(&impact.fires_focus));
            }
        }
        doc.push('\n');
    }

    // Sessions.
    if !ctx.sessions.is_empty() {
        push_line(&mut doc, "=== COACHING SESSIONS ===");
        for s in &ctx.sessions {
            let _ = writeln!(
                doc,
                "Session {} ({}):",
                s.session_number,
                s.session_date.format("%Y-%m-%d")
            );
            if let Some(summary) = &s.summary {
                let _ = writeln!(doc, "  Summary: {summary}");
            }
            if !s.key_themes.is_empty() {
                let _ = writeln!(doc, "  Themes: {}", s.key_themes.join(", "));
            }
            if let Some(breakthroughs) = &s.client_breakthroughs {
                let _ = writeln!(doc, "  Breakthroughs: {breakthroughs}");
            }
            if let Some(observations) = &s.coach_observations {
                let _ = writeln!(doc, "  Coach Observations: {observations}");
            }
            if let Some(next) = &s.next_session_focus {
                let _ = writeln!(doc, "  Next Focus: {next}");
            }
            if !s.key_quotes.is_empty() {
                push_line(&mut doc, "  Key Quotes:");
                for q in &s.key_quotes {
                    let _ = writeln!(
                        doc,
                        "    \"{}\" - {}",
                        q.quote,
                        q.context.as_deref().unwrap_or("")
                    );
                }
            }
            // Long transcripts are omitted entirely to protect prompt size;
            // short ones contribute a bounded excerpt.
            if let Some(transcript) = &s.transcript_text {
                if transcript.chars().count() < TRANSCRIPT_INLINE_MAX_CHARS {
                    push_line(&mut doc, "  Transcript Excerpt:");
                    let _ = writeln!(doc, "    {}", excerpt(transcript, TRANSCRIPT_EXCERPT_CHARS));
                }
            }
            doc.push('\n');
        }
    }

    // Coach notes.
    if !ctx.notes.is_empty() {
        push_line(&mut doc, "=== COACH NOTES ===");
        for note in &ctx.notes {
            let _ = writeln!(doc, "{}: {}", note.note_date.format("%Y-%m-%d"), note.content);
            if let Some(curiosity) = &note.coach_curiosity {
                let _ = writeln!(doc, "  [Coach Curiosity: {curiosity}]");
            }
        }
        doc.push('\n');
    }

    // Marker progress updates.
    if !ctx.marker_updates.is_empty() {
        push_line(&mut doc, "=== MORE/LESS PROGRESS UPDATES ===");
        for u in &ctx.marker_updates {
            let _ = writeln!(doc, "{}: Score {}", u.update_date.format("%Y-%m-%d"), u.score);
            if let Some(note) = &u.note {
                let _ = writeln!(doc, "  Note: {note}");
            }
            if let Some(exchange) = &u.exchange_note {
                let _ = writeln!(doc, "  Exchange: {exchange}");
            }
        }
        doc.push('\n');
    }

    // Voice memos (transcriptions, bounded).
    if !ctx.voice_memos.is_empty() {
        push_line(&mut doc, "=== VOICE MEMOS ===");
        for memo in &ctx.voice_memos {
            let _ = writeln!(
                doc,
                "{}: {}",
                memo.created_at.format("%Y-%m-%d"),
                memo.title.as_deref().unwrap_or("Untitled")
            );
            if let Some(transcription) = &memo.transcription {
                let _ = writeln!(
                    doc,
                    "  Transcription: {}",
                    excerpt(transcription, MEMO_EXCERPT_CHARS)
                );
            }
        }
        doc.push('\n');
    }

    // Client files (metadata and description only, never raw bytes).
    if !ctx.files.is_empty() {
        push_line(&mut doc, "=== CLIENT FILES ===");
        for file in &ctx.files {
            let _ = writeln!(
                doc,
                "{}: {} ({})",
                file.created_at.format("%Y-%m-%d"),
                file.file_name,
                file.file_type.as_deref().unwrap_or("unknown")
            );
            if let Some(description) = &file.description {
                let _ = writeln!(doc, "  Description: {description}");
            }
        }
        doc.push('\n');
    }

    doc
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fg_core::{
        Client, ClientEmail, ClientStatus, CoachingEngagement, EngagementId, EngagementStatus,
        Goal, MarkerId, MarkerKind, MoreLessMarker, Phase, Snapshot, SnapshotId, Zone,
    };

    fn base_engagement() -> CoachingEngagement {
        let now = Utc::now();
        CoachingEngagement {
            id: EngagementId::new(),
            client_email: ClientEmail::from("a@x.com"),
            status: EngagementStatus::Active,
            current_phase: Phase::Validate,
            current_week: 5,
            primary_arena: Some("Engineering leadership".into()),
            story_present: Some("Leading a new team".into()),
            story_past: None,
            story_potential: None,
            goals: vec![Goal {
                goal: "Delegate the roadmap".into(),
                fires_lever: fg_core::FiresElement::Influence,
            }],
            challenges: vec![],
            fires_focus: vec![fg_core::FiresElement::Influence],
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

    fn marker(kind: MarkerKind, baseline: i64, current: i64, target: i64) -> MoreLessMarker {
        MoreLessMarker {
            id: MarkerId::new(),
            client_email: ClientEmail::from("a@x.com"),
            marker_type: kind,
            marker_text: "marker".into(),
            baseline_score: baseline,
            current_score: current,
            target_score: target,
            fires_connection: None,
            exchange_insight: None,
            is_active: true,
            created_at: Utc::now(),
        }
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

    fn context() -> ClientContext {
        ClientContext {
            client: Some(Client {
                email: ClientEmail::from("a@x.com"),
                name: Some("Avery Chen".into()),
                status: ClientStatus::Approved,
                coach_email: None,
                created_at: Utc::now(),
            }),
            engagement: base_engagement(),
            markers: vec![],
            snapshots: vec![],
            impacts: vec![],
            sessions: vec![],
            notes: vec![],
            marker_updates: vec![],
            voice_memos: vec![],
            files: vec![],
            zone_defaults: vec![],
        }
    }

    #[test]
    fn week_phase_zone_and_marker_deltas_render() {
        let mut ctx = context();
        ctx.markers = vec![
            marker(MarkerKind::More, 3, 5, 9),
            marker(MarkerKind::Less, 7, 4, 1),
        ];
        ctx.snapshots = vec![snapshot(Zone::Discovering)];

        let doc = render_document(&ctx);
        assert!(doc.contains("Week 5"), "missing week literal:\n{doc}");
        assert!(doc.contains("VALIDATE"), "missing phase literal");
        assert!(doc.contains("discovering"), "missing zone literal");
        assert!(doc.contains("(+2 progress)"), "missing more-marker delta");
        assert!(doc.contains("(+3 progress)"), "missing less-marker delta");
    }

    #[test]
    fn absent_story_fields_marked_not_captured() {
        let doc = render_document(&context());
        assert!(doc.contains("PRESENT (Where they are now): Leading a new team"));
        assert!(doc.contains("PAST (What brought them here): Not captured"));
        assert!(doc.contains("POTENTIAL (Where they're going): Not captured"));
    }

    #[test]
    fn client_name_with_email_fallback() {
        let mut ctx = context();
        let doc = render_document(&ctx);
        assert!(doc.starts_with("CLIENT: Avery Chen"));

        ctx.client = None;
        let doc = render_document(&ctx);
        assert!(doc.starts_with("CLIENT: a@x.com"));
    }

    #[test]
    fn goals_annotated_with_fires_lever() {
        let doc = render_document(&context());
        assert!(doc.contains("\u{2022} Delegate the roadmap (FIRES: influence)"));
        assert!(doc.contains("FIRES FOCUS: influence"));
    }

    #[test]
    fn long_transcript_is_omitted_short_is_excerpted() {
        use fg_core::{SessionTranscript, TranscriptId};
        let mut ctx = context();
        let session = |n: i64, text: String| SessionTranscript {
            id: TranscriptId::new(),
            client_email: ClientEmail::from("a@x.com"),
            session_number: n,
            session_date: Utc::now().date_naive(),
            summary: None,
            key_themes: vec![],
            client_breakthroughs: None,
            coach_observations: None,
            next_session_focus: None,
            key_quotes: vec![],
            transcript_text: Some(text),
            created_at: Utc::now(),
        };
        ctx.sessions = vec![
            session(1, "x".repeat(6_000)),
            session(2, "short transcript".into()),
        ];

        let doc = render_document(&ctx);
        assert!(!doc.contains(&"x".repeat(2_100)), "long transcript leaked");
        assert!(doc.contains("short transcript"));
    }

    #[test]
    fn excerpt_is_char_safe_and_bounded() {
        let text = "é".repeat(1_500);
        let cut = excerpt(&text, MEMO_EXCERPT_CHARS);
        assert_eq!(cut.chars().count(), MEMO_EXCERPT_CHARS + 3);
        assert!(cut.ends_with("..."));
        assert_eq!(excerpt("short", 1_000), "short");
    }

    #[test]
    fn empty_sections_are_omitted() {
        let doc = render_document(&context());
        assert!(!doc.contains("=== MORE/LESS MARKERS ==="));
        assert!(!doc.contains("=== VOICE MEMOS ==="));
        assert!(!doc.contains("=== CLIENT FILES ==="));
    }
}
