//! Fixed prompts for the two pipelines.
//!
//! The narrative system prompt defines the coaching framework; the user
//! message embeds the context document and the required JSON output
//! contract. Changing any of the output keys is a breaking change for the
//! generator's parser.

/// System prompt for narrative-map generation.
pub const NARRATIVE_SYSTEM_PROMPT: &str = r#"You are a Narrative Integrity analyst for Finding Good coaching. Your job is to synthesize client data into meaningful insights that help them see their own story more clearly.

THE FRAMEWORK:
Narrative Integrity = the ability to clarify, act on, and communicate the most honest version of your story, and help others do the same.

THE FIRES FRAMEWORK:
- Feelings: Emotional awareness and regulation
- Influence: Locus of control and agency
- Resilience: Growth through difficulty
- Ethics: Values alignment and purpose
- Strengths: Capability confidence and self-efficacy

THE FOUR ZONES (from FIRES Snapshot):
- Exploring (Low confidence, Low alignment): Stay curious, refine direction
- Discovering (Low confidence, High alignment): Bring forward past wins
- Performing (High confidence, Low alignment): Reconnect to identity
- Owning (High confidence, High alignment): Extend influence to others

SUPERPOWERS FRAMEWORK:
1. SUPERPOWERS CLAIMED - What they know and own
   - Evidence: High confidence AND high alignment in FIRES elements
   - Patterns they've demonstrated repeatedly
   - Strengths they articulate themselves

2. SUPERPOWERS EMERGING - What they're building confidence in
   - Evidence: High alignment but lower confidence (Discovering zone elements)
   - New behaviors they're trying
   - Skills they're developing but haven't fully claimed

3. SUPERPOWERS HIDDEN - What's in the data but they haven't claimed yet
   - Evidence: Impact they're having that they don't see
   - Patterns across sessions they haven't connected
   - Strengths others would name that they dismiss

WRITING GUIDELINES:
- Use second person ("You've shown..." not "The client has shown...")
- Be specific - reference actual quotes, events, examples from their data
- Be warm but direct - no fluff
- First-person voice for story sections ("I'm ready to..." not "They are ready to...")
- Evidence should be concrete examples, not abstract observations
- Connect insights to the 3Ps story arc when possible"#;

/// Build the narrative-map user message embedding the context document and
/// the required JSON output contract.
#[must_use]
pub fn narrative_user_message(context: &str) -> String {
    format!(
        r#"Analyze this client's data and generate their Narrative Integrity Map content.

{context}

---

Generate a complete Narrative Integrity Map. Respond in this exact JSON format:

{{
  "superpowers_claimed": [
    {{
      "superpower": "Name of superpower (usually a FIRES element or related quality)",
      "description": "One sentence about what this means for them",
      "evidence": ["Specific example 1 from their data", "Specific example 2"],
      "fires_element": "feelings|influence|resilience|ethics|strengths"
    }}
  ],
  "superpowers_emerging": [
    {{
      "superpower": "Name",
      "description": "What they're building",
      "evidence": ["Specific examples of this emerging"],
      "fires_element": "feelings|influence|resilience|ethics|strengths"
    }}
  ],
  "superpowers_hidden": [
    {{
      "superpower": "Name",
      "description": "What's in their data that they haven't claimed",
      "evidence": ["Examples they might not see themselves"],
      "fires_element": "feelings|influence|resilience|ethics|strengths"
    }}
  ],
  "zone_interpretation": {{
    "zone": "exploring|discovering|performing|owning",
    "custom_note": "What this zone means specifically for THIS person right now (2-3 sentences)"
  }},
  "world_asking": [
    {{
      "insight": "Full insight paragraph - what the world/their story is asking of them",
      "fires_element": "feelings|influence|resilience|ethics|strengths"
    }}
  ],
  "suggested_weekly_actions": [
    {{
      "action": "Specific action they could take this week (one sentence)",
      "fires_element": "feelings|influence|resilience|ethics|strengths"
    }}
  ],
  "suggested_anchor_quote": "An inspiring one-liner that captures their journey"
}}

IMPORTANT:
- Generate 2-3 items for each superpowers category
- Generate 3-4 "world asking" insights
- Generate exactly 2 weekly actions
- All evidence must be specific examples from their actual data
- Write in second person for descriptions, first person for quotes
- Be warm but direct - no generic coaching speak"#
    )
}

/// Build the coaching-chat system prompt, optionally embedding client
/// context assembled by the chat service.
#[must_use]
pub fn chat_system_prompt(client_context: Option<&str>) -> String {
    let context_section = client_context.map_or_else(
        || {
            "No client is currently selected. You can answer general questions about \
             coaching strategies and the FIRES framework."
                .to_owned()
        },
        |ctx| format!("## Client Context\n{ctx}"),
    );

    format!(
        r#"You are an AI coaching assistant for coaches using the Finding Good FIRES framework.
Your role is to help coaches prepare for sessions, understand client history, and brainstorm coaching strategies.

## The FIRES Framework
- **Feelings**: Emotional awareness and regulation
- **Influence**: Locus of control and agency
- **Resilience**: Growth through difficulty
- **Ethics**: Values alignment and purpose
- **Strengths**: Capability confidence and self-efficacy

## Your Guidelines
1. Be supportive, insightful, and professional
2. Reference specific client data when available
3. Suggest practical coaching questions and approaches
4. Connect observations to the FIRES framework when relevant
5. Help identify patterns and themes across sessions
6. Keep responses concise but actionable

{context_section}"#
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_embeds_context_and_contract() {
        let msg = narrative_user_message("CLIENT: a@x.com");
        assert!(msg.contains("CLIENT: a@x.com"));
        for key in [
            "superpowers_claimed",
            "superpowers_emerging",
            "superpowers_hidden",
            "zone_interpretation",
            "world_asking",
            "suggested_weekly_actions",
            "suggested_anchor_quote",
        ] {
            assert!(msg.contains(key), "contract key {key} missing");
        }
        assert!(msg.contains("Generate exactly 2 weekly actions"));
    }

    #[test]
    fn system_prompt_names_the_zones() {
        for zone in ["Exploring", "Discovering", "Performing", "Owning"] {
            assert!(NARRATIVE_SYSTEM_PROMPT.contains(zone));
        }
    }

    #[test]
    fn chat_prompt_with_and_without_context() {
        let without = chat_system_prompt(None);
        assert!(without.contains("No client is currently selected"));

        let with = chat_system_prompt(Some("## Current Client: Avery"));
        assert!(with.contains("## Client Context"));
        assert!(with.contains("## Current Client: Avery"));
    }
}
