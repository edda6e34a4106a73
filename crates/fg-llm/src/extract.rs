//! Fenced-JSON extraction.
//!
//! Models sometimes wrap their JSON payload in a markdown code fence even
//! when told not to. Stripping the fence is a pure text-preprocessing step,
//! kept separate from JSON parsing so both are testable on their own.

use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;

static FENCED_JSON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```json\s*(.*?)\s*```").expect("valid regex"));

static FENCED_ANY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```\s*(.*?)\s*```").expect("valid regex"));

/// Strip an optional ```` ```json … ``` ```` or ```` ``` … ``` ```` fence.
///
/// Returns the fenced body if a fence is found, otherwise the trimmed input.
/// A `json`-tagged fence wins over an untagged one.
#[must_use]
pub fn strip_code_fence(raw: &str) -> &str {
    if let Some(caps) = FENCED_JSON.captures(raw) {
        if let Some(m) = caps.get(1) {
            return m.as_str();
        }
    }
    if let Some(caps) = FENCED_ANY.captures(raw) {
        if let Some(m) = caps.get(1) {
            return m.as_str();
        }
    }
    raw.trim()
}

/// Strip an optional code fence, then parse the payload as JSON.
pub fn extract_json<T: DeserializeOwned>(raw: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(strip_code_fence(raw))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn bare_json_passes_through() {
        let parsed: Value = extract_json("{\"a\":1}").unwrap();
        assert_eq!(parsed["a"], 1);
    }

    #[test]
    fn json_fence_is_stripped() {
        let parsed: Value = extract_json("```json\n{\"a\":1}\n```").unwrap();
        assert_eq!(parsed["a"], 1);
    }

    #[test]
    fn fenced_and_bare_parse_identically() {
        let fenced: Value = extract_json("```json\n{\"a\":1}\n```").unwrap();
        let bare: Value = extract_json("{\"a\":1}").unwrap();
        assert_eq!(fenced, bare);
    }

    #[test]
    fn untagged_fence_is_stripped() {
        let parsed: Value = extract_json("```\n{\"b\": [1, 2]}\n```").unwrap();
        assert_eq!(parsed["b"][1], 2);
    }

    #[test]
    fn prose_around_the_fence_is_ignored() {
        let raw = "Here is the map you asked for:\n```json\n{\"a\":1}\n```\nLet me know!";
        let parsed: Value = extract_json(raw).unwrap();
        assert_eq!(parsed["a"], 1);
    }

    #[test]
    fn whitespace_is_trimmed() {
        let parsed: Value = extract_json("  \n {\"a\":1} \n ").unwrap();
        assert_eq!(parsed["a"], 1);
    }

    #[test]
    fn json_tag_wins_over_plain_fence() {
        let raw = "```\nnot json\n```\n```json\n{\"a\":1}\n```";
        // The tagged fence is preferred even when an untagged one comes first.
        let parsed: Value = extract_json(raw).unwrap();
        assert_eq!(parsed["a"], 1);
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let err = extract_json::<Value>("I could not produce JSON, sorry.");
        assert!(err.is_err());
    }

    #[test]
    fn multiline_payload_survives() {
        let raw = "```json\n{\n  \"list\": [\n    \"one\",\n    \"two\"\n  ]\n}\n```";
        let parsed: Value = extract_json(raw).unwrap();
        assert_eq!(parsed["list"][0], "one");
    }
}
