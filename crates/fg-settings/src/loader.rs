//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`FgSettings::default()`]
//! 2. If `~/.fg/settings.json` exists, deep-merge user values over defaults
//! 3. Apply `FG_*` environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::FgSettings;

/// Resolve the path to the settings file (`~/.fg/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".fg").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<FgSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<FgSettings> {
    let defaults = serde_json::to_value(FgSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: FgSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// Integers must parse and sit within range; invalid values are silently
/// ignored (fall back to file/default).
pub fn apply_env_overrides(settings: &mut FgSettings) {
    // ── Server settings ─────────────────────────────────────────────
    if let Some(v) = read_env_string("FG_HOST") {
        settings.server.host = v;
    }
    if let Some(v) = read_env_u16("FG_PORT", 1, 65535) {
        settings.server.port = v;
    }

    // ── Anthropic settings ──────────────────────────────────────────
    if let Some(v) = read_env_string("FG_ANTHROPIC_MODEL") {
        settings.api.anthropic.model = v;
    }
    if let Some(v) = read_env_string("FG_ANTHROPIC_BASE_URL") {
        settings.api.anthropic.base_url = Some(v);
    }
    if let Some(v) = read_env_u32("FG_ANTHROPIC_MAX_TOKENS", 256, 128_000) {
        settings.api.anthropic.max_tokens = v;
    }

    // ── Chat gateway settings ───────────────────────────────────────
    if let Some(v) = read_env_string("FG_CHAT_MODEL") {
        settings.api.chat.model = v;
    }
    if let Some(v) = read_env_string("FG_CHAT_BASE_URL") {
        settings.api.chat.base_url = v;
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a `u16` within a range.
pub fn parse_u16_range(val: &str, min: u16, max: u16) -> Option<u16> {
    let n: u16 = val.parse().ok()?;
    (min..=max).contains(&n).then_some(n)
}

/// Parse a string as a `u32` within a range.
pub fn parse_u32_range(val: &str, min: u32, max: u32) -> Option<u32> {
    let n: u32 = val.parse().ok()?;
    (min..=max).contains(&n).then_some(n)
}

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn read_env_u16(name: &str, min: u16, max: u16) -> Option<u16> {
    parse_u16_range(&std::env::var(name).ok()?, min, max)
}

fn read_env_u32(name: &str, min: u32, max: u32) -> Option<u32> {
    parse_u32_range(&std::env::var(name).ok()?, min, max)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings_from_path(&dir.path().join("nope.json")).unwrap();
        assert_eq!(settings.server.port, 8787);
    }

    #[test]
    fn file_values_merge_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"server": {"port": 9999}, "api": {"anthropic": {"model": "claude-haiku-4-5-20251001"}}}"#,
        )
        .unwrap();

        let settings = load_settings_from_path(&path).unwrap();
        assert_eq!(settings.server.port, 9999);
        assert_eq!(settings.server.host, "127.0.0.1", "untouched default");
        assert_eq!(settings.api.anthropic.model, "claude-haiku-4-5-20251001");
        assert_eq!(settings.api.anthropic.max_tokens, 4096, "untouched default");
    }

    #[test]
    fn invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{nope").unwrap();
        assert!(load_settings_from_path(&path).is_err());
    }

    #[test]
    fn deep_merge_skips_nulls() {
        let target = serde_json::json!({"a": {"b": 1, "c": 2}});
        let source = serde_json::json!({"a": {"b": null, "c": 3}});
        let merged = deep_merge(target, source);
        assert_eq!(merged, serde_json::json!({"a": {"b": 1, "c": 3}}));
    }

    #[test]
    fn deep_merge_replaces_arrays() {
        let target = serde_json::json!({"list": [1, 2, 3]});
        let source = serde_json::json!({"list": [9]});
        assert_eq!(deep_merge(target, source), serde_json::json!({"list": [9]}));
    }

    #[test]
    fn parse_u16_range_bounds() {
        assert_eq!(parse_u16_range("8080", 1, 65535), Some(8080));
        assert_eq!(parse_u16_range("0", 1, 65535), None);
        assert_eq!(parse_u16_range("port", 1, 65535), None);
    }

    #[test]
    fn parse_u32_range_bounds() {
        assert_eq!(parse_u32_range("4096", 256, 128_000), Some(4096));
        assert_eq!(parse_u32_range("10", 256, 128_000), None);
    }
}
