//! Settings types with compiled defaults.
//!
//! Every field has a serde default so a partial settings file merges
//! cleanly over the compiled values.

use serde::{Deserialize, Serialize};

/// Top-level settings.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FgSettings {
    /// HTTP server settings.
    pub server: ServerSettings,
    /// Upstream API settings.
    pub api: ApiSettings,
}

/// HTTP server settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Host to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8787,
        }
    }
}

/// Upstream API settings, grouped by provider.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Anthropic (narrative-map generation).
    pub anthropic: AnthropicSettings,
    /// Chat gateway (coaching chat).
    pub chat: ChatGatewaySettings,
}

/// Anthropic provider settings. The API key comes from `ANTHROPIC_API_KEY`,
/// never from the settings file.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AnthropicSettings {
    /// Model used for narrative-map generation.
    pub model: String,
    /// Base URL override (tests and proxies).
    pub base_url: Option<String>,
    /// Max output tokens per generation.
    pub max_tokens: u32,
}

impl Default for AnthropicSettings {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-20250514".into(),
            base_url: None,
            max_tokens: 4096,
        }
    }
}

/// Chat gateway settings. The key comes from `FG_CHAT_GATEWAY_KEY`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatGatewaySettings {
    /// Model routed by the gateway.
    pub model: String,
    /// Gateway base URL.
    pub base_url: String,
}

impl Default for ChatGatewaySettings {
    fn default() -> Self {
        Self {
            model: "google/gemini-2.5-flash".into(),
            base_url: "https://ai.gateway.lovable.dev".into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let settings = FgSettings::default();
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.port, 8787);
        assert!(settings.api.anthropic.base_url.is_none());
        assert_eq!(settings.api.anthropic.max_tokens, 4096);
        assert!(!settings.api.chat.base_url.is_empty());
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let settings: FgSettings =
            serde_json::from_str(r#"{"server": {"port": 9000}}"#).unwrap();
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.api.anthropic.model, "claude-sonnet-4-20250514");
    }

    #[test]
    fn serde_roundtrip() {
        let settings = FgSettings::default();
        let json = serde_json::to_string(&settings).unwrap();
        let back: FgSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.server.port, settings.server.port);
        assert_eq!(back.api.chat.model, settings.api.chat.model);
    }
}
