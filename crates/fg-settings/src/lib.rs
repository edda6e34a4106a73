//! # fg-settings
//!
//! Settings for the narrative-map service.
//!
//! Loading flow: compiled defaults → deep-merged `~/.fg/settings.json`
//! (if present) → `FG_*` environment overrides. API keys never live in the
//! settings file — the binary reads them from the environment directly.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{load_settings, load_settings_from_path, settings_path};
pub use types::{AnthropicSettings, ChatGatewaySettings, FgSettings, ServerSettings};
