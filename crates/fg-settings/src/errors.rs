//! Settings error type.

use thiserror::Error;

/// Result alias for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;

/// Errors from settings loading.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Reading the settings file failed.
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file contains invalid JSON (or the merged value doesn't
    /// match the settings shape).
    #[error("invalid settings: {0}")]
    Json(#[from] serde_json::Error),
}
