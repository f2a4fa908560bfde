use std::path::Path;

use crate::core::credential::{ApiKey, KEY_PREFIX};
use crate::util::json::JsonFileError;

pub mod local;

/// Why a stored credential could not be loaded.
///
/// Callers at startup treat every variant as "no credential configured".
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    File(#[from] JsonFileError),

    #[error("Stored API key does not start with '{}'", KEY_PREFIX)]
    InvalidKey,

    #[error("Configuration must be an object with a string 'api_key'")]
    Shape,
}

/// Why the active credential could not be persisted.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("No API key to save.")]
    Missing,

    #[error("Current key does not look valid (must start with '{}').", KEY_PREFIX)]
    InvalidFormat,

    #[error("Failed to save API key: {0}")]
    Write(#[from] JsonFileError),
}

/// Storage abstraction for the API key
pub trait CredentialStore {
    /// Load the stored key; `Ok(None)` when nothing is configured
    fn load(&self) -> Result<Option<ApiKey>, ConfigError>;

    /// Persist `current`, replacing whatever was stored before
    fn save(&self, current: Option<&str>) -> Result<(), SaveError>;

    /// Where the key lives, for messages
    fn location(&self) -> &Path;
}
