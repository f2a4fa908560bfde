use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::{
    core::credential::{validate_format, ApiKey},
    json::{read_json, write_json_pretty},
    store::{ConfigError, CredentialStore, SaveError},
};

/// Name of the configuration file placed beside the executable
pub const CONFIG_FILE_NAME: &str = "config.json";

/// On-disk shape: `{"api_key": "sk-..."}`. Other keys are ignored.
#[derive(Debug, Clone, Default, Serialize)]
struct ConfigRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
}

/// JSON configuration file holding the API key
pub struct LocalConfig {
    path: PathBuf,
}

impl LocalConfig {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// `config.json` in the directory of the running executable
    pub fn beside_executable() -> Result<Self> {
        let exe = env::current_exe().context("Failed to locate the running executable")?;
        let dir = exe
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Executable has no parent directory"))?;
        Ok(Self::new(dir.join(CONFIG_FILE_NAME)))
    }
}

impl CredentialStore for LocalConfig {
    fn load(&self) -> Result<Option<ApiKey>, ConfigError> {
        if !self.path.is_file() {
            debug!(path = %self.path.display(), "no configuration file");
            return Ok(None);
        }

        // A map, not a derived struct: serde would also accept `["sk-..."]`
        let record: Map<String, Value> = read_json(&self.path)?;

        match record.get("api_key") {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(key)) if key.is_empty() => Ok(None),
            Some(Value::String(key)) => ApiKey::new(key)
                .map(Some)
                .map_err(|_| ConfigError::InvalidKey),
            Some(_) => Err(ConfigError::Shape),
        }
    }

    fn save(&self, current: Option<&str>) -> Result<(), SaveError> {
        let key = match current {
            Some(key) if !key.is_empty() => key,
            _ => return Err(SaveError::Missing),
        };

        if !validate_format(key) {
            return Err(SaveError::InvalidFormat);
        }

        let record = ConfigRecord {
            api_key: Some(key.to_string()),
        };
        write_json_pretty(&self.path, &record)?;

        info!(path = %self.path.display(), "API key saved");
        Ok(())
    }

    fn location(&self) -> &Path {
        &self.path
    }
}
