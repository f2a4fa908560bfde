use tracing::debug;

use crate::core::credential::ApiKey;
use crate::store::CredentialStore;

/// Per-window state: the active API key.
///
/// Owned by the shell and lent to the classifier for each call.
#[derive(Debug, Clone, Default)]
pub struct Session {
    api_key: Option<ApiKey>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(key: ApiKey) -> Self {
        Self { api_key: Some(key) }
    }

    /// Start a session from whatever the store holds.
    ///
    /// A missing, unreadable or invalid configuration yields an empty session.
    pub fn load(store: &impl CredentialStore) -> Self {
        match store.load() {
            Ok(Some(key)) => {
                debug!(key = %key, "loaded API key from configuration");
                Self::with_key(key)
            }
            Ok(None) => Self::new(),
            Err(e) => {
                debug!(path = %store.location().display(), error = %e, "ignoring configuration");
                Self::new()
            }
        }
    }

    pub fn api_key(&self) -> Option<&ApiKey> {
        self.api_key.as_ref()
    }

    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Make `key` the active credential, replacing any previous one
    pub fn commit(&mut self, key: ApiKey) {
        self.api_key = Some(key);
    }
}
