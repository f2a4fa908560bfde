use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Display};

/// Every key issued by the service starts with this prefix.
pub const KEY_PREFIX: &str = "sk";

/// Superficial syntactic check: does `candidate` look like an API key?
///
/// This says nothing about whether the service will accept the key.
pub fn validate_format(candidate: &str) -> bool {
    candidate.starts_with(KEY_PREFIX)
}

/// API key for the classification service
///
/// Construction goes through [`ApiKey::new`], so a value of this type always
/// passes [`validate_format`].
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(s: impl AsRef<str>) -> Result<Self> {
        let s = s.as_ref();

        if !validate_format(s) {
            anyhow::bail!("API key must start with '{}'", KEY_PREFIX);
        }

        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form safe to show on screen or in logs, e.g. `sk-p…9xQa`
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 8 {
            return format!("{}…", KEY_PREFIX);
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}…{}", head, tail)
    }
}

impl TryFrom<String> for ApiKey {
    type Error = anyhow::Error;
    fn try_from(s: String) -> Result<Self> {
        Self::new(s)
    }
}

impl From<ApiKey> for String {
    fn from(key: ApiKey) -> String {
        key.0
    }
}

// Never print the secret itself
impl Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiKey").field(&self.masked()).finish()
    }
}

impl Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.masked())
    }
}
