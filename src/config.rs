//! Probe configuration resolved from a loaded env file and the process
//! environment.

use std::fmt;

use crate::envfile::EnvFile;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";
pub const ORG_ID_ENV: &str = "OPENAI_ORG_ID";
pub const PROJECT_ID_ENV: &str = "OPENAI_PROJECT_ID";

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Characters shown at each end of a masked key.
const MASK_VISIBLE_CHARS: usize = 10;

/// An API credential. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// First and last ten characters joined by `...`.
    ///
    /// Keys shorter than ten characters show in full on both sides.
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        let head = MASK_VISIBLE_CHARS.min(chars.len());
        let tail = chars.len().saturating_sub(MASK_VISIBLE_CHARS);

        let prefix: String = chars[..head].iter().collect();
        let suffix: String = chars[tail..].iter().collect();
        format!("{}...{}", prefix, suffix)
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Everything the probe needs, passed explicitly instead of read from
/// ambient global state.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub api_key: Option<ApiKey>,
    pub base_url: String,
    pub organization: Option<String>,
    pub project: Option<String>,
}

impl ProbeConfig {
    /// Resolve settings from `env_file`, falling back to the process
    /// environment for keys the file does not assign.
    pub fn resolve(env_file: &EnvFile) -> Self {
        Self::from_lookup(|key| {
            env_file
                .get(key)
                .map(str::to_string)
                .or_else(|| std::env::var(key).ok())
        })
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        Self {
            api_key: non_empty(API_KEY_ENV).map(ApiKey::new),
            base_url: non_empty(BASE_URL_ENV).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            organization: non_empty(ORG_ID_ENV),
            project: non_empty(PROJECT_ID_ENV),
        }
    }
}
