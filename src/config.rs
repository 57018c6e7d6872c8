use std::{env, fmt, time::Duration};

use thiserror::Error;
use url::Url;

use crate::retry::RetryConfig;

pub const DEFAULT_API_BASE: &str = "https://api.github.com/";
pub const USER_AGENT_HEADER: &str = "sweep/0.1";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

// Same lookup order as the `gh` CLI.
const TOKEN_VARS: [&str; 2] = ["GH_TOKEN", "GITHUB_TOKEN"];

/// Everything the REST client needs to talk to the API host.
#[derive(Clone)]
pub struct Settings {
    pub api_base: Url,
    pub token: String,
    pub retry: RetryConfig,
    pub timeout: Duration,
}

impl Settings {
    pub fn new(token: impl Into<String>) -> Result<Self, ConfigError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        Ok(Self {
            api_base: parse_base(DEFAULT_API_BASE)?,
            token,
            retry: RetryConfig::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let token = TOKEN_VARS
            .iter()
            .filter_map(|key| lookup(*key))
            .find(|value| !value.trim().is_empty())
            .ok_or(ConfigError::MissingToken)?;
        Self::new(token.trim())
    }

    pub fn with_api_base(mut self, base: &str) -> Result<Self, ConfigError> {
        self.api_base = parse_base(base)?;
        Ok(self)
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_base", &self.api_base.as_str())
            .field("token", &"<redacted>")
            .field("retry", &self.retry)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Parses an API base, forcing a trailing slash so relative paths join
/// underneath it instead of replacing its last segment.
fn parse_base(base: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(base).map_err(|source| ConfigError::InvalidApiBase {
        base: base.to_owned(),
        source,
    })?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::NotABase(base.to_owned()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no GitHub token found; set GH_TOKEN or GITHUB_TOKEN")]
    MissingToken,
    #[error("invalid API base URL {base:?}: {source}")]
    InvalidApiBase {
        base: String,
        source: url::ParseError,
    },
    #[error("API base URL {0:?} cannot carry a path")]
    NotABase(String),
}
