use reqwest::{
    StatusCode,
    blocking::{Client, RequestBuilder},
    header::ACCEPT,
};
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::{
    config::{Settings, USER_AGENT_HEADER},
    retry::{self, Retriable, RetryConfig},
};

const GH_ACCEPT: &str = "application/vnd.github+json";

/// Authenticated REST access to a single API host.
///
/// Paths are relative to [`RestClient::base_url`]; absolute API urls found in
/// payloads go through [`api_path`] first.
pub trait RestClient {
    fn base_url(&self) -> &Url;

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError>;

    fn patch_json(&self, path: &str, body: &serde_json::Value) -> Result<(), FetchError>;

    fn delete(&self, path: &str) -> Result<(), FetchError>;
}

pub struct GitHubClient {
    http: Client,
    base: Url,
    token: String,
    retry: RetryConfig,
}

impl GitHubClient {
    pub fn new(settings: &Settings) -> Result<Self, FetchError> {
        let http = Client::builder()
            .user_agent(USER_AGENT_HEADER)
            .timeout(settings.timeout)
            .build()
            .map_err(FetchError::Http)?;
        Ok(Self {
            http,
            base: settings.api_base.clone(),
            token: settings.token.clone(),
            retry: settings.retry,
        })
    }

    /// Resolves `path` against the base. The result must stay on the base's
    /// origin and under its path, whatever `path` looks like.
    fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        let url = self
            .base
            .join(path)
            .map_err(|source| FetchError::InvalidUrl {
                url: path.to_owned(),
                source,
            })?;
        if url.origin() != self.base.origin() || !url.path().starts_with(self.base.path()) {
            return Err(FetchError::ForeignUrl(url.to_string()));
        }
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(ACCEPT, GH_ACCEPT).bearer_auth(&self.token)
    }
}

impl RestClient for GitHubClient {
    fn base_url(&self) -> &Url {
        &self.base
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = self.endpoint(path)?;
        retry::retry(self.retry, path, || {
            let value = self
                .authorized(self.http.get(url.clone()))
                .send()?
                .error_for_status()?
                .json()?;
            Ok(value)
        })
    }

    fn patch_json(&self, path: &str, body: &serde_json::Value) -> Result<(), FetchError> {
        let url = self.endpoint(path)?;
        retry::retry(self.retry, path, || {
            self.authorized(self.http.patch(url.clone()))
                .json(body)
                .send()?
                .error_for_status()?;
            Ok(())
        })
    }

    fn delete(&self, path: &str) -> Result<(), FetchError> {
        let url = self.endpoint(path)?;
        retry::retry(self.retry, path, || {
            self.authorized(self.http.delete(url.clone()))
                .send()?
                .error_for_status()?;
            Ok(())
        })
    }
}

/// Turns an absolute API url into a path relative to `base`, keeping the
/// query string.
///
/// The url must share the base's scheme, host and port and live underneath
/// its path; anything else is rejected so the token never leaves the host.
pub fn api_path(base: &Url, raw: &str) -> Result<String, FetchError> {
    let url = Url::parse(raw).map_err(|source| FetchError::InvalidUrl {
        url: raw.to_owned(),
        source,
    })?;
    if url.origin() != base.origin() {
        return Err(FetchError::ForeignUrl(raw.to_owned()));
    }
    // A leftover leading slash would make the path scheme-relative
    // (`//other.host/...`) or root-relative once joined back onto the base.
    let Some(path) = url
        .path()
        .strip_prefix(base.path())
        .filter(|path| !path.starts_with('/'))
    else {
        return Err(FetchError::ForeignUrl(raw.to_owned()));
    };

    let mut relative = path.to_owned();
    if let Some(query) = url.query() {
        relative.push('?');
        relative.push_str(query);
    }
    Ok(relative)
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("GitHub API request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("refusing to call {0:?}: not on the configured API host")]
    ForeignUrl(String),
    #[error("notification has no subject url")]
    MissingSubjectUrl,
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl Retriable for FetchError {
    fn is_transient(&self) -> bool {
        let FetchError::Http(err) = self else {
            return false;
        };
        if err.is_timeout() || err.is_connect() {
            return true;
        }
        err.status().is_some_and(|status| {
            status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
        })
    }
}

// -------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------
