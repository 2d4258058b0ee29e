//! Purpose: Explicit client configuration (credentials, endpoint, retry and validation policy).
//! Exports: `ClientConfig`, `DEFAULT_GRAPH_ENDPOINT`, environment variable names.
//! Role: Owned by one `GraphClient`; replaces process-wide credential state.
//! Invariants: `graph_endpoint` is http(s), has no path, query or fragment.
//! Invariants: Debug output never reveals the app secret or the access token.
#![allow(clippy::result_large_err)]

use std::fmt;

use url::Url;

use super::ApiResult;
use super::retry::RetryPolicy;
use crate::core::error::{Error, ErrorKind};
use crate::core::validate::{CollectionMatch, Validator};

pub const DEFAULT_GRAPH_ENDPOINT: &str = "https://graph.facebook.com";

pub const ENV_APP_ID: &str = "ADGRAPH_APP_ID";
pub const ENV_APP_SECRET: &str = "ADGRAPH_APP_SECRET";
pub const ENV_ACCESS_TOKEN: &str = "ADGRAPH_ACCESS_TOKEN";
pub const ENV_GRAPH_URL: &str = "ADGRAPH_GRAPH_URL";

#[derive(Clone, PartialEq)]
pub struct ClientConfig {
    app_id: Option<String>,
    app_secret: Option<String>,
    access_token: Option<String>,
    graph_endpoint: Url,
    retry: RetryPolicy,
    collection_match: CollectionMatch,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self {
            app_id: None,
            app_secret: None,
            access_token: None,
            graph_endpoint: default_endpoint(),
            retry: RetryPolicy::default(),
            collection_match: CollectionMatch::default(),
        }
    }

    /// Reads `ADGRAPH_*` variables from the process environment.
    pub fn from_env() -> ApiResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from any variable source; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> ApiResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let mut config = Self::new();
        config.app_id = read(ENV_APP_ID);
        config.app_secret = read(ENV_APP_SECRET);
        config.access_token = read(ENV_ACCESS_TOKEN);
        if let Some(endpoint) = read(ENV_GRAPH_URL) {
            config = config.with_graph_endpoint(endpoint)?;
        }
        Ok(config)
    }

    pub fn with_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    pub fn with_app_secret(mut self, app_secret: impl Into<String>) -> Self {
        self.app_secret = Some(app_secret.into());
        self
    }

    pub fn with_access_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(access_token.into());
        self
    }

    pub fn with_graph_endpoint(mut self, endpoint: impl Into<String>) -> ApiResult<Self> {
        self.graph_endpoint = normalize_endpoint(endpoint.into())?;
        Ok(self)
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_collection_match(mut self, collection_match: CollectionMatch) -> Self {
        self.collection_match = collection_match;
        self
    }

    pub fn app_id(&self) -> Option<&str> {
        self.app_id.as_deref()
    }

    pub fn app_secret(&self) -> Option<&str> {
        self.app_secret.as_deref()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn graph_endpoint(&self) -> &Url {
        &self.graph_endpoint
    }

    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }

    pub fn collection_match(&self) -> CollectionMatch {
        self.collection_match
    }

    pub fn validator(&self) -> Validator {
        Validator::new(self.collection_match)
    }

    pub(crate) fn set_access_token(&mut self, access_token: String) {
        self.access_token = Some(access_token);
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("ClientConfig")
            .field("app_id", &self.app_id)
            .field("app_secret", &redact(&self.app_secret))
            .field("access_token", &redact(&self.access_token))
            .field("graph_endpoint", &self.graph_endpoint.as_str())
            .field("retry", &self.retry)
            .field("collection_match", &self.collection_match)
            .finish()
    }
}

fn default_endpoint() -> Url {
    Url::parse(DEFAULT_GRAPH_ENDPOINT).unwrap_or_else(|_| unreachable!("default endpoint parses"))
}

fn normalize_endpoint(raw: String) -> ApiResult<Url> {
    let mut url = Url::parse(raw.trim()).map_err(|err| {
        Error::new(ErrorKind::Configuration)
            .with_message("invalid graph endpoint url")
            .with_value(raw.clone())
            .with_source(err)
    })?;
    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(Error::new(ErrorKind::Configuration)
            .with_message("graph endpoint must use http or https scheme")
            .with_value(raw));
    }
    if url.path() != "/" && !url.path().is_empty() {
        return Err(Error::new(ErrorKind::Configuration)
            .with_message("graph endpoint must not include a path")
            .with_value(raw)
            .with_hint("Put any API version in the resource path instead."));
    }
    url.set_path("/");
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::{ClientConfig, ENV_ACCESS_TOKEN, ENV_APP_ID, ENV_GRAPH_URL};
    use crate::core::error::ErrorKind;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn defaults_point_at_the_public_graph() {
        let config = ClientConfig::new();
        assert_eq!(config.graph_endpoint().as_str(), "https://graph.facebook.com/");
        assert_eq!(config.retry().attempts(), 2);
        assert!(config.access_token().is_none());
    }

    #[test]
    fn lookup_reads_credentials_and_skips_blank_values() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_APP_ID, "123"),
            (ENV_ACCESS_TOKEN, "  "),
            (ENV_GRAPH_URL, "http://127.0.0.1:9000"),
        ]))
        .expect("config");
        assert_eq!(config.app_id(), Some("123"));
        assert!(config.access_token().is_none());
        assert_eq!(config.graph_endpoint().as_str(), "http://127.0.0.1:9000/");
    }

    #[test]
    fn endpoints_with_paths_or_odd_schemes_are_rejected() {
        let err = ClientConfig::new()
            .with_graph_endpoint("https://graph.facebook.com/v2.0")
            .expect_err("path");
        assert_eq!(err.kind(), ErrorKind::Configuration);
        let err = ClientConfig::new()
            .with_graph_endpoint("ftp://graph.facebook.com")
            .expect_err("scheme");
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = ClientConfig::new()
            .with_app_secret("s3cret")
            .with_access_token("tok3n");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("s3cret"));
        assert!(!rendered.contains("tok3n"));
        assert!(rendered.contains("<redacted>"));
    }
}
