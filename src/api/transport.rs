//! Purpose: Narrow HTTP boundary consumed by `GraphClient`.
//! Exports: `Transport`, `HttpTransport`, `FORM_CONTENT_TYPE`.
//! Role: Performs the network call and the raw JSON decode; nothing else.
//! Invariants: Non-2xx responses with a JSON body are returned as values, so the
//! client's `error`-payload handling sees them.
//! Invariants: Only transport failures (network, unreadable body) become `Io` errors.
//! Invariants: Errors never carry the request URL with its `access_token` in clear.
#![allow(clippy::result_large_err)]

use std::time::Duration;

use serde_json::Value;
use url::Url;

use super::pagination::ACCESS_TOKEN_PARAM;
use super::{ApiResult, Params};
use crate::core::error::{Error, ErrorKind};

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
pub const JSON_CONTENT_TYPE: &str = "application/json";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

pub trait Transport {
    fn get_json(&self, url: &Url) -> ApiResult<Value>;

    /// POSTs `form` url-encoded and decodes the JSON response.
    fn post_form(&self, url: &Url, form: &Params) -> ApiResult<Value>;

    /// Sends a DELETE with a raw body; the response text is returned undecoded.
    fn delete(&self, url: &Url, body: &str, content_type: &str) -> ApiResult<String>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get_json(&self, url: &Url) -> ApiResult<Value> {
        (**self).get_json(url)
    }

    fn post_form(&self, url: &Url, form: &Params) -> ApiResult<Value> {
        (**self).post_form(url, form)
    }

    fn delete(&self, url: &Url, body: &str, content_type: &str) -> ApiResult<String> {
        (**self).delete(url, body, content_type)
    }
}

#[derive(Clone)]
pub struct HttpTransport {
    agent: ureq::Agent,
}

impl HttpTransport {
    pub fn new() -> Self {
        let agent = ureq::AgentBuilder::new().timeout(DEFAULT_TIMEOUT).build();
        Self { agent }
    }

    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn get_json(&self, url: &Url) -> ApiResult<Value> {
        let response = self
            .agent
            .get(url.as_str())
            .set("Accept", JSON_CONTENT_TYPE)
            .call();
        match response {
            Ok(resp) => read_json_response(resp),
            Err(ureq::Error::Status(code, resp)) => read_status_response(code, resp),
            Err(ureq::Error::Transport(err)) => Err(transport_error(url, &err)),
        }
    }

    fn post_form(&self, url: &Url, form: &Params) -> ApiResult<Value> {
        let pairs: Vec<(&str, &str)> = form
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect();
        let response = self
            .agent
            .post(url.as_str())
            .set("Accept", JSON_CONTENT_TYPE)
            .send_form(&pairs);
        match response {
            Ok(resp) => read_json_response(resp),
            Err(ureq::Error::Status(code, resp)) => read_status_response(code, resp),
            Err(ureq::Error::Transport(err)) => Err(transport_error(url, &err)),
        }
    }

    fn delete(&self, url: &Url, body: &str, content_type: &str) -> ApiResult<String> {
        let response = self
            .agent
            .request("DELETE", url.as_str())
            .set("Content-Type", content_type)
            .send_string(body);
        let resp = match response {
            Ok(resp) => resp,
            Err(ureq::Error::Status(_, resp)) => resp,
            Err(ureq::Error::Transport(err)) => return Err(transport_error(url, &err)),
        };
        resp.into_string().map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to read response body")
                .with_source(err)
        })
    }
}

// `ureq::Transport` displays the full request URL; keep kind, detail and a redacted URL.
fn transport_error(url: &Url, err: &ureq::Transport) -> Error {
    let message = match err.message() {
        Some(detail) => format!("request failed: {}: {detail}", err.kind()),
        None => format!("request failed: {}", err.kind()),
    };
    Error::new(ErrorKind::Io)
        .with_message(message)
        .with_value(redacted(url).to_string())
}

/// Copy of `url` with every `access_token` value masked.
fn redacted(url: &Url) -> Url {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| {
            let value = if key == ACCESS_TOKEN_PARAM {
                "REDACTED".to_string()
            } else {
                value.into_owned()
            };
            (key.into_owned(), value)
        })
        .collect();
    let mut masked = url.clone();
    if !pairs.is_empty() {
        masked.query_pairs_mut().clear().extend_pairs(pairs);
    }
    masked
}

fn read_json_response(response: ureq::Response) -> ApiResult<Value> {
    let body = response.into_string().map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to read response body")
            .with_source(err)
    })?;
    serde_json::from_str(&body).map_err(|err| {
        Error::new(ErrorKind::Decode)
            .with_message("invalid response json")
            .with_source(err)
    })
}

fn read_status_response(status: u16, response: ureq::Response) -> ApiResult<Value> {
    let body = response.into_string().unwrap_or_default();
    match serde_json::from_str::<Value>(&body) {
        Ok(value) => Ok(value),
        Err(_) => Err(Error::new(ErrorKind::Remote)
            .with_message(format!("graph api returned status {status}"))
            .with_value(body)),
    }
}
