//! Purpose: Graph API client: token-bearing GET/POST/DELETE, pagination, token exchange,
//! and typed reads/writes of ad resources.
//! Exports: `GraphClient`, `clean_params`.
//! Role: The only component that talks to a `Transport`.
//! Invariants: Every GET/POST/DELETE URL carries the configured `access_token`;
//! a missing token is a `Configuration` error before any I/O.
//! Invariants: Request URLs keep the endpoint scheme and host; the resource only sets the path.
//! Invariants: GET retries an `error` payload per `RetryPolicy`; POST never retries.
//! Invariants: `get_all` aborts on the first failing page; no partial results escape.
//! Notes: Tokens are never logged.
#![allow(clippy::result_large_err)]

use std::collections::BTreeMap;
use std::fmt::Display;

use serde_json::Value;
use url::Url;

use super::config::ClientConfig;
use super::pagination::{ACCESS_TOKEN_PARAM, PageCursor, PageEnvelope, limit_of};
use super::retry::{Sleeper, ThreadSleeper};
use super::transport::{HttpTransport, Transport};
use super::{ApiResult, Params};
use crate::core::error::{Error, ErrorKind};
use crate::core::validate::Validator;
use crate::core::value::FieldValue;
use crate::models::{AnyModel, ResourceKind};

const EXCHANGE_PATH: &str = "/oauth/access_token";

pub struct GraphClient<T = HttpTransport, S = ThreadSleeper> {
    config: ClientConfig,
    transport: T,
    sleeper: S,
}

impl GraphClient {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, HttpTransport::new())
    }
}

impl<T: Transport> GraphClient<T, ThreadSleeper> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            sleeper: ThreadSleeper,
        }
    }
}

impl<T: Transport, S: Sleeper> GraphClient<T, S> {
    pub fn with_sleeper<S2: Sleeper>(self, sleeper: S2) -> GraphClient<T, S2> {
        GraphClient {
            config: self.config,
            transport: self.transport,
            sleeper,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    pub fn access_token(&self) -> Option<&str> {
        self.config.access_token()
    }

    pub fn set_access_token(&mut self, token: impl Into<String>) {
        self.config.set_access_token(token.into());
    }

    pub fn validator(&self) -> Validator {
        self.config.validator()
    }

    /// GETs `resource` with `params`; an `error` payload is retried once before failing.
    pub fn get(&self, resource: &str, params: &Params) -> ApiResult<Value> {
        let url = self.request_url(resource, params)?;
        let policy = self.config.retry();
        let mut attempt = 1;
        loop {
            tracing::debug!(resource, attempt, "graph get");
            let response = self.transport.get_json(&url)?;
            let Some(payload) = error_payload(&response) else {
                return Ok(response);
            };
            if attempt >= policy.attempts() {
                return Err(remote_error(payload.clone()).with_hint(format!(
                    "GET {resource} failed after {attempt} attempt(s)"
                )));
            }
            tracing::warn!(
                resource,
                attempt,
                delay_ms = policy.delay().as_millis() as u64,
                "graph returned an error payload; retrying"
            );
            self.sleeper.sleep(policy.delay());
            attempt += 1;
        }
    }

    /// POSTs a url-encoded form. Responses that are not objects (a bare `true`) are success.
    pub fn post(&self, resource: &str, form: &Params) -> ApiResult<Value> {
        let url = self.request_url(resource, &Params::new())?;
        tracing::debug!(resource, fields = form.len(), "graph post");
        let response = self.transport.post_form(&url, form)?;
        if let Some(payload) = error_payload(&response) {
            return Err(remote_error(payload.clone()));
        }
        Ok(response)
    }

    pub fn delete(&self, resource: &str, body: &str, content_type: &str) -> ApiResult<String> {
        let url = self.request_url(resource, &Params::new())?;
        tracing::debug!(resource, "graph delete");
        self.transport.delete(&url, body, content_type)
    }

    /// Follows `paging.next` until the cursor runs out or `limit` items are collected.
    pub fn get_all(&self, resource: &str, params: &Params) -> ApiResult<Vec<Value>> {
        let limit = limit_of(params)?;
        let mut cursor = PageCursor::new(resource, params.clone());
        let mut items = Vec::new();
        let mut page = 0usize;
        loop {
            let response = self.get(cursor.resource(), cursor.params())?;
            let mut envelope = PageEnvelope::from_response(response)?;
            page += 1;
            tracing::debug!(
                resource = cursor.resource(),
                page,
                items = envelope.data.len(),
                "fetched page"
            );
            items.append(&mut envelope.data);
            if limit > 0 && items.len() >= limit {
                items.truncate(limit);
                return Ok(items);
            }
            match envelope.next_page()? {
                Some(next) => cursor = next,
                None => return Ok(items),
            }
        }
    }

    /// Exchanges the current token for a new one and keeps it.
    pub fn exchange_token(&mut self) -> ApiResult<String> {
        let token = self.request_exchange()?;
        self.config.set_access_token(token.clone());
        Ok(token)
    }

    /// Like `exchange_token`, but returns a new config and leaves this client untouched.
    pub fn refreshed_config(&self) -> ApiResult<ClientConfig> {
        let token = self.request_exchange()?;
        Ok(self.config.clone().with_access_token(token))
    }

    /// Every `kind` under `container_id`, e.g. `/act_1/adcampaigns`.
    pub fn get_list(
        &self,
        container_id: &str,
        kind: ResourceKind,
        params: &Params,
    ) -> ApiResult<Vec<AnyModel>> {
        let resource = format!("/{}/{}", node_id(container_id)?, kind.collection());
        self.get_all(&resource, params)?
            .iter()
            .map(|item| self.instantiate(kind, item))
            .collect()
    }

    pub fn get_many<I: Display>(&self, ids: &[I], kind: ResourceKind) -> ApiResult<Vec<AnyModel>> {
        if ids.is_empty() {
            return Err(Error::new(ErrorKind::Argument).with_message("A list of ids is required"));
        }
        let joined = ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let mut params = Params::new();
        params.insert("ids".to_string(), joined);
        let response = self.get("", &params)?;
        let Value::Object(by_id) = response else {
            return Err(Error::new(ErrorKind::Decode)
                .with_message("ids response must be an object keyed by id"));
        };
        by_id
            .values()
            .map(|item| self.instantiate(kind, item))
            .collect()
    }

    pub fn get_one(&self, id: &str, kind: ResourceKind) -> ApiResult<AnyModel> {
        let response = self.get(&format!("/{}", node_id(id)?), &Params::new())?;
        self.instantiate(kind, &response)
    }

    /// Validates `fields` as a `kind`, POSTs them to `/act_{account_id}/{collection}`,
    /// and returns the model with the id assigned by the server.
    pub fn create(
        &self,
        kind: ResourceKind,
        account_id: &str,
        fields: BTreeMap<String, FieldValue>,
    ) -> ApiResult<AnyModel> {
        if account_id.trim().is_empty() {
            return Err(Error::new(ErrorKind::Argument)
                .with_message("An account_id is required to make the request!"));
        }
        let account = account_node(node_id(account_id)?);
        let form = form_params(&fields);
        let mut model = kind.instantiate_values(fields, self.validator())?;
        let resource = format!("/{}/{}", account, kind.collection());
        let response = self.post(&resource, &form)?;
        if let Some(id) = response.get("id")
            && kind.schema().field("id").is_some()
        {
            model.record_mut().set("id", FieldValue::from_json(id))?;
        }
        Ok(model)
    }

    /// POSTs `fields` to `/{id}`; the raw response is returned (usually `true`).
    pub fn update(&self, id: &str, fields: &BTreeMap<String, FieldValue>) -> ApiResult<Value> {
        self.post(&format!("/{}", node_id(id)?), &form_params(fields))
    }

    pub fn instantiate(&self, kind: ResourceKind, item: &Value) -> ApiResult<AnyModel> {
        match item {
            Value::Object(map) => kind.instantiate_with(map, self.validator()),
            other => Err(Error::new(ErrorKind::Decode)
                .with_message(format!("{kind} payload must be an object"))
                .with_value(other.to_string())),
        }
    }

    fn request_exchange(&self) -> ApiResult<String> {
        let (Some(app_id), Some(app_secret), Some(token)) = (
            self.config.app_id(),
            self.config.app_secret(),
            self.config.access_token(),
        ) else {
            return Err(Error::new(ErrorKind::Configuration)
                .with_message(
                    "Must set app_id, app_secret and access_token before calling exchange_token",
                )
                .with_hint("Set ADGRAPH_APP_ID, ADGRAPH_APP_SECRET and ADGRAPH_ACCESS_TOKEN."));
        };
        let mut params = Params::new();
        params.insert("client_id".to_string(), app_id.to_string());
        params.insert("client_secret".to_string(), app_secret.to_string());
        params.insert("grant_type".to_string(), "fb_exchange_token".to_string());
        params.insert("fb_exchange_token".to_string(), token.to_string());
        let response = self.get(EXCHANGE_PATH, &params)?;
        exchanged_token(&response)
    }

    fn request_url(&self, resource: &str, params: &Params) -> ApiResult<Url> {
        let token = self.config.access_token().ok_or_else(|| {
            Error::new(ErrorKind::Configuration)
                .with_message("an access token is required")
                .with_hint("Pass --token or set ADGRAPH_ACCESS_TOKEN.")
        })?;
        let path = if resource.starts_with('/') {
            resource.to_string()
        } else {
            format!("/{resource}")
        };
        // `set_path` keeps the endpoint's scheme and host; a leading `//` stays a path.
        let mut url = self.config.graph_endpoint().clone();
        url.set_path(&path);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair(ACCESS_TOKEN_PARAM, token);
            for (key, value) in params {
                if key != ACCESS_TOKEN_PARAM {
                    query.append_pair(key, value);
                }
            }
        }
        Ok(url)
    }
}

/// Drops parameters with empty values unless `keep_empty_strings` is set.
pub fn clean_params(params: Params, keep_empty_strings: bool) -> Params {
    if keep_empty_strings {
        return params;
    }
    params
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .collect()
}

/// A single graph node id; empty ids and ids spanning path segments are rejected.
fn node_id(id: &str) -> ApiResult<&str> {
    let trimmed = id.trim();
    if trimmed.is_empty() || trimmed.contains('/') {
        return Err(Error::new(ErrorKind::Argument)
            .with_message("id must be a single non-empty path segment")
            .with_value(id));
    }
    Ok(trimmed)
}

/// Accepts both `act_123` and a bare `123`.
pub(crate) fn account_node(account_id: &str) -> String {
    let account_id = account_id.trim();
    if account_id.starts_with("act_") {
        account_id.to_string()
    } else {
        format!("act_{account_id}")
    }
}

fn error_payload(response: &Value) -> Option<&Value> {
    response.as_object().and_then(|map| map.get("error"))
}

fn remote_error(payload: Value) -> Error {
    let message = payload
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| payload.as_str().map(str::to_string))
        .unwrap_or_else(|| "graph api returned an error".to_string());
    Error::new(ErrorKind::Remote)
        .with_message(message)
        .with_payload(payload)
}

fn exchanged_token(response: &Value) -> ApiResult<String> {
    let token = response
        .get(ACCESS_TOKEN_PARAM)
        .and_then(Value::as_str)
        .or_else(|| {
            response
                .get(0)
                .and_then(|pair| pair.get(1))
                .and_then(Value::as_str)
        });
    match token {
        Some(token) if !token.is_empty() => Ok(token.to_string()),
        _ => Err(Error::new(ErrorKind::Decode)
            .with_message("token exchange response carried no access token")),
    }
}

fn form_params(fields: &BTreeMap<String, FieldValue>) -> Params {
    fields
        .iter()
        .map(|(key, value)| (key.clone(), form_value(value)))
        .collect()
}

fn form_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Text(text) => text.clone(),
        other => other.to_json().to_string(),
    }
}
