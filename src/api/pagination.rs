//! Purpose: Page envelopes and next-page cursors for Graph collection endpoints.
//! Exports: `PageEnvelope`, `Paging`, `PageCursor`, `parse_next_page`, `limit_of`.
//! Role: Pure helpers driven by `GraphClient::get_all`.
//! Invariants: A page without a `data` array is a decode failure, never an empty page.
//! Invariants: Rebuilt cursor params keep the first value of each query key and
//! never carry `access_token` (the client appends its own).
#![allow(clippy::result_large_err)]

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use super::{ApiResult, Params};
use crate::core::error::{Error, ErrorKind};

pub(crate) const ACCESS_TOKEN_PARAM: &str = "access_token";
pub const LIMIT_PARAM: &str = "limit";
pub const OFFSET_PARAM: &str = "offset";

#[derive(Clone, Debug, Deserialize)]
pub struct PageEnvelope {
    pub data: Vec<Value>,
    #[serde(default)]
    pub paging: Option<Paging>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Paging {
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
}

impl PageEnvelope {
    pub fn from_response(response: Value) -> ApiResult<Self> {
        if response.get("data").is_none() {
            return Err(Error::new(ErrorKind::Decode)
                .with_message("collection response has no data")
                .with_value(truncate(&response.to_string())));
        }
        serde_json::from_value(response).map_err(|err| {
            Error::new(ErrorKind::Decode)
                .with_message("invalid collection page")
                .with_source(err)
        })
    }

    pub fn next_url(&self) -> Option<&str> {
        self.paging.as_ref().and_then(|paging| paging.next.as_deref())
    }

    pub fn next_page(&self) -> ApiResult<Option<PageCursor>> {
        self.next_url().map(parse_next_page).transpose()
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PageCursor {
    resource: String,
    params: Params,
}

impl PageCursor {
    pub fn new(resource: impl Into<String>, params: Params) -> Self {
        Self {
            resource: resource.into(),
            params,
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn params(&self) -> &Params {
        &self.params
    }
}

/// Splits a `paging.next` URL into a resource path and its query params.
///
/// Repeated query keys collapse to their first value.
pub fn parse_next_page(next: &str) -> ApiResult<PageCursor> {
    let url = Url::parse(next).map_err(|err| {
        Error::new(ErrorKind::Decode)
            .with_message("invalid next page url")
            .with_value(next)
            .with_source(err)
    })?;
    let mut params = Params::new();
    for (key, value) in url.query_pairs() {
        if key == ACCESS_TOKEN_PARAM {
            continue;
        }
        params
            .entry(key.into_owned())
            .or_insert_with(|| value.into_owned());
    }
    Ok(PageCursor::new(url.path(), params))
}

/// Result cap requested through `limit`; `0` or absent means unlimited.
pub fn limit_of(params: &Params) -> ApiResult<usize> {
    match params.get(LIMIT_PARAM) {
        None => Ok(0),
        Some(raw) => raw.trim().parse::<usize>().map_err(|err| {
            Error::new(ErrorKind::Argument)
                .with_message("limit must be a non-negative integer")
                .with_field(LIMIT_PARAM)
                .with_value(raw.clone())
                .with_source(err)
        }),
    }
}

fn truncate(raw: &str) -> String {
    const MAX: usize = 200;
    match raw.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &raw[..idx]),
        None => raw.to_string(),
    }
}
