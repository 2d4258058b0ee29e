//! Purpose: Public client surface for the Graph ads API.
//! Exports: `GraphClient`, `ClientConfig`, transport and retry seams, pagination helpers,
//! per-resource finder views.
//! Role: Everything that performs or shapes HTTP requests lives under this module.
//! Invariants: Library code reaches the network only through a `Transport`.

use std::collections::BTreeMap;

mod client;
mod config;
mod pagination;
mod resources;
mod retry;
mod transport;

pub use crate::core::error::{Error, ErrorKind, to_exit_code};
pub use client::{GraphClient, clean_params};
pub use config::{
    ClientConfig, DEFAULT_GRAPH_ENDPOINT, ENV_ACCESS_TOKEN, ENV_APP_ID, ENV_APP_SECRET,
    ENV_GRAPH_URL,
};
pub use pagination::{PageCursor, PageEnvelope, Paging, limit_of, parse_next_page};
pub use resources::{
    AdAccountApi, AdCampaignApi, AdCreativeApi, AdGroupApi, AdStatisticApi, AdUserApi,
    BroadTargetingCategoryApi, ListOptions,
};
pub use retry::{RetryPolicy, Sleeper, ThreadSleeper};
pub use transport::{FORM_CONTENT_TYPE, HttpTransport, JSON_CONTENT_TYPE, Transport};

/// Query or form parameters; ordered so request URLs are deterministic.
pub type Params = BTreeMap<String, String>;

pub type ApiResult<T> = Result<T, Error>;
