//! Purpose: Library crate behind the `adgraph` CLI: a typed client for the Graph ads API.
//! Exports: `core` (values, schemas, validation, records), `models`, `api`.
//! Role: Schema-checked model objects plus a paginating, retrying HTTP client.
//! Invariants: Every model value is validated against its schema at assignment time.
//! Invariants: Network access only happens through an `api::Transport`.
pub mod api;
pub mod core;
pub mod models;
