//! Client code for the offline agent.
//!
//! This crate provides the live network side of the agent: a `reqwest`
//! backed implementation of `offline_core::Network` and the URL helpers
//! used to resolve manifests and compare origins.

pub mod fetch;

pub use fetch::{FetchClient, FetchConfig, UrlError, canonicalize, resolve, same_origin};
