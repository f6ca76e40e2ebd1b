//! Cache-related MCP tools.
//!
//! This module provides read-only views over the namespaced response cache.

pub mod get;
pub mod keys;

pub use get::{CacheGetParams, get_impl};
pub use keys::{CacheKeysParams, keys_impl};
