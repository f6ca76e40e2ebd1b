//! SQLite-backed, namespaced response cache.
//!
//! This module provides the persistent store behind the offline agent using
//! SQLite with async access via tokio-rusqlite. It supports:
//!
//! - Named namespaces, one per cache generation
//! - Entries keyed by a SHA-256 digest of the request identity
//! - Atomic bulk insertion for strict pre-caching
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod namespaces;
pub mod store;

pub use crate::Error;

pub use connection::CacheDb;
pub use namespaces::NamespaceSummary;
pub use store::CacheStore;
