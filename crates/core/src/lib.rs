//! Core types and shared functionality for the offline agent.
//!
//! This crate provides:
//! - HTTP request/response value types
//! - The `CacheStore` and `Network` seams the worker is written against
//! - A namespaced cache implementation with SQLite backend
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod net;

pub use cache::{CacheDb, CacheStore, NamespaceSummary};
pub use config::AppConfig;
pub use error::Error;
pub use http::{FetchRequest, Method, RequestKey, ResponseSnapshot};
pub use net::Network;
