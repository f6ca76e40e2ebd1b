//! The offline agent itself.
//!
//! This crate decides, per intercepted request, whether to answer from the
//! cache, go to the network, or fall back to a degraded offline response,
//! and it manages the cache generations that back those decisions:
//!
//! - [`VersionRegistry`]: namespace names derived from the app version
//! - [`Manifest`]: URLs pre-cached at install
//! - [`Lifecycle`]: install (strict pre-cache) and activate (prune stale namespaces)
//! - [`FetchRouter`]: classification and the three caching strategies
//! - [`OfflineWorker`]: the two combined behind a single handle

pub mod background;
pub mod classify;
pub mod lifecycle;
pub mod manifest;
pub mod offline;
pub mod router;
pub mod version;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use classify::{RequestClass, classify};
pub use lifecycle::{ActivateReport, InstallReport, Lifecycle, LifecycleState};
pub use manifest::Manifest;
pub use offline::offline_api_response;
pub use router::{FetchRouter, RouteOutcome};
pub use version::VersionRegistry;
pub use worker::OfflineWorker;
