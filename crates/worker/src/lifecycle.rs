//! Install and activate.
//!
//! Install pre-caches the manifest all-or-nothing. Activate prunes every
//! namespace that does not belong to the current version and then takes
//! control of already-open clients.

use std::sync::Arc;

use futures_util::future::{join_all, try_join_all};
use offline_core::{CacheStore, Error, FetchRequest, Network, RequestKey, ResponseSnapshot};
use schemars::JsonSchema;
use serde::Serialize;
use tokio::sync::RwLock;
use url::Url;

use crate::manifest::Manifest;
use crate::version::VersionRegistry;

/// Worker lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Not yet installed.
    Parsed,
    Installing,
    /// Pre-cache complete; waiting is skipped so activation may follow at once.
    Installed,
    Activating,
    /// Controlling clients; requests are routed.
    Activated,
    /// Install failed. A new install attempt is allowed.
    Redundant,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parsed => "parsed",
            Self::Installing => "installing",
            Self::Installed => "installed",
            Self::Activating => "activating",
            Self::Activated => "activated",
            Self::Redundant => "redundant",
        }
    }
}

/// Outcome of a successful install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct InstallReport {
    pub version: String,
    pub static_namespace: String,
    pub pages_namespace: String,
    pub static_assets: usize,
    pub pages: usize,
    pub skip_waiting: bool,
}

/// Outcome of activation. Deletion failures are reported, never fatal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, JsonSchema)]
pub struct ActivateReport {
    pub deleted: Vec<String>,
    pub failed: Vec<String>,
    pub kept: Vec<String>,
    pub claimed_clients: bool,
}

type Precached = Vec<(RequestKey, ResponseSnapshot)>;

pub struct Lifecycle<S: ?Sized, N: ?Sized> {
    store: Arc<S>,
    network: Arc<N>,
    registry: VersionRegistry,
    manifest: Manifest,
    origin: Url,
    state: RwLock<LifecycleState>,
}

impl<S, N> Lifecycle<S, N>
where
    S: CacheStore + ?Sized,
    N: Network + ?Sized,
{
    pub fn new(store: Arc<S>, network: Arc<N>, registry: VersionRegistry, manifest: Manifest, origin: Url) -> Self {
        Self { store, network, registry, manifest, origin, state: RwLock::new(LifecycleState::Parsed) }
    }

    pub async fn state(&self) -> LifecycleState {
        *self.state.read().await
    }

    pub fn registry(&self) -> &VersionRegistry {
        &self.registry
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Move to `to` if the current state is one of `from`.
    async fn transition(&self, from: &[LifecycleState], to: LifecycleState) -> Result<(), Error> {
        let mut state = self.state.write().await;
        if !from.contains(&*state) {
            return Err(Error::InvalidState(format!(
                "cannot move from {} to {}",
                state.as_str(),
                to.as_str()
            )));
        }
        *state = to;
        Ok(())
    }

    async fn set_state(&self, to: LifecycleState) {
        *self.state.write().await = to;
    }

    /// Pre-cache both manifests. Any failed or non-2xx fetch fails the whole install.
    pub async fn install(&self) -> Result<InstallReport, Error> {
        self.transition(&[LifecycleState::Parsed, LifecycleState::Redundant], LifecycleState::Installing)
            .await?;
        tracing::info!(version = self.registry.version(), "installing");

        match self.precache().await {
            Ok(report) => {
                self.set_state(LifecycleState::Installed).await;
                tracing::info!(
                    version = self.registry.version(),
                    static_assets = report.static_assets,
                    pages = report.pages,
                    "installed; skipping waiting"
                );
                Ok(report)
            }
            Err(e) => {
                self.set_state(LifecycleState::Redundant).await;
                tracing::error!(version = self.registry.version(), error = %e, "install failed");
                Err(e)
            }
        }
    }

    async fn precache(&self) -> Result<InstallReport, Error> {
        let static_urls = self.manifest.static_urls(&self.origin)?;
        let page_urls = self.manifest.page_urls(&self.origin)?;
        let static_ns = self.registry.static_namespace();
        let pages_ns = self.registry.pages_namespace();

        self.store.open_namespace(static_ns).await?;
        self.store.open_namespace(pages_ns).await?;

        // Nothing is written until every fetch in both manifests has succeeded.
        let (statics, pages) = tokio::try_join!(self.fetch_all(&static_urls), self.fetch_all(&page_urls))?;

        // One transaction per namespace. A failed pages write leaves the static
        // namespace filled for this version; the install still fails.
        self.store.put_all(static_ns, &statics).await?;
        self.store.put_all(pages_ns, &pages).await?;

        Ok(InstallReport {
            version: self.registry.version().to_string(),
            static_namespace: static_ns.to_string(),
            pages_namespace: pages_ns.to_string(),
            static_assets: statics.len(),
            pages: pages.len(),
            skip_waiting: true,
        })
    }

    async fn fetch_all(&self, urls: &[Url]) -> Result<Precached, Error> {
        try_join_all(urls.iter().map(|url| self.fetch_one(url))).await
    }

    async fn fetch_one(&self, url: &Url) -> Result<(RequestKey, ResponseSnapshot), Error> {
        let request = FetchRequest::get(url.clone());
        let response = self
            .network
            .fetch(&request)
            .await
            .map_err(|e| Error::InstallFailed(format!("{url}: {e}")))?;

        if !response.is_success() {
            return Err(Error::InstallFailed(format!("{url} returned {}", response.status)));
        }

        Ok((request.key(), response))
    }

    /// Delete stale namespaces, then claim clients.
    ///
    /// Each deletion is independent: one failure does not stop the others,
    /// and an unreadable namespace list skips pruning without blocking
    /// activation.
    pub async fn activate(&self) -> Result<ActivateReport, Error> {
        self.transition(&[LifecycleState::Installed], LifecycleState::Activating)
            .await?;

        let mut report = ActivateReport::default();
        match self.store.list_namespaces().await {
            Ok(existing) => {
                let stale = self.registry.stale(&existing);
                let results = join_all(stale.iter().map(|name| self.store.delete_namespace(name))).await;

                for (name, result) in stale.into_iter().zip(results) {
                    match result {
                        Ok(_) => {
                            tracing::info!(namespace = name, "deleted stale namespace");
                            report.deleted.push(name.to_string());
                        }
                        Err(e) => {
                            tracing::warn!(namespace = name, error = %e, "failed to delete stale namespace");
                            report.failed.push(name.to_string());
                        }
                    }
                }
                report.kept = existing.into_iter().filter(|n| self.registry.is_current(n)).collect();
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not list namespaces; skipping prune");
            }
        }

        self.set_state(LifecycleState::Activated).await;
        report.claimed_clients = true;
        tracing::info!(
            version = self.registry.version(),
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            "activated; claimed clients"
        );

        Ok(report)
    }
}
