//! The worker handle: lifecycle plus routing.

use std::sync::Arc;

use offline_core::{AppConfig, CacheStore, Error, FetchRequest, Network};
use url::Url;

use crate::classify::RequestClass;
use crate::lifecycle::{ActivateReport, InstallReport, Lifecycle, LifecycleState};
use crate::manifest::Manifest;
use crate::router::{FetchRouter, RouteOutcome};
use crate::version::VersionRegistry;

/// One deployed version of the offline agent.
///
/// Requests are only intercepted once the worker is activated; before that
/// every request passes through.
pub struct OfflineWorker<S: ?Sized, N: ?Sized> {
    store: Arc<S>,
    origin: Url,
    lifecycle: Lifecycle<S, N>,
    router: FetchRouter<S, N>,
}

impl<S, N> OfflineWorker<S, N>
where
    S: CacheStore + ?Sized + 'static,
    N: Network + ?Sized,
{
    pub fn new(
        store: Arc<S>, network: Arc<N>, registry: VersionRegistry, manifest: Manifest, origin: Url,
    ) -> Result<Self, Error> {
        manifest.validate()?;
        let offline_url = manifest.offline_url(&origin)?;

        Ok(Self {
            router: FetchRouter::new(
                Arc::clone(&store),
                Arc::clone(&network),
                registry.clone(),
                origin.clone(),
                offline_url,
            ),
            lifecycle: Lifecycle::new(Arc::clone(&store), network, registry, manifest, origin.clone()),
            store,
            origin,
        })
    }

    pub fn from_config(config: &AppConfig, store: Arc<S>, network: Arc<N>) -> Result<Self, Error> {
        let origin = Url::parse(&config.origin).map_err(|e| Error::InvalidUrl(format!("{}: {e}", config.origin)))?;
        Self::new(
            store,
            network,
            VersionRegistry::new(config.app_version.clone()),
            Manifest::from_config(config),
            origin,
        )
    }

    pub fn registry(&self) -> &VersionRegistry {
        self.lifecycle.registry()
    }

    pub fn manifest(&self) -> &Manifest {
        self.lifecycle.manifest()
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub async fn state(&self) -> LifecycleState {
        self.lifecycle.state().await
    }

    pub async fn install(&self) -> Result<InstallReport, Error> {
        self.lifecycle.install().await
    }

    pub async fn activate(&self) -> Result<ActivateReport, Error> {
        self.lifecycle.activate().await
    }

    pub fn classify(&self, request: &FetchRequest) -> RequestClass {
        self.router.classify(request)
    }

    /// Handle one intercepted request.
    pub async fn handle_fetch(&self, request: &FetchRequest) -> Result<RouteOutcome, Error> {
        if self.lifecycle.state().await != LifecycleState::Activated {
            tracing::debug!(url = %request.url, "not controlling clients yet; passing through");
            return Ok(RouteOutcome::Passthrough);
        }
        self.router.route(request).await
    }

    /// Wait for background cache writes to land.
    pub async fn flush(&self) {
        self.router.flush().await;
    }
}
