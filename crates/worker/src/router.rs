//! Per-request routing.
//!
//! | Class          | Strategy                                                   |
//! |----------------|------------------------------------------------------------|
//! | `Ignored`      | pass through untouched                                     |
//! | `Api`          | network only; canned 503 JSON when the fetch fails         |
//! | `StaticAsset`  | cache first; fetch on miss, store 2xx before returning     |
//! | `Page`         | network first; store in background; cached copy, then the offline page, when the fetch fails |

use std::sync::Arc;

use offline_core::{CacheStore, Error, FetchRequest, Network, RequestKey, ResponseSnapshot};
use url::Url;

use crate::background::BackgroundWrites;
use crate::classify::{RequestClass, classify};
use crate::offline::offline_api_response;
use crate::version::VersionRegistry;

/// What to do with an intercepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Let the host handle the request as if nothing intercepted it.
    Passthrough,
    /// Answer with this response.
    Respond(ResponseSnapshot),
}

impl RouteOutcome {
    pub fn response(&self) -> Option<&ResponseSnapshot> {
        match self {
            Self::Passthrough => None,
            Self::Respond(response) => Some(response),
        }
    }

    pub fn into_response(self) -> Option<ResponseSnapshot> {
        match self {
            Self::Passthrough => None,
            Self::Respond(response) => Some(response),
        }
    }
}

pub struct FetchRouter<S: ?Sized, N: ?Sized> {
    store: Arc<S>,
    network: Arc<N>,
    registry: VersionRegistry,
    origin: Url,
    offline_key: RequestKey,
    background: BackgroundWrites,
}

impl<S, N> FetchRouter<S, N>
where
    S: CacheStore + ?Sized + 'static,
    N: Network + ?Sized,
{
    pub fn new(store: Arc<S>, network: Arc<N>, registry: VersionRegistry, origin: Url, offline_url: Url) -> Self {
        Self {
            store,
            network,
            registry,
            origin,
            offline_key: FetchRequest::get(offline_url).key(),
            background: BackgroundWrites::new(),
        }
    }

    pub fn classify(&self, request: &FetchRequest) -> RequestClass {
        classify(request, &self.origin)
    }

    /// Route one request.
    ///
    /// Errors only when no response can be produced: a static asset that is
    /// neither cached nor fetchable, or a page with no cached copy and no
    /// cached offline page.
    pub async fn route(&self, request: &FetchRequest) -> Result<RouteOutcome, Error> {
        let class = self.classify(request);
        tracing::debug!(method = %request.method, url = %request.url, class = class.as_str(), "routing");

        let response = match class {
            RequestClass::Ignored => return Ok(RouteOutcome::Passthrough),
            RequestClass::Api => self.network_only(request).await,
            RequestClass::StaticAsset => self.cache_first(request).await?,
            RequestClass::Page => self.network_first(request).await?,
        };
        Ok(RouteOutcome::Respond(response))
    }

    /// Wait for background page writes queued so far.
    pub async fn flush(&self) {
        self.background.flush().await;
    }

    pub fn pending_writes(&self) -> usize {
        self.background.pending()
    }

    async fn network_only(&self, request: &FetchRequest) -> ResponseSnapshot {
        match self.network.fetch(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(url = %request.url, error = %e, "api request failed; answering offline");
                offline_api_response()
            }
        }
    }

    async fn cache_first(&self, request: &FetchRequest) -> Result<ResponseSnapshot, Error> {
        let namespace = self.registry.static_namespace();
        let key = request.key();

        if let Some(cached) = self.lookup(namespace, &key).await {
            tracing::debug!(url = %request.url, "static cache hit");
            return Ok(cached);
        }

        let response = self.network.fetch(request).await?;
        if response.is_success() {
            if let Err(e) = self.store.put(namespace, &key, &response).await {
                tracing::warn!(namespace, key = %key, error = %e, "failed to cache static asset");
            }
        } else {
            tracing::debug!(url = %request.url, status = response.status, "not caching unsuccessful static response");
        }
        Ok(response)
    }

    async fn network_first(&self, request: &FetchRequest) -> Result<ResponseSnapshot, Error> {
        let namespace = self.registry.pages_namespace();
        let key = request.key();

        let failure = match self.network.fetch(request).await {
            Ok(response) => {
                self.store_in_background(namespace, key, response.clone());
                return Ok(response);
            }
            Err(e) => e,
        };

        if let Some(cached) = self.lookup(namespace, &key).await {
            tracing::debug!(url = %request.url, "network failed; serving cached page");
            return Ok(cached);
        }

        if let Some(offline) = self.lookup(namespace, &self.offline_key).await {
            tracing::debug!(url = %request.url, "network failed; serving offline page");
            return Ok(offline);
        }

        tracing::warn!(url = %request.url, "network failed and offline page is not cached");
        Err(failure)
    }

    /// A cache read that fails is treated as a miss.
    async fn lookup(&self, namespace: &str, key: &RequestKey) -> Option<ResponseSnapshot> {
        match self.store.get(namespace, key).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(namespace, key = %key, error = %e, "cache read failed");
                None
            }
        }
    }

    fn store_in_background(&self, namespace: &str, key: RequestKey, snapshot: ResponseSnapshot) {
        let store = Arc::clone(&self.store);
        let namespace = namespace.to_string();
        self.background.spawn(async move {
            if let Err(e) = store.put(&namespace, &key, &snapshot).await {
                tracing::warn!(namespace = %namespace, key = %key, error = %e, "failed to cache page");
            }
        });
    }
}
