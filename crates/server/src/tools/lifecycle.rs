//! worker_install, worker_activate and worker_status tool implementations.

use offline_core::{CacheStore, Network};
use offline_worker::{LifecycleState, OfflineWorker};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::Serialize;

use super::json_result;

/// Output from the worker_status tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct WorkerStatusOutput {
    pub version: String,
    pub state: LifecycleState,
    pub origin: String,
    pub static_namespace: String,
    pub pages_namespace: String,
    pub offline_page: String,
}

/// Run the install event: strict pre-cache of both manifests.
pub async fn install_impl<S, N>(worker: &OfflineWorker<S, N>) -> Result<CallToolResult, McpError>
where
    S: CacheStore + ?Sized + 'static,
    N: Network + ?Sized,
{
    let report = worker.install().await?;
    json_result(&report)
}

/// Run the activate event: prune stale namespaces and claim clients.
pub async fn activate_impl<S, N>(worker: &OfflineWorker<S, N>) -> Result<CallToolResult, McpError>
where
    S: CacheStore + ?Sized + 'static,
    N: Network + ?Sized,
{
    let report = worker.activate().await?;
    json_result(&report)
}

pub async fn status_impl<S, N>(worker: &OfflineWorker<S, N>) -> Result<CallToolResult, McpError>
where
    S: CacheStore + ?Sized + 'static,
    N: Network + ?Sized,
{
    let registry = worker.registry();
    let output = WorkerStatusOutput {
        version: registry.version().to_string(),
        state: worker.state().await,
        origin: worker.origin().to_string(),
        static_namespace: registry.static_namespace().to_string(),
        pages_namespace: registry.pages_namespace().to_string(),
        offline_page: worker.manifest().offline_page.clone(),
    };
    json_result(&output)
}
