//! worker_fetch tool implementation.
//!
//! Routes one request through the worker exactly as an intercepted page
//! request would be, and reports what the worker decided.

use std::collections::BTreeMap;

use offline_client::canonicalize;
use offline_core::{CacheStore, Error, FetchRequest, Method, Network};
use offline_worker::{OfflineWorker, RequestClass, RouteOutcome};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{ResponseOut, json_result};

/// Input parameters for the worker_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerFetchParams {
    /// Absolute URL of the request.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Request headers forwarded to the network.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

fn default_method() -> String {
    "GET".into()
}

/// Output structure for the worker_fetch tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct WorkerFetchOutput {
    /// "respond" when the worker produced a response, "passthrough" when the
    /// host should handle the request itself.
    pub disposition: String,
    pub class: RequestClass,
    pub response: Option<ResponseOut>,
}

pub async fn fetch_impl<S, N>(worker: &OfflineWorker<S, N>, params: WorkerFetchParams) -> Result<CallToolResult, McpError>
where
    S: CacheStore + ?Sized + 'static,
    N: Network + ?Sized,
{
    if params.url.trim().is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()).into());
    }

    let method: Method = params.method.parse()?;
    let url = canonicalize(&params.url).map_err(|e| Error::InvalidUrl(format!("{}: {e}", params.url)))?;
    let mut request = FetchRequest::get(url).with_method(method);
    request.headers.extend(params.headers);

    let class = worker.classify(&request);
    let outcome = worker.handle_fetch(&request).await?;

    let output = match outcome {
        RouteOutcome::Passthrough => WorkerFetchOutput { disposition: "passthrough".into(), class, response: None },
        RouteOutcome::Respond(response) => WorkerFetchOutput {
            disposition: "respond".into(),
            class,
            response: Some(ResponseOut::from(&response)),
        },
    };

    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{ORIGIN, TestWorker, output, worker};
    use serde_json::Value;

    fn params(path: &str) -> WorkerFetchParams {
        WorkerFetchParams { url: format!("{ORIGIN}{path}"), method: default_method(), headers: BTreeMap::new() }
    }

    async fn active_worker() -> (std::sync::Arc<crate::tools::testing::TableNetwork>, TestWorker) {
        let (network, worker) = worker().await;
        worker.install().await.unwrap();
        worker.activate().await.unwrap();
        (network, worker)
    }

    #[tokio::test]
    async fn test_fetch_offline_api() {
        let (network, worker) = active_worker().await;
        network.clear();

        let out: Value = output(&fetch_impl(&worker, params("/api/reports")).await.unwrap());
        assert_eq!(out["disposition"], "respond");
        assert_eq!(out["class"], "api");
        assert_eq!(out["response"]["status"], 503);
        assert_eq!(out["response"]["body"], "{\"error\": \"Offline – no network connection\"}");
    }

    #[tokio::test]
    async fn test_fetch_offline_page_fallback() {
        let (network, worker) = active_worker().await;
        network.clear();

        let out: Value = output(&fetch_impl(&worker, params("/reports/9")).await.unwrap());
        assert_eq!(out["class"], "page");
        assert_eq!(out["response"]["body"], "offline");
    }

    #[tokio::test]
    async fn test_fetch_post_passes_through() {
        let (_network, worker) = active_worker().await;
        let p = WorkerFetchParams { method: "post".into(), ..params("/api/reports") };

        let out: Value = output(&fetch_impl(&worker, p).await.unwrap());
        assert_eq!(out["disposition"], "passthrough");
        assert_eq!(out["class"], "ignored");
        assert!(out["response"].is_null());
    }

    #[tokio::test]
    async fn test_fetch_rejects_bad_input() {
        let (_network, worker) = active_worker().await;

        let empty = WorkerFetchParams { url: "  ".into(), ..params("/") };
        assert_eq!(fetch_impl(&worker, empty).await.unwrap_err().code.0, -32602);

        let relative = WorkerFetchParams { url: "/reports".into(), ..params("/") };
        assert_eq!(fetch_impl(&worker, relative).await.unwrap_err().code.0, -32003);
    }

    #[tokio::test]
    async fn test_fetch_uncached_static_offline_is_error() {
        let (network, worker) = active_worker().await;
        network.clear();

        let err = fetch_impl(&worker, params("/static/css/main.css")).await.unwrap_err();
        assert_eq!(err.code.0, -32008);
    }
}
