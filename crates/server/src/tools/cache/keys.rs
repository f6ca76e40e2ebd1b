//! cache_keys tool implementation.

use offline_core::{CacheDb, Error, NamespaceSummary};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Parameters for the cache_keys tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheKeysParams {
    /// When set, also list the stored URLs of this namespace.
    #[serde(default)]
    pub namespace: Option<String>,
}

/// Output from the cache_keys tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheKeysOutput {
    /// Every namespace with its entry count, oldest first.
    pub namespaces: Vec<NamespaceSummary>,
    /// Namespaces owned by the running version.
    pub current: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urls: Option<Vec<String>>,
}

/// Implementation of the cache_keys tool.
pub async fn keys_impl(cache: &CacheDb, current: [&str; 2], params: CacheKeysParams) -> Result<CallToolResult, McpError> {
    let namespaces = cache.summarize_namespaces().await?;

    let urls = match params.namespace.as_deref() {
        Some(name) => {
            if !cache.has_namespace(name).await? {
                return Err(Error::CacheMiss(format!("namespace {name}")).into());
            }
            Some(cache.entry_urls(name).await?)
        }
        None => None,
    };

    let output = CacheKeysOutput { namespaces, current: current.iter().map(|s| s.to_string()).collect(), urls };
    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{ORIGIN, output, worker};

    #[tokio::test]
    async fn test_keys_empty() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let out: CacheKeysOutput =
            output(&keys_impl(&cache, ["static-v1.0.0", "pages-v1.0.0"], CacheKeysParams::default()).await.unwrap());

        assert!(out.namespaces.is_empty());
        assert_eq!(out.current, vec!["static-v1.0.0", "pages-v1.0.0"]);
        assert!(out.urls.is_none());
    }

    #[tokio::test]
    async fn test_keys_after_install() {
        let (_network, worker) = worker().await;
        worker.install().await.unwrap();
        let current = worker.registry().current();

        let params = CacheKeysParams { namespace: Some("pages-v1.0.0".into()) };
        let out: CacheKeysOutput = output(&keys_impl(worker.store(), current, params).await.unwrap());

        let counts: Vec<(String, u64)> = out.namespaces.iter().map(|n| (n.name.clone(), n.entries)).collect();
        assert!(counts.contains(&("static-v1.0.0".to_string(), 3)));
        assert!(counts.contains(&("pages-v1.0.0".to_string(), 2)));
        assert_eq!(out.urls.unwrap(), vec![format!("{ORIGIN}/"), format!("{ORIGIN}/offline")]);
    }

    #[tokio::test]
    async fn test_keys_unknown_namespace() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let params = CacheKeysParams { namespace: Some("pages-v0.1.0".into()) };

        let err = keys_impl(&cache, ["static-v1.0.0", "pages-v1.0.0"], params).await.unwrap_err();
        assert_eq!(err.code.0, -32001);
    }
}
