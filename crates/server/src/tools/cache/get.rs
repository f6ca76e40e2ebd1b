//! cache_get tool implementation.
//!
//! Retrieves one stored response by namespace and request URL.

use offline_client::canonicalize;
use offline_core::{CacheDb, Error, FetchRequest, Method};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::{ResponseOut, json_result};

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Namespace to read from, e.g. "pages-v1.0.0".
    pub namespace: String,

    /// Absolute URL of the stored request.
    pub url: String,

    /// Method of the stored request (default: GET).
    #[serde(default)]
    pub method: Option<String>,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    pub namespace: String,
    pub url: String,
    pub response: ResponseOut,
}

/// Implementation of the cache_get tool.
pub async fn get_impl(cache: &CacheDb, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    if params.namespace.trim().is_empty() {
        return Err(Error::InvalidInput("namespace cannot be empty".into()).into());
    }

    let method: Method = params.method.as_deref().unwrap_or("GET").parse()?;
    let url = canonicalize(&params.url).map_err(|e| Error::InvalidUrl(format!("{}: {e}", params.url)))?;
    let key = FetchRequest::get(url).with_method(method).key();

    let snapshot = cache
        .get_entry(&params.namespace, &key)
        .await?
        .ok_or_else(|| Error::CacheMiss(format!("{} {} {}", params.namespace, key.method, key.url)))?;

    let output = CacheGetOutput { namespace: params.namespace, url: key.url, response: ResponseOut::from(&snapshot) };
    json_result(&output)
}
