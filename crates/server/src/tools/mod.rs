//! MCP tool implementations.
//!
//! This module contains all tools exposed by the offline agent host.

pub mod cache;
pub mod lifecycle;
pub mod worker_fetch;

#[cfg(test)]
pub(crate) mod testing;

use offline_client::FetchClient;
use offline_core::{CacheDb, Error, ResponseSnapshot};
use offline_worker::OfflineWorker;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The worker as deployed by the binary.
pub type AgentWorker = OfflineWorker<CacheDb, FetchClient>;

/// A response header in tool output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HeaderOut {
    pub name: String,
    pub value: String,
}

/// Response fields shared by tools that return a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResponseOut {
    pub status: u16,
    pub headers: Vec<HeaderOut>,
    /// Body decoded as UTF-8, lossy.
    pub body: String,
    pub body_bytes: usize,
}

impl From<&ResponseSnapshot> for ResponseOut {
    fn from(snapshot: &ResponseSnapshot) -> Self {
        Self {
            status: snapshot.status,
            headers: snapshot
                .headers
                .iter()
                .map(|(name, value)| HeaderOut { name: name.clone(), value: value.clone() })
                .collect(),
            body: String::from_utf8_lossy(&snapshot.body).into_owned(),
            body_bytes: snapshot.body.len(),
        }
    }
}

/// Serialize a tool output as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
