//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the worker and cache tool implementations.
use std::sync::Arc;

use crate::tools::AgentWorker;
use crate::tools::cache::{CacheGetParams, CacheKeysParams, get_impl, keys_impl};
use crate::tools::lifecycle::{activate_impl, install_impl, status_impl};
use crate::tools::worker_fetch::{WorkerFetchParams, fetch_impl};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for the offline agent.
#[derive(Clone)]
pub struct OfflineAgentServer {
    tool_router: ToolRouter<Self>,
    worker: Arc<AgentWorker>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl OfflineAgentServer {
    /// Create a new server handler around a shared worker.
    pub fn new(worker: Arc<AgentWorker>) -> Self {
        Self { tool_router: Self::tool_router(), worker }
    }

    /// Run the install event.
    ///
    /// Pre-caches every static asset and page of the manifest. Any failure aborts the
    /// install and leaves the worker redundant.
    #[tool(description = "Install the current version: pre-cache all static assets and pages. Fails if any URL fails.")]
    async fn worker_install(&self) -> Result<CallToolResult, McpError> {
        install_impl(&self.worker).await
    }

    #[tool(description = "Activate the installed version: delete caches of older versions and claim clients.")]
    async fn worker_activate(&self) -> Result<CallToolResult, McpError> {
        activate_impl(&self.worker).await
    }

    /// Route one request through the worker.
    ///
    /// Returns whether the worker answered or passed the request through, the request
    /// class, and the response when there is one.
    #[tool(
        description = "Route a request through the offline worker. Returns the disposition (respond/passthrough), request class, and response."
    )]
    async fn worker_fetch(&self, params: Parameters<WorkerFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.worker, params.0).await
    }

    #[tool(description = "Report the worker lifecycle state, version and cache namespace names.")]
    async fn worker_status(&self) -> Result<CallToolResult, McpError> {
        status_impl(&self.worker).await
    }

    #[tool(description = "List cache namespaces with entry counts. Optionally list the URLs stored in one namespace.")]
    async fn cache_keys(&self, params: Parameters<CacheKeysParams>) -> Result<CallToolResult, McpError> {
        keys_impl(self.worker.store(), self.worker.registry().current(), params.0).await
    }

    #[tool(description = "Get one cached response by namespace and URL. Returns CACHE_MISS if absent.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(self.worker.store(), params.0).await
    }
}

impl ServerHandler for OfflineAgentServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "offline-agent".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
