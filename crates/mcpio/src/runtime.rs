//! The protocol runtime tools are attached to.
//!
//! [`Runtime`] is the capability set the handler façade needs from a
//! runtime: construction from a name and version, tool registration, serving
//! a duplex byte stream, and HTTP dispatch. [`McpServer`] implements it on
//! top of the `rmcp` SDK; tests can inject their own implementation through
//! [`with_server`](crate::with_server).

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use async_trait::async_trait;
use rmcp::model::{
    CallToolRequestParams, CallToolResult, ErrorData, JsonObject, ListToolsResult,
    PaginatedRequestParams, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use rmcp::{ServerHandler, ServiceExt};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::{Error, McpErrorExt, Result};
use crate::registry::{ToolRegistry, ToolSet};
use crate::tools::{ToolContext, ToolRegistration, ToolResult};

/// Boxed read half of a duplex transport.
pub type BoxReader = Box<dyn AsyncRead + Send + Unpin>;

/// Boxed write half of a duplex transport.
pub type BoxWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Capabilities the handler façade consumes from a protocol runtime.
#[async_trait]
pub trait Runtime: ToolRegistry {
    /// Constructs a runtime advertising the given implementation info.
    fn from_implementation(name: &str, version: &str) -> Self
    where
        Self: Sized;

    /// Implementation name advertised to clients.
    fn name(&self) -> &str;

    /// Implementation version advertised to clients.
    fn version(&self) -> &str;

    /// Attaches a tool.
    ///
    /// Runtimes decide how to treat conflicting names; [`McpServer`]
    /// rejects them with [`Error::DuplicateTool`].
    fn add_tool(&self, registration: ToolRegistration) -> Result<()>;

    /// Serves the protocol over a duplex byte stream until the peer
    /// disconnects or the exchange fails.
    async fn serve_duplex(&self, reader: BoxReader, writer: BoxWriter) -> Result<()>;

    /// An HTTP router answering streamable-HTTP MCP requests on any path.
    fn http_router(&self) -> axum::Router;
}

/// Conversion into the shared runtime handle a [`Handler`](crate::Handler)
/// holds.
pub trait IntoRuntime: Send + 'static {
    /// Erases the concrete runtime type.
    fn into_runtime(self) -> Arc<dyn Runtime>;
}

impl<R: Runtime + 'static> IntoRuntime for Arc<R> {
    fn into_runtime(self) -> Arc<dyn Runtime> {
        self
    }
}

impl IntoRuntime for Arc<dyn Runtime> {
    fn into_runtime(self) -> Arc<dyn Runtime> {
        self
    }
}

/// MCP server runtime backed by `rmcp`.
///
/// Cheap to clone (Arc internals); clones share the registered tools.
#[derive(Clone)]
pub struct McpServer {
    inner: Arc<ServerInner>,
}

struct ServerInner {
    name: String,
    version: String,
    tools: RwLock<ToolSet>,
}

impl McpServer {
    /// Create a new server advertising `name` and `version`.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ServerInner {
                name: name.into(),
                version: version.into(),
                tools: RwLock::new(ToolSet::new()),
            }),
        }
    }

    /// Server name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Server version.
    pub fn version(&self) -> &str {
        &self.inner.version
    }

    /// Returns `true` if both handles share the same server.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn tool_set(&self) -> RwLockReadGuard<'_, ToolSet> {
        self.inner.tools.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for McpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpServer")
            .field("name", &self.inner.name)
            .field("version", &self.inner.version)
            .field("tools", &self.tool_names())
            .finish()
    }
}

impl ToolRegistry for McpServer {
    fn tools(&self) -> Vec<Tool> {
        self.tool_set().tools()
    }

    fn call(&self, ctx: ToolContext, args: JsonObject) -> Option<ToolResult> {
        self.tool_set().call(ctx, args)
    }

    fn tool_count(&self) -> usize {
        self.tool_set().len()
    }

    fn has_tool(&self, name: &str) -> bool {
        self.tool_set().has_tool(name)
    }
}

#[async_trait]
impl Runtime for McpServer {
    fn from_implementation(name: &str, version: &str) -> Self {
        Self::new(name, version)
    }

    fn name(&self) -> &str {
        &self.inner.name
    }

    fn version(&self) -> &str {
        &self.inner.version
    }

    fn add_tool(&self, registration: ToolRegistration) -> Result<()> {
        let name = registration.name().to_string();
        let mut tools = self.inner.tools.write().unwrap_or_else(PoisonError::into_inner);
        tools.insert(registration)?;
        log::debug!("Registered tool '{name}' on '{}'", self.inner.name);
        Ok(())
    }

    async fn serve_duplex(&self, reader: BoxReader, writer: BoxWriter) -> Result<()> {
        log::info!(
            "Serving '{}' v{} over duplex stream ({} tools)",
            self.inner.name,
            self.inner.version,
            self.tool_count()
        );

        let running = self
            .clone()
            .serve((reader, writer))
            .await
            .map_err(|e| Error::transport(format!("failed to initialize session: {e}")))?;

        let reason = running
            .waiting()
            .await
            .map_err(|e| Error::transport(format!("session task failed: {e}")))?;

        log::info!("Duplex session for '{}' ended: {reason:?}", self.inner.name);
        Ok(())
    }

    fn http_router(&self) -> axum::Router {
        let server = self.clone();
        let service = StreamableHttpService::new(
            move || Ok(server.clone()),
            Arc::new(LocalSessionManager::default()),
            StreamableHttpServerConfig::default(),
        );
        axum::Router::new().fallback_service(service)
    }
}

impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        let mut info = ServerInfo::default();
        info.capabilities = ServerCapabilities::builder().enable_tools().build();
        info.server_info.name = self.inner.name.clone();
        info.server_info.version = self.inner.version.clone();
        info
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult::with_all_items(self.tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> std::result::Result<CallToolResult, ErrorData> {
        let name = request.name.to_string();
        let args = request.arguments.unwrap_or_default();
        let ctx = ToolContext::new(name.as_str(), context.ct.clone());

        match ToolRegistry::call(self, ctx, args) {
            Some(call) => call.await.map_err(|e| e.to_mcp_error()),
            None => {
                log::warn!("Call to unknown tool '{name}'");
                Err(Error::InvalidOperation(name).to_mcp_error())
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
