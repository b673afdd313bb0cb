//! The handler façade.
//!
//! [`Handler::new`] applies configuration steps, builds or adopts a runtime,
//! replays the collected tool registrations against it in order, and returns
//! an immutable handler that can serve HTTP, server-push streams, and duplex
//! stdio exchanges.

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use tokio::io::{AsyncRead, AsyncWrite};
use tower::ServiceExt;

use crate::error::Result;
use crate::options::{HandlerConfig, HandlerOption};
use crate::runtime::{McpServer, Runtime};

/// An assembled MCP handler.
///
/// Holds no mutable state of its own; clones share the runtime.
#[derive(Clone)]
pub struct Handler {
    server: Arc<dyn Runtime>,
    router: axum::Router,
}

impl Handler {
    /// Builds a handler from configuration steps applied in order.
    ///
    /// Fails with the first step's error, or with the runtime's error if it
    /// refuses a tool registration. No handler is returned on failure.
    pub fn new<I>(options: I) -> Result<Self>
    where
        I: IntoIterator<Item = HandlerOption>,
    {
        let HandlerConfig {
            name,
            version,
            server,
            tools,
        } = HandlerConfig::new().apply(options)?;

        let server: Arc<dyn Runtime> = match server {
            Some(server) => server,
            None => Arc::new(McpServer::from_implementation(&name, &version)),
        };

        for registration in tools {
            server.add_tool(registration)?;
        }

        log::debug!("Handler ready with {} tools", server.tool_count());
        let router = server.http_router();
        Ok(Self { server, router })
    }

    /// The underlying runtime, for advanced use.
    ///
    /// Reports the advertised identity through [`Runtime::name`] and
    /// [`Runtime::version`]; pass it to [`with_server`](crate::with_server)
    /// to share it with another handler.
    pub fn server(&self) -> &Arc<dyn Runtime> {
        &self.server
    }

    /// The streamable-HTTP router, for mounting into a larger axum app.
    pub fn router(&self) -> axum::Router {
        self.router.clone()
    }

    /// Answers one HTTP request/response exchange.
    pub async fn serve_http(&self, request: Request<Body>) -> Response {
        match self.router.clone().oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        }
    }

    /// Answers a server-push stream request.
    ///
    /// The runtime picks SSE or plain JSON bodies per request, so this is
    /// the same exchange as [`serve_http`](Self::serve_http).
    pub async fn serve_sse(&self, request: Request<Body>) -> Response {
        self.serve_http(request).await
    }

    /// Serves newline-delimited JSON-RPC over `reader`/`writer` until the
    /// peer disconnects.
    ///
    /// There is no built-in cancellation; close the streams to stop it.
    pub async fn serve_stdio<R, W>(&self, reader: R, writer: W) -> Result<()>
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        self.server
            .serve_duplex(Box::new(reader), Box::new(writer))
            .await
    }

    /// Serves over the process's stdin and stdout.
    pub async fn serve_process_stdio(&self) -> Result<()> {
        let (stdin, stdout) = rmcp::transport::stdio();
        self.serve_stdio(stdin, stdout).await
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler")
            .field("name", &self.server.name())
            .field("version", &self.server.version())
            .field("tools", &self.server.tool_names())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
