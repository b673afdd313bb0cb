//! Functional-option tool registration for MCP servers.
//!
//! mcpio sits in front of the `rmcp` runtime. A host describes its tools
//! with composable configuration steps; mcpio adapts each tool function to
//! the runtime's calling convention, classifies failures, and hands back a
//! [`Handler`] that serves HTTP, server-push streams, or stdio.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          mcpio                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Handler: serve_http / serve_sse / serve_stdio / server()   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  HandlerOption: with_name, with_version, with_tool,         │
//! │                 with_raw_tool, with_script_tool,            │
//! │                 with_server, with_settings                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ToolRegistration: typed / raw / script adapters            │
//! │  schema: generate_schema, dynamic_schema, object_schema     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Runtime trait: McpServer (rmcp ServerHandler)              │
//! │  ToolRegistry trait: list and dispatch by name              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ToolError: agent-visible failure; Error: everything else   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use mcpio::{Handler, ToolContext, ToolError, with_name, with_tool};
//!
//! #[derive(serde::Deserialize, schemars::JsonSchema)]
//! struct DivideInput { a: f64, b: f64 }
//!
//! #[derive(serde::Serialize, schemars::JsonSchema)]
//! struct DivideOutput { result: f64 }
//!
//! async fn divide(_ctx: ToolContext, input: DivideInput) -> anyhow::Result<DivideOutput> {
//!     if input.b == 0.0 {
//!         return Err(ToolError::new("division by zero").into());
//!     }
//!     Ok(DivideOutput { result: input.a / input.b })
//! }
//!
//! let handler = Handler::new([
//!     with_name("calculator"),
//!     with_tool("divide", "Divide a by b", divide),
//! ])?;
//! handler.serve_process_stdio().await?;
//! ```

pub mod error;
pub mod handler;
pub mod options;
pub mod registry;
pub mod runtime;
pub mod schema;
pub mod settings;
pub mod tools;

// Re-exports — error
pub use error::{Error, McpErrorExt, PROCESSING_ERROR, Result, ToolError, VALIDATION_ERROR};

// Re-exports — handler and options
pub use handler::Handler;
pub use options::{
    DEFAULTS, Defaults, HandlerConfig, HandlerOption, with_name, with_raw_tool, with_script_tool,
    with_server, with_tool, with_version,
};
pub use settings::{Settings, with_settings};

// Re-exports — runtime
pub use registry::{ToolRegistry, ToolSet};
pub use runtime::{BoxReader, BoxWriter, IntoRuntime, McpServer, Runtime};

// Re-exports — schema
pub use schema::{
    FieldDef, FieldType, dynamic_schema, generate_schema, object_schema, open_object_schema,
    string_schema,
};

// Re-exports — tools
pub use tools::{ScriptEvaluator, ToolContext, ToolHandler, ToolKind, ToolRegistration, ToolResult};

/// Re-export of the `rmcp` model types tools are described with.
pub use rmcp::model;
