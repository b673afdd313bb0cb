//! Error types for mcpio.
//!
//! Two disjoint kinds of failure exist at this layer:
//!
//! - [`ToolError`] is a failure the calling agent should see. Adapters turn
//!   it into a `CallToolResult` with `is_error` set, and the exchange
//!   carries on.
//! - [`Error`] covers everything else: configuration sentinels returned by
//!   [`Handler::new`](crate::Handler::new), and protocol-level failures that
//!   abort a single tool call.

use std::fmt;

use rmcp::model::ErrorData;
use thiserror::Error;

/// Result type alias for mcpio operations
pub type Result<T> = std::result::Result<T, Error>;

/// Code attached by [`ToolError::validation`].
pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";

/// Code attached by [`ToolError::processing`].
pub const PROCESSING_ERROR: &str = "PROCESSING_ERROR";

/// Errors that can occur in mcpio
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// `with_name` was given an empty string
    #[error("name cannot be empty")]
    EmptyName,

    /// `with_version` was given an empty string
    #[error("version cannot be empty")]
    EmptyVersion,

    /// A tool option was given an empty tool name
    #[error("tool name cannot be empty")]
    EmptyToolName,

    /// `with_raw_tool` was given no input schema
    #[error("schema cannot be nil")]
    NilSchema,

    /// `with_server` was given no runtime instance
    #[error("server cannot be nil")]
    NilServer,

    /// `with_script_tool` was given no evaluator
    #[error("evaluator cannot be nil")]
    NilEvaluator,

    /// The runtime already holds a tool with this name
    #[error("tool already registered: {0}")]
    DuplicateTool(String),

    /// A call named a tool the runtime does not know
    #[error("invalid operation: unknown tool '{0}'")]
    InvalidOperation(String),

    /// A raw tool returned bytes that are not valid JSON
    #[error("tool returned invalid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// Call arguments could not be decoded into a typed tool's input
    #[error("invalid tool arguments: {0}")]
    InvalidArguments(#[source] serde_json::Error),

    /// A schema could not be derived from a declared shape
    #[error("schema generation failed: {0}")]
    Schema(String),

    /// A tool function failed with something other than a [`ToolError`]
    #[error("tool execution failed: {0}")]
    ToolFailed(anyhow::Error),

    /// A transport could not be started or ended abnormally
    #[error("transport error: {0}")]
    Transport(String),

    /// A settings file could not be read or parsed
    #[error("settings error: {0}")]
    Settings(String),
}

impl Error {
    /// Creates a new schema generation error.
    pub fn schema<S: Into<String>>(message: S) -> Self {
        Error::Schema(message.into())
    }

    /// Creates a new transport error.
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Error::Transport(message.into())
    }

    /// Creates a new settings error.
    pub fn settings<S: Into<String>>(message: S) -> Self {
        Error::Settings(message.into())
    }

    /// Returns whether this error rejects a configuration step.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::EmptyName
                | Error::EmptyVersion
                | Error::EmptyToolName
                | Error::NilSchema
                | Error::NilServer
                | Error::NilEvaluator
                | Error::DuplicateTool(_)
                | Error::Schema(_)
                | Error::Settings(_)
        )
    }
}

/// A failure meant for the calling agent rather than the protocol layer.
///
/// Adapters recognise it by type, never by message, wherever it sits in an
/// `anyhow` error chain. Its `message` becomes the text content of an error
/// result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolError {
    /// Human-readable message shown to the agent
    pub message: String,
    /// Optional categorisation code; empty when unset
    pub code: String,
}

impl ToolError {
    /// Creates a tool error with no code.
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
            code: String::new(),
        }
    }

    /// Creates a tool error with a caller-supplied code.
    pub fn with_code<M, C>(message: M, code: C) -> Self
    where
        M: Into<String>,
        C: Into<String>,
    {
        Self {
            message: message.into(),
            code: code.into(),
        }
    }

    /// Creates a tool error coded [`VALIDATION_ERROR`].
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::with_code(message, VALIDATION_ERROR)
    }

    /// Creates a tool error coded [`PROCESSING_ERROR`].
    pub fn processing<S: Into<String>>(message: S) -> Self {
        Self::with_code(message, PROCESSING_ERROR)
    }

    /// Finds the first `ToolError` in an error chain.
    pub fn find(err: &anyhow::Error) -> Option<&ToolError> {
        err.chain().find_map(|cause| cause.downcast_ref::<ToolError>())
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.code.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "[{}] {}", self.code, self.message)
        }
    }
}

impl std::error::Error for ToolError {}

/// Extension trait for converting mcpio errors into MCP error data.
pub trait McpErrorExt {
    /// Convert into an `rmcp::model::ErrorData` for the wire.
    fn to_mcp_error(&self) -> ErrorData;
}

impl McpErrorExt for Error {
    fn to_mcp_error(&self) -> ErrorData {
        match self {
            Error::InvalidArguments(_) | Error::InvalidOperation(_) => {
                ErrorData::invalid_params(self.to_string(), None)
            }
            _ => ErrorData::internal_error(self.to_string(), None),
        }
    }
}
