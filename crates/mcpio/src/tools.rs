//! Tool adapters.
//!
//! Converts user functions into the [`ToolHandler`] shape the runtime
//! dispatches to, and classifies their failures:
//!
//! - a [`ToolError`] anywhere in the error chain becomes a
//!   `CallToolResult` with `is_error` set and the error's `message` as text;
//! - anything else becomes [`Error::ToolFailed`] and aborts the call at the
//!   protocol level.
//!
//! Three variants exist: typed ([`typed_handler`]), raw JSON bytes
//! ([`raw_handler`]) and script-backed ([`script_handler`]).

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rmcp::model::{CallToolResult, Content, JsonObject, Tool};
use schemars::{JsonSchema, Schema};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result, ToolError};
use crate::schema::{generate_schema, json_schema};

/// Type alias for async tool handler results.
pub type ToolResult = Pin<Box<dyn Future<Output = Result<CallToolResult>> + Send>>;

/// An adapted tool function, as stored by a runtime.
pub type ToolHandler = Arc<dyn Fn(ToolContext, JsonObject) -> ToolResult + Send + Sync>;

/// Per-call context handed to every tool function.
///
/// Carries the runtime's cancellation token; honouring it is up to the
/// tool function.
#[derive(Clone, Debug, Default)]
pub struct ToolContext {
    tool_name: String,
    cancellation: CancellationToken,
    timeout: Option<Duration>,
}

impl ToolContext {
    /// Creates a context for a call to `tool_name`.
    pub fn new<S: Into<String>>(tool_name: S, cancellation: CancellationToken) -> Self {
        Self {
            tool_name: tool_name.into(),
            cancellation,
            timeout: None,
        }
    }

    /// Attaches a declared timeout for the callee to act on.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Name of the tool being called.
    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    /// Token cancelled when the caller abandons the request.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Returns `true` once the request has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Timeout declared by a script evaluator, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

/// Script engine backing a script tool.
///
/// The adapter forwards [`timeout`](ScriptEvaluator::timeout) through the
/// [`ToolContext`]; enforcing it belongs to the evaluator.
#[async_trait]
pub trait ScriptEvaluator: Send + Sync {
    /// Runs the script with JSON-encoded arguments, returning JSON bytes.
    async fn execute(&self, ctx: ToolContext, input: Vec<u8>) -> anyhow::Result<Vec<u8>>;

    /// Maximum time one execution is allowed to take.
    fn timeout(&self) -> Duration;
}

/// How a registration's handler was produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ToolKind {
    /// Schema reflected from the function's input/output types
    Typed,
    /// Explicit schema, JSON bytes in and out
    Raw,
    /// Raw tool backed by a [`ScriptEvaluator`]
    Script {
        /// Timeout declared by the evaluator
        timeout: Duration,
    },
}

/// A deferred "attach this tool to the runtime" action.
///
/// Built by a configuration step and replayed against the runtime by
/// [`Handler::new`](crate::Handler::new).
#[derive(Clone)]
pub struct ToolRegistration {
    name: String,
    description: String,
    input_schema: Schema,
    output_schema: Option<Schema>,
    kind: ToolKind,
    handler: ToolHandler,
}

impl ToolRegistration {
    /// Registration for a typed tool; schemas come from `I` and `O`.
    ///
    /// The output schema is kept only when `O` is an object type.
    pub fn typed<I, O, F, Fut>(name: &str, description: &str, f: F) -> Result<Self>
    where
        I: DeserializeOwned + JsonSchema + Send + 'static,
        O: Serialize + JsonSchema + Send + 'static,
        F: Fn(ToolContext, I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<O>> + Send + 'static,
    {
        Ok(Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema: generate_schema::<I>()?,
            output_schema: generate_schema::<O>().ok(),
            kind: ToolKind::Typed,
            handler: typed_handler(f),
        })
    }

    /// Registration for a raw tool with an explicit input schema.
    pub fn raw<F, Fut>(name: &str, description: &str, input_schema: Schema, f: F) -> Self
    where
        F: Fn(ToolContext, Vec<u8>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Vec<u8>>> + Send + 'static,
    {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
            output_schema: None,
            kind: ToolKind::Raw,
            handler: raw_handler(f),
        }
    }

    /// Registration for a script tool with an explicit input schema.
    pub fn script<E>(
        name: &str,
        description: &str,
        input_schema: Schema,
        evaluator: Arc<E>,
    ) -> Self
    where
        E: ScriptEvaluator + ?Sized + 'static,
    {
        let timeout = evaluator.timeout();
        Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
            output_schema: None,
            kind: ToolKind::Script { timeout },
            handler: script_handler(evaluator),
        }
    }

    /// Tool name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tool description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Input schema advertised to clients.
    pub fn input_schema(&self) -> &Schema {
        &self.input_schema
    }

    /// Output schema, for typed tools with object outputs.
    pub fn output_schema(&self) -> Option<&Schema> {
        self.output_schema.as_ref()
    }

    /// How the handler was built.
    pub fn kind(&self) -> &ToolKind {
        &self.kind
    }

    /// The adapted handler.
    pub fn handler(&self) -> ToolHandler {
        Arc::clone(&self.handler)
    }

    /// Invokes the adapted handler directly.
    pub fn invoke(&self, ctx: ToolContext, args: JsonObject) -> ToolResult {
        (self.handler)(ctx, args)
    }

    /// The MCP tool definition for `tools/list`.
    pub fn to_tool(&self) -> Tool {
        let mut tool = Tool::new(
            self.name.clone(),
            self.description.clone(),
            json_schema(self.input_schema.clone()),
        );
        tool.output_schema = self.output_schema.clone().map(json_schema);
        tool
    }
}

impl fmt::Debug for ToolRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistration")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Adapts a typed function.
///
/// Arguments are decoded into `I` first; a decode failure is
/// [`Error::InvalidArguments`]. Object outputs are returned as structured
/// content, anything else as JSON text.
pub fn typed_handler<I, O, F, Fut>(f: F) -> ToolHandler
where
    I: DeserializeOwned + Send + 'static,
    O: Serialize + Send + 'static,
    F: Fn(ToolContext, I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<O>> + Send + 'static,
{
    let f = Arc::new(f);
    Arc::new(move |ctx: ToolContext, args: JsonObject| -> ToolResult {
        let f = Arc::clone(&f);
        Box::pin(async move {
            let input: I =
                serde_json::from_value(Value::Object(args)).map_err(Error::InvalidArguments)?;
            let tool_name = ctx.tool_name().to_string();

            match f(ctx, input).await {
                Ok(output) => {
                    let value = serde_json::to_value(&output).map_err(|e| {
                        let err = anyhow::Error::new(e).context("failed to serialize output");
                        Error::ToolFailed(err)
                    })?;
                    Ok(success_result(value))
                }
                Err(err) => classify(&tool_name, err),
            }
        })
    })
}

/// Adapts a raw JSON function.
///
/// Output bytes must decode as JSON; when they do, the original bytes are
/// returned verbatim as text content. Otherwise the call fails with
/// [`Error::InvalidJson`].
pub fn raw_handler<F, Fut>(f: F) -> ToolHandler
where
    F: Fn(ToolContext, Vec<u8>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Vec<u8>>> + Send + 'static,
{
    let f = Arc::new(f);
    Arc::new(move |ctx: ToolContext, args: JsonObject| -> ToolResult {
        let f = Arc::clone(&f);
        Box::pin(async move {
            let input = match serde_json::to_vec(&args) {
                Ok(bytes) => bytes,
                Err(e) => {
                    return Ok(CallToolResult::error(vec![Content::text(format!(
                        "Failed to marshal input: {e}"
                    ))]));
                }
            };
            let tool_name = ctx.tool_name().to_string();

            let output = match f(ctx, input).await {
                Ok(output) => output,
                Err(err) => return classify(&tool_name, err),
            };

            if let Err(e) = serde_json::from_slice::<Value>(&output) {
                log::warn!("Tool '{tool_name}' returned invalid JSON: {e}");
                return Err(Error::InvalidJson(e));
            }

            let text = String::from_utf8_lossy(&output).into_owned();
            Ok(CallToolResult::success(vec![Content::text(text)]))
        })
    })
}

/// Adapts a script evaluator as a raw tool.
///
/// The evaluator's declared timeout is attached to the context passed to
/// [`ScriptEvaluator::execute`].
pub fn script_handler<E>(evaluator: Arc<E>) -> ToolHandler
where
    E: ScriptEvaluator + ?Sized + 'static,
{
    raw_handler(move |ctx: ToolContext, input: Vec<u8>| {
        let evaluator = Arc::clone(&evaluator);
        async move {
            let ctx = ctx.with_timeout(evaluator.timeout());
            evaluator.execute(ctx, input).await
        }
    })
}

fn classify(tool_name: &str, err: anyhow::Error) -> Result<CallToolResult> {
    if let Some(tool_err) = ToolError::find(&err) {
        log::debug!("Tool '{tool_name}' reported: {tool_err}");
        return Ok(CallToolResult::error(vec![Content::text(
            tool_err.message.clone(),
        )]));
    }
    log::warn!("Tool '{tool_name}' failed: {err:#}");
    Err(Error::ToolFailed(err))
}

fn success_result(value: Value) -> CallToolResult {
    if value.is_object() {
        CallToolResult::structured(value)
    } else {
        CallToolResult::success(vec![Content::text(value.to_string())])
    }
}

// ============================================================================
// Tests
// ============================================================================
