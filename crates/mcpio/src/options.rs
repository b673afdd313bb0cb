//! Functional options for building a [`Handler`](crate::Handler).
//!
//! Each option is one configuration step applied, in order, to a fresh
//! [`HandlerConfig`]. The first step that fails aborts construction and its
//! error is returned unchanged.
//!
//! ```rust,ignore
//! let handler = Handler::new([
//!     with_name("calculator"),
//!     with_version("1.2.0"),
//!     with_tool("divide", "Divide a by b", divide),
//! ])?;
//! ```

use std::future::Future;
use std::sync::Arc;

use schemars::{JsonSchema, Schema};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::runtime::{IntoRuntime, Runtime};
use crate::schema::open_object_schema;
use crate::tools::{ScriptEvaluator, ToolContext, ToolRegistration};

/// Fallback server identity used when no option overrides it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Defaults {
    /// Default server name
    pub name: &'static str,
    /// Default server version
    pub version: &'static str,
}

/// The defaults every construction starts from.
pub const DEFAULTS: Defaults = Defaults {
    name: "mcp-server",
    version: "1.0.0",
};

/// The record configuration steps accumulate into.
///
/// Created fresh for every [`Handler::new`](crate::Handler::new) call and
/// consumed by it.
pub struct HandlerConfig {
    pub(crate) name: String,
    pub(crate) version: String,
    pub(crate) server: Option<Arc<dyn Runtime>>,
    pub(crate) tools: Vec<ToolRegistration>,
}

impl HandlerConfig {
    /// Create a record holding [`DEFAULTS`] and no tools.
    pub fn new() -> Self {
        Self {
            name: DEFAULTS.name.to_string(),
            version: DEFAULTS.version.to_string(),
            server: None,
            tools: Vec::new(),
        }
    }

    /// Applies `options` in order, stopping at the first failure.
    pub fn apply<I>(mut self, options: I) -> Result<Self>
    where
        I: IntoIterator<Item = HandlerOption>,
    {
        for option in options {
            option.apply(&mut self)?;
        }
        Ok(self)
    }

    /// Server name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Server version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Whether a runtime instance was injected.
    pub fn has_server(&self) -> bool {
        self.server.is_some()
    }

    /// Collected tool registrations, in the order they were added.
    pub fn tools(&self) -> &[ToolRegistration] {
        &self.tools
    }
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HandlerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerConfig")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("server", &self.server.is_some())
            .field("tools", &self.tools)
            .finish()
    }
}

type ApplyFn = Box<dyn FnOnce(&mut HandlerConfig) -> Result<()> + Send>;

/// One configuration step.
pub struct HandlerOption {
    label: &'static str,
    apply: ApplyFn,
}

impl HandlerOption {
    /// Wraps a closure as a configuration step.
    pub fn new<F>(label: &'static str, apply: F) -> Self
    where
        F: FnOnce(&mut HandlerConfig) -> Result<()> + Send + 'static,
    {
        Self {
            label,
            apply: Box::new(apply),
        }
    }

    /// Short name of the step, for diagnostics.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Applies the step to `config`.
    pub fn apply(self, config: &mut HandlerConfig) -> Result<()> {
        log::debug!("Applying option {}", self.label);
        (self.apply)(config)
    }
}

impl std::fmt::Debug for HandlerOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("HandlerOption").field(&self.label).finish()
    }
}

/// Sets the server name.
pub fn with_name(name: impl Into<String>) -> HandlerOption {
    let name = name.into();
    HandlerOption::new("with_name", move |cfg| {
        if name.is_empty() {
            return Err(Error::EmptyName);
        }
        cfg.name = name;
        Ok(())
    })
}

/// Sets the server version.
pub fn with_version(version: impl Into<String>) -> HandlerOption {
    let version = version.into();
    HandlerOption::new("with_version", move |cfg| {
        if version.is_empty() {
            return Err(Error::EmptyVersion);
        }
        cfg.version = version;
        Ok(())
    })
}

/// Adds a typed tool whose schemas are derived from `I` and `O`.
///
/// Returning a [`ToolError`](crate::ToolError) from `f` reports a failure to
/// the caller; any other error aborts the call.
pub fn with_tool<I, O, F, Fut>(
    name: impl Into<String>,
    description: impl Into<String>,
    f: F,
) -> HandlerOption
where
    I: DeserializeOwned + JsonSchema + Send + 'static,
    O: Serialize + JsonSchema + Send + 'static,
    F: Fn(ToolContext, I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<O>> + Send + 'static,
{
    let name = name.into();
    let description = description.into();
    HandlerOption::new("with_tool", move |cfg| {
        if name.is_empty() {
            return Err(Error::EmptyToolName);
        }
        let registration = ToolRegistration::typed(&name, &description, f)?;
        cfg.tools.push(registration);
        Ok(())
    })
}

/// Adds a tool that works on raw JSON bytes with an explicit input schema.
///
/// `f` must return valid JSON; anything else fails the call.
pub fn with_raw_tool<F, Fut>(
    name: impl Into<String>,
    description: impl Into<String>,
    input_schema: impl Into<Option<Schema>>,
    f: F,
) -> HandlerOption
where
    F: Fn(ToolContext, Vec<u8>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Vec<u8>>> + Send + 'static,
{
    let name = name.into();
    let description = description.into();
    let input_schema = input_schema.into();
    HandlerOption::new("with_raw_tool", move |cfg| {
        if name.is_empty() {
            return Err(Error::EmptyToolName);
        }
        let input_schema = input_schema.ok_or(Error::NilSchema)?;
        cfg.tools
            .push(ToolRegistration::raw(&name, &description, input_schema, f));
        Ok(())
    })
}

/// Adds a tool executed by a script evaluator.
///
/// The tool accepts any JSON object as input.
pub fn with_script_tool<E>(
    name: impl Into<String>,
    description: impl Into<String>,
    evaluator: impl Into<Option<Arc<E>>>,
) -> HandlerOption
where
    E: ScriptEvaluator + ?Sized + 'static,
{
    let name = name.into();
    let description = description.into();
    let evaluator = evaluator.into();
    HandlerOption::new("with_script_tool", move |cfg| {
        if name.is_empty() {
            return Err(Error::EmptyToolName);
        }
        let evaluator = evaluator.ok_or(Error::NilEvaluator)?;
        cfg.tools.push(ToolRegistration::script(
            &name,
            &description,
            open_object_schema(),
            evaluator,
        ));
        Ok(())
    })
}

/// Injects a pre-built runtime; name and version are then ignored.
///
/// Accepts a concrete runtime (`Arc<McpServer>`) or a shared trait object
/// such as the one returned by [`Handler::server`](crate::Handler::server).
pub fn with_server<S>(server: impl Into<Option<S>>) -> HandlerOption
where
    S: IntoRuntime,
{
    let server = server.into();
    HandlerOption::new("with_server", move |cfg| {
        let server = server.ok_or(Error::NilServer)?;
        cfg.server = Some(server.into_runtime());
        Ok(())
    })
}

// ============================================================================
// Tests
// ============================================================================
