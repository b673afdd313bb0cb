//! Tool registry trait and the ordered tool set runtimes keep.
//!
//! `ToolRegistry` abstracts over listing and dispatching tools by name.
//! Runtimes implement it so the handler façade and tests can inspect what
//! was registered without going through a transport.

use rmcp::model::{JsonObject, Tool};

use crate::error::{Error, Result};
use crate::tools::{ToolContext, ToolRegistration, ToolResult};

/// Trait for listing and dispatching MCP tools.
pub trait ToolRegistry: Send + Sync {
    /// Returns all tool definitions, in registration order.
    fn tools(&self) -> Vec<Tool>;

    /// Dispatches a call to the tool named by `ctx`.
    ///
    /// Returns `None` if the tool is not recognized by this registry.
    fn call(&self, ctx: ToolContext, args: JsonObject) -> Option<ToolResult>;

    /// Returns the number of registered tools.
    fn tool_count(&self) -> usize {
        self.tools().len()
    }

    /// Check if a tool exists by name.
    fn has_tool(&self, name: &str) -> bool {
        self.tools().iter().any(|t| t.name == name)
    }

    /// Names of all tools, in registration order.
    fn tool_names(&self) -> Vec<String> {
        self.tools().iter().map(|t| t.name.to_string()).collect()
    }
}

/// Tool registrations in insertion order, unique by name.
#[derive(Debug, Default)]
pub struct ToolSet {
    registrations: Vec<ToolRegistration>,
}

impl ToolSet {
    /// Create a new empty tool set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a registration.
    ///
    /// A name that is already present is rejected with
    /// [`Error::DuplicateTool`] and the set is left unchanged.
    pub fn insert(&mut self, registration: ToolRegistration) -> Result<()> {
        if self.get(registration.name()).is_some() {
            return Err(Error::DuplicateTool(registration.name().to_string()));
        }
        self.registrations.push(registration);
        Ok(())
    }

    /// Looks up a registration by tool name.
    pub fn get(&self, name: &str) -> Option<&ToolRegistration> {
        self.registrations.iter().find(|r| r.name() == name)
    }

    /// All registrations, in insertion order.
    pub fn registrations(&self) -> &[ToolRegistration] {
        &self.registrations
    }

    /// Number of registrations.
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Returns `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

impl ToolRegistry for ToolSet {
    fn tools(&self) -> Vec<Tool> {
        self.registrations.iter().map(ToolRegistration::to_tool).collect()
    }

    fn call(&self, ctx: ToolContext, args: JsonObject) -> Option<ToolResult> {
        let registration = self.get(ctx.tool_name())?;
        Some(registration.invoke(ctx, args))
    }

    fn tool_count(&self) -> usize {
        self.len()
    }

    fn has_tool(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

// ============================================================================
// Tests
// ============================================================================
