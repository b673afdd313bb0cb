//! Integration tests for assembling handlers from options.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mcpio::{
    DEFAULTS, Error, Handler, HandlerOption, McpServer, Runtime, ScriptEvaluator, Settings,
    ToolContext, ToolRegistry, object_schema, with_name, with_raw_tool, with_script_tool,
    with_server, with_settings, with_tool, with_version,
};

use crate::common::{RecordingRuntime, add, calculator_options, divide, echo};

struct NoopScript;

#[async_trait]
impl ScriptEvaluator for NoopScript {
    async fn execute(&self, _ctx: ToolContext, _input: Vec<u8>) -> anyhow::Result<Vec<u8>> {
        Ok(b"{}".to_vec())
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(1)
    }
}

#[test]
fn test_calculator_handler_lists_tools_in_order() {
    let handler = Handler::new(calculator_options()).unwrap();
    assert_eq!(handler.server().tool_names(), vec!["add", "divide", "echo"]);

    let tools = handler.server().tools();
    let divide = &tools[1];
    assert_eq!(divide.description.as_deref(), Some("Divide a by b"));
    assert_eq!(divide.input_schema.get("type").unwrap(), "object");
    assert!(divide.output_schema.is_some());
}

#[test]
fn test_no_options_uses_defaults() {
    let handler = Handler::new([]).unwrap();
    assert_eq!(handler.server().tool_count(), 0);
    assert!(format!("{handler:?}").contains("Handler"));
    assert_eq!(DEFAULTS.name, "mcp-server");
    assert_eq!(DEFAULTS.version, "1.0.0");
}

fn build_err(option: HandlerOption) -> Error {
    let err = Handler::new([option]).unwrap_err();
    assert!(err.is_configuration(), "not a configuration error: {err:?}");
    err
}

#[test]
fn test_each_sentinel_fails_construction() {
    assert!(matches!(build_err(with_name("")), Error::EmptyName));
    assert!(matches!(build_err(with_version("")), Error::EmptyVersion));
    assert!(matches!(
        build_err(with_tool("", "No name", add)),
        Error::EmptyToolName
    ));
    assert!(matches!(
        build_err(with_raw_tool("raw", "No schema", None, |_ctx, input| async move {
            Ok::<_, anyhow::Error>(input)
        })),
        Error::NilSchema
    ));
    assert!(matches!(
        build_err(with_server::<Arc<McpServer>>(None)),
        Error::NilServer
    ));
    assert!(matches!(
        build_err(with_script_tool::<NoopScript>("script", "No evaluator", None)),
        Error::NilEvaluator
    ));
}

#[test]
fn test_first_failing_option_wins() {
    let err = Handler::new([with_version(""), with_name("")]).unwrap_err();
    assert!(matches!(err, Error::EmptyVersion));
}

#[test]
fn test_injected_server_is_the_same_instance() {
    let server = Arc::new(McpServer::new("injected", "3.0.0"));
    let handler = Handler::new([
        with_name("ignored"),
        with_server(Arc::clone(&server)),
        with_tool("divide", "Divide a by b", divide),
    ])
    .unwrap();

    let expected: Arc<dyn Runtime> = server.clone();
    assert!(Arc::ptr_eq(handler.server(), &expected));
    assert!(server.has_tool("divide"));
    assert_eq!(server.name(), "injected");
}

#[test]
fn test_injected_runtime_receives_tools_in_order() {
    let runtime = Arc::new(RecordingRuntime::new());
    Handler::new([
        with_tool("echo", "Echo a message", echo),
        with_server(Arc::clone(&runtime)),
        with_tool("add", "Add two numbers", add),
        with_raw_tool(
            "raw",
            "Raw echo",
            object_schema("Raw input", [("text", "Text")], ["text"]),
            |_ctx, input| async move { Ok::<_, anyhow::Error>(input) },
        ),
        with_script_tool("script", "Script tool", Arc::new(NoopScript)),
    ])
    .unwrap();

    assert_eq!(runtime.registered(), vec!["echo", "add", "raw", "script"]);
}

#[test]
fn test_runtime_rejection_fails_construction() {
    let runtime = Arc::new(RecordingRuntime::rejecting("add"));
    let err = Handler::new([
        with_server(Arc::clone(&runtime)),
        with_tool("echo", "Echo a message", echo),
        with_tool("add", "Add two numbers", add),
    ])
    .unwrap_err();

    assert!(matches!(err, Error::DuplicateTool(ref name) if name == "add"));
    assert_eq!(runtime.registered(), vec!["echo"]);
}

#[test]
fn test_duplicate_tool_rejected_by_default_runtime() {
    let err = Handler::new([
        with_tool("add", "Add two numbers", add),
        with_tool("add", "Add again", add),
    ])
    .unwrap_err();
    assert!(matches!(err, Error::DuplicateTool(_)));
}

#[test]
fn test_from_implementation_on_custom_runtime() {
    let runtime = RecordingRuntime::from_implementation("recorder", "0.1.0");
    assert_eq!(runtime.name, "recorder");
    assert_eq!(runtime.version, "0.1.0");
    assert_eq!(runtime.tool_count(), 0);
}

#[test]
fn test_settings_do_not_rename_injected_server() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mcpio.toml");
    std::fs::write(&path, "name = \"from-settings\"\nversion = \"9.9.9\"\n").unwrap();

    let server = Arc::new(McpServer::new("fixed", "0"));
    let handler = Handler::new([
        with_settings(Settings::load(&path).unwrap()),
        with_server(Arc::clone(&server)),
        with_tool("add", "Add two numbers", add),
    ])
    .unwrap();

    assert_eq!(server.name(), "fixed");
    assert_eq!(server.version(), "0");
    assert_eq!(handler.server().name(), "fixed");
    assert_eq!(handler.server().tool_names(), vec!["add"]);
}
