//! Integration tests for the stdio and HTTP transports.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use mcpio::Handler;
use serde_json::{Value, json};
use tokio::io::{
    AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines, ReadHalf, WriteHalf,
};

use crate::common::calculator_options;

const PROTOCOL_VERSION: &str = "2025-03-26";

fn initialize_request(id: u64) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "initialize",
        "params": {
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": {"name": "mcpio-tests", "version": "0.0.1"}
        }
    })
}

// ============================================================================
// Stdio
// ============================================================================

struct Client {
    lines: Lines<BufReader<ReadHalf<DuplexStream>>>,
    writer: WriteHalf<DuplexStream>,
}

impl Client {
    async fn send(&mut self, message: Value) {
        let mut line = serde_json::to_vec(&message).unwrap();
        line.push(b'\n');
        self.writer.write_all(&line).await.unwrap();
        self.writer.flush().await.unwrap();
    }

    async fn receive(&mut self) -> Value {
        let line = tokio::time::timeout(Duration::from_secs(5), self.lines.next_line())
            .await
            .expect("timed out waiting for a response")
            .unwrap()
            .expect("stream closed before a response arrived");
        serde_json::from_str(&line).unwrap()
    }

    async fn request(&mut self, message: Value) -> Value {
        self.send(message).await;
        self.receive().await
    }
}

fn spawn_stdio(handler: Handler) -> (Client, tokio::task::JoinHandle<mcpio::Result<()>>) {
    let (client_end, server_end) = tokio::io::duplex(64 * 1024);
    let (server_read, server_write) = tokio::io::split(server_end);
    let task = tokio::spawn(async move { handler.serve_stdio(server_read, server_write).await });

    let (client_read, client_write) = tokio::io::split(client_end);
    let client = Client {
        lines: BufReader::new(client_read).lines(),
        writer: client_write,
    };
    (client, task)
}

async fn initialized(client: &mut Client) -> Value {
    let response = client.request(initialize_request(1)).await;
    client
        .send(json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
        .await;
    response
}

#[tokio::test]
async fn test_stdio_initialize_reports_identity() {
    let handler = Handler::new(calculator_options()).unwrap();
    let (mut client, task) = spawn_stdio(handler);

    let response = initialized(&mut client).await;
    assert_eq!(response["id"], 1);
    assert_eq!(response["result"]["serverInfo"]["name"], "calculator");
    assert_eq!(response["result"]["serverInfo"]["version"], "1.0.0");
    assert!(response["result"]["capabilities"]["tools"].is_object());

    drop(client);
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_stdio_lists_and_calls_tools() {
    let handler = Handler::new(calculator_options()).unwrap();
    let (mut client, task) = spawn_stdio(handler);
    initialized(&mut client).await;

    let listed = client
        .request(json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list", "params": {}}))
        .await;
    let names: Vec<&str> = listed["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["add", "divide", "echo"]);

    let called = client
        .request(json!({
            "jsonrpc": "2.0",
            "id": 3,
            "method": "tools/call",
            "params": {"name": "divide", "arguments": {"a": 10, "b": 5}}
        }))
        .await;
    assert_eq!(called["result"]["structuredContent"]["result"], 2.0);

    let failed = client
        .request(json!({
            "jsonrpc": "2.0",
            "id": 4,
            "method": "tools/call",
            "params": {"name": "divide", "arguments": {"a": 1, "b": 0}}
        }))
        .await;
    assert_eq!(failed["result"]["isError"], true);
    assert_eq!(failed["result"]["content"][0]["text"], "division by zero");

    let unknown = client
        .request(json!({
            "jsonrpc": "2.0",
            "id": 5,
            "method": "tools/call",
            "params": {"name": "multiply", "arguments": {}}
        }))
        .await;
    assert!(unknown["error"].is_object());

    drop(client);
    task.await.unwrap().unwrap();
}

// ============================================================================
// HTTP
// ============================================================================

fn post(body: &Value, accept: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/")
        .header(header::HOST, "localhost")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::ACCEPT, accept)
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn test_http_initialize_opens_session() {
    let handler = Handler::new(calculator_options()).unwrap();
    let response = handler
        .serve_http(post(&initialize_request(1), "application/json, text/event-stream"))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("mcp-session-id"));
}

#[tokio::test]
async fn test_sse_shares_the_http_exchange() {
    let handler = Handler::new(calculator_options()).unwrap();
    let response = handler
        .serve_sse(post(&initialize_request(1), "application/json, text/event-stream"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_http_rejects_unacceptable_request() {
    let handler = Handler::new(calculator_options()).unwrap();
    let response = handler
        .serve_http(post(&initialize_request(1), "text/plain"))
        .await;
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_router_can_be_mounted() {
    let handler = Handler::new(calculator_options()).unwrap();
    let app = axum::Router::new().nest_service("/mcp", handler.router());

    let mut request = post(&initialize_request(1), "application/json, text/event-stream");
    *request.uri_mut() = "/mcp".parse().unwrap();
    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
