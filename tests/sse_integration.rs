//! SSE transport integration tests — multiple peers against a live server,
//! each demultiplexed onto its own event stream.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;

use toolgate::backend::{CapabilityTable, Page, ResourceCapability};
use toolgate::dispatch::Dispatcher;
use toolgate::tools::name::{Operation, ResourceKind};
use toolgate::tools::PageQuery;
use toolgate::transport::SseServer;
use toolgate::types::{Result, SseConfig};

/// Echoes the requested id back, so each peer can verify it got its own
/// response and never a neighbor's.
struct EchoBackend;

#[async_trait]
impl ResourceCapability for EchoBackend {
    fn operations(&self) -> &[Operation] {
        &Operation::ALL
    }

    async fn fetch_one(&self, id: &str) -> Result<Value> {
        Ok(json!({"id": id}))
    }

    async fn fetch_page(&self, _query: PageQuery) -> Result<Page> {
        Ok(Page {
            items: vec![json!({"id": "only"})],
            next_cursor: Some("only".to_string()),
        })
    }
}

/// Helper: spin up an SseServer on a random port, return (base_url, task).
async fn start_test_server() -> (String, tokio::task::JoinHandle<()>) {
    let mut table = CapabilityTable::new();
    table.insert(ResourceKind::Templates, Arc::new(EchoBackend));
    let dispatcher = Arc::new(Dispatcher::new(table));

    // Bind temporarily to get a free port, then drop immediately
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    drop(listener);

    let handle = tokio::spawn(async move {
        let server = SseServer::new(dispatcher, addr, SseConfig::default());
        let _ = server.serve().await;
    });

    // Give the server a moment to bind
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    (format!("http://{}", addr), handle)
}

/// One SSE peer: an open event stream plus the session endpoint it was
/// handed in the first event.
struct Peer {
    response: reqwest::Response,
    buffer: String,
    endpoint: String,
}

impl Peer {
    async fn connect(client: &reqwest::Client, base: &str) -> Self {
        let response = client
            .get(format!("{}/sse", base))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let mut peer = Self {
            response,
            buffer: String::new(),
            endpoint: String::new(),
        };
        let (event, data) = peer.next_event().await;
        assert_eq!(event, "endpoint");
        assert!(data.starts_with("/messages?sessionId="), "got {}", data);
        peer.endpoint = data;
        peer
    }

    /// Read the next non-comment event frame from the stream.
    async fn next_event(&mut self) -> (String, String) {
        loop {
            if let Some(pos) = self.buffer.find("\n\n") {
                let frame = self.buffer[..pos].to_string();
                self.buffer.drain(..pos + 2);
                // keep-alive comments
                if frame.starts_with(':') {
                    continue;
                }
                let mut event = String::new();
                let mut data = String::new();
                for line in frame.lines() {
                    if let Some(rest) = line.strip_prefix("event: ") {
                        event = rest.to_string();
                    } else if let Some(rest) = line.strip_prefix("data: ") {
                        data.push_str(rest);
                    }
                }
                return (event, data);
            }

            let chunk = self
                .response
                .chunk()
                .await
                .unwrap()
                .expect("stream ended unexpectedly");
            self.buffer.push_str(&String::from_utf8_lossy(&chunk));
        }
    }

    async fn post(&self, client: &reqwest::Client, base: &str, body: Value) -> reqwest::StatusCode {
        client
            .post(format!("{}{}", base, self.endpoint))
            .body(body.to_string())
            .send()
            .await
            .unwrap()
            .status()
    }

    /// Post a request and read the correlated response off the stream.
    async fn round_trip(&mut self, client: &reqwest::Client, base: &str, body: Value) -> Value {
        let status = self.post(client, base, body).await;
        assert_eq!(status, reqwest::StatusCode::ACCEPTED);
        let (event, data) = self.next_event().await;
        assert_eq!(event, "message");
        serde_json::from_str(&data).unwrap()
    }
}

fn call_request(id: u64, tool: &str, arguments: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": {"name": tool, "arguments": arguments},
    })
}

#[tokio::test]
async fn tools_call_round_trip() {
    let (base, _handle) = start_test_server().await;
    let client = reqwest::Client::new();
    let mut peer = Peer::connect(&client, &base).await;

    let response = peer
        .round_trip(&client, &base, call_request(1, "templates_get_one", json!({"id": "t1"})))
        .await;

    assert_eq!(response["id"], 1);
    let result = &response["result"];
    assert_eq!(result["isError"], false);
    let payload: Value =
        serde_json::from_str(result["content"][0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(payload["id"], "t1");
}

#[tokio::test]
async fn tools_list_round_trip() {
    let (base, _handle) = start_test_server().await;
    let client = reqwest::Client::new();
    let mut peer = Peer::connect(&client, &base).await;

    let response = peer
        .round_trip(
            &client,
            &base,
            json!({"jsonrpc": "2.0", "id": 7, "method": "tools/list"}),
        )
        .await;

    let tools = response["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), ResourceKind::ALL.len() * 2);
}

#[tokio::test]
async fn concurrent_peers_receive_only_their_own_responses() {
    let (base, _handle) = start_test_server().await;
    let client = reqwest::Client::new();

    let mut alice = Peer::connect(&client, &base).await;
    let mut bob = Peer::connect(&client, &base).await;
    assert_ne!(alice.endpoint, bob.endpoint);

    // Interleave the posts before reading either stream.
    let status = alice
        .post(&client, &base, call_request(1, "templates_get_one", json!({"id": "alice-1"})))
        .await;
    assert_eq!(status, reqwest::StatusCode::ACCEPTED);
    let status = bob
        .post(&client, &base, call_request(2, "templates_get_one", json!({"id": "bob-1"})))
        .await;
    assert_eq!(status, reqwest::StatusCode::ACCEPTED);

    let (_, alice_data) = alice.next_event().await;
    let (_, bob_data) = bob.next_event().await;

    let alice_response: Value = serde_json::from_str(&alice_data).unwrap();
    let bob_response: Value = serde_json::from_str(&bob_data).unwrap();

    let alice_payload: Value =
        serde_json::from_str(alice_response["result"]["content"][0]["text"].as_str().unwrap())
            .unwrap();
    let bob_payload: Value =
        serde_json::from_str(bob_response["result"]["content"][0]["text"].as_str().unwrap())
            .unwrap();

    assert_eq!(alice_payload["id"], "alice-1");
    assert_eq!(bob_payload["id"], "bob-1");
}

#[tokio::test]
async fn unknown_session_is_rejected() {
    let (base, _handle) = start_test_server().await;
    let client = reqwest::Client::new();

    let status = client
        .post(format!("{}/messages?sessionId=no-such-session", base))
        .body(call_request(1, "templates_get_one", json!({"id": "x"})).to_string())
        .send()
        .await
        .unwrap()
        .status();

    assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_body_is_answered_with_parse_error() {
    let (base, _handle) = start_test_server().await;
    let client = reqwest::Client::new();
    let mut peer = Peer::connect(&client, &base).await;

    let status = client
        .post(format!("{}{}", base, peer.endpoint))
        .body("{definitely not json")
        .send()
        .await
        .unwrap()
        .status();
    assert_eq!(status, reqwest::StatusCode::ACCEPTED);

    let (event, data) = peer.next_event().await;
    assert_eq!(event, "message");
    let response: Value = serde_json::from_str(&data).unwrap();
    assert_eq!(response["error"]["code"], -32700);
}

#[tokio::test]
async fn peer_disconnect_leaves_other_peers_serving() {
    let (base, _handle) = start_test_server().await;
    let client = reqwest::Client::new();

    let departing = Peer::connect(&client, &base).await;
    let mut staying = Peer::connect(&client, &base).await;
    drop(departing);

    let response = staying
        .round_trip(&client, &base, call_request(3, "templates_get_one", json!({"id": "still-here"})))
        .await;
    let payload: Value =
        serde_json::from_str(response["result"]["content"][0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(payload["id"], "still-here");
}
