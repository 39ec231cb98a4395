//! Transport bindings.
//!
//! Each binding is a thin adapter translating its wire format to/from the
//! shared dispatcher; the routing logic lives here, once, so the two
//! bindings cannot drift apart.

pub mod sse;
pub mod stdio;

use serde_json::{json, Value};

use crate::dispatch::Dispatcher;
use crate::rpc::{self, Request, Response};
use crate::types::Error;

pub use sse::SseServer;

/// MCP protocol revision both bindings advertise.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Handle one raw inbound message.
///
/// Returns `None` for notifications (nothing to write back). Unparseable
/// payloads are answered at this boundary; the dispatcher is never invoked
/// for structurally invalid envelopes.
pub async fn handle_message(dispatcher: &Dispatcher, raw: &str) -> Option<Response> {
    let request: Request = match serde_json::from_str(raw) {
        Ok(request) => request,
        Err(e) => {
            let err = Error::transport_decode(e.to_string());
            tracing::debug!(error = %err, "rejecting unparseable message");
            return Some(Response::error(Value::Null, err.rpc_code(), err.to_string()));
        }
    };

    if request.is_notification() {
        tracing::debug!(method = %request.method, "ignoring notification");
        return None;
    }

    Some(handle_request(dispatcher, request).await)
}

/// Route one well-formed request to the dispatcher.
async fn handle_request(dispatcher: &Dispatcher, request: Request) -> Response {
    let id = request.id.unwrap_or(Value::Null);

    match request.method.as_str() {
        "initialize" => Response::success(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": {} },
                "serverInfo": {
                    "name": env!("CARGO_PKG_NAME"),
                    "version": env!("CARGO_PKG_VERSION"),
                },
            }),
        ),

        "ping" => Response::success(id, json!({})),

        "tools/list" => Response::success(id, json!({ "tools": dispatcher.descriptors() })),

        "tools/call" => {
            let params = request.params.unwrap_or(Value::Null);
            let Some(tool_name) = params.get("name").and_then(|v| v.as_str()) else {
                let err = Error::validation("missing tool name");
                return Response::error(id, err.rpc_code(), err.to_string());
            };
            let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

            let result = dispatcher.call(tool_name, &arguments).await;
            match serde_json::to_value(&result) {
                Ok(value) => Response::success(id, value),
                Err(e) => {
                    let err = Error::Serialization(e);
                    Response::error(id, err.rpc_code(), err.to_string())
                }
            }
        }

        other => Response::error(
            id,
            rpc::METHOD_NOT_FOUND,
            format!("Unknown method: {}", other),
        ),
    }
}
