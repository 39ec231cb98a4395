//! SSE transport — multiple independent peers over HTTP.
//!
//! Each peer opens a long-lived event stream on `GET /sse` and posts
//! requests on `POST /messages?sessionId=<id>`; responses are demultiplexed
//! back to the originating peer's stream. Loss of one peer's stream closes
//! only that session; the dispatcher, catalog, and capability table are
//! process-wide and read-only, so they are shared across peers without
//! locking. The session registry is the only shared mutable state.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use futures::Stream;
use serde::Deserialize;
use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::dispatch::Dispatcher;
use crate::transport::handle_message;
use crate::types::{Result, SseConfig};

type Sessions = Arc<RwLock<HashMap<String, SessionHandle>>>;

/// Per-peer connection state.
#[derive(Debug, Clone)]
struct SessionHandle {
    /// Pre-serialized responses bound for this peer's stream.
    tx: mpsc::Sender<String>,

    /// Serializes dispatch per session: strict request/response ordering on
    /// one logical connection, held across the backend await.
    in_flight: Arc<Mutex<()>>,
}

/// Shared state for the axum router.
#[derive(Debug, Clone)]
pub struct SseState {
    dispatcher: Arc<Dispatcher>,
    sessions: Sessions,
    config: SseConfig,
}

impl SseState {
    pub fn new(dispatcher: Arc<Dispatcher>, config: SseConfig) -> Self {
        Self {
            dispatcher,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    fn active_sessions(&self) -> usize {
        read_lock(&self.sessions).len()
    }
}

/// SSE server wrapping the shared dispatcher.
#[derive(Debug)]
pub struct SseServer {
    state: SseState,
    addr: SocketAddr,
    cancel: CancellationToken,
}

impl SseServer {
    pub fn new(dispatcher: Arc<Dispatcher>, addr: SocketAddr, config: SseConfig) -> Self {
        Self {
            state: SseState::new(dispatcher, config),
            addr,
            cancel: CancellationToken::new(),
        }
    }

    /// Run the server until cancelled or a fatal bind error occurs.
    pub async fn serve(&self) -> Result<()> {
        let listener = TcpListener::bind(self.addr).await?;
        tracing::info!("SSE transport listening on {}", self.addr);

        let cancel = self.cancel.clone();
        axum::serve(listener, router(self.state.clone()))
            .with_graceful_shutdown(cancel.cancelled_owned())
            .await?;

        tracing::info!("SSE transport shut down");
        Ok(())
    }

    /// Request graceful shutdown.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

/// Build the router; exposed separately so tests can drive it directly.
pub fn router(state: SseState) -> Router {
    Router::new()
        .route("/sse", get(open_stream))
        .route("/messages", post(post_message))
        .with_state(state)
}

/// Removes the session from the registry when the peer's stream is dropped.
struct SessionGuard {
    sessions: Sessions,
    session_id: String,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        write_lock(&self.sessions).remove(&self.session_id);
        tracing::info!(session = %self.session_id, "peer disconnected");
    }
}

/// `GET /sse` — open a peer stream. The first event names the companion
/// request endpoint for this session.
async fn open_stream(
    State(state): State<SseState>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let session_id = Uuid::new_v4().to_string();
    let (tx, rx) = mpsc::channel(state.config.channel_capacity);

    write_lock(&state.sessions).insert(
        session_id.clone(),
        SessionHandle {
            tx,
            in_flight: Arc::new(Mutex::new(())),
        },
    );
    tracing::info!(
        session = %session_id,
        active = state.active_sessions(),
        "peer connected"
    );

    let endpoint = format!("/messages?sessionId={}", session_id);
    let guard = SessionGuard {
        sessions: state.sessions.clone(),
        session_id,
    };

    let first = futures::stream::once(std::future::ready(Ok::<_, Infallible>(
        Event::default().event("endpoint").data(endpoint),
    )));
    let responses = futures::stream::unfold((rx, guard), |(mut rx, guard)| async move {
        let message = rx.recv().await?;
        let event = Event::default().event("message").data(message);
        Some((Ok::<_, Infallible>(event), (rx, guard)))
    });

    use futures::StreamExt;
    Sse::new(first.chain(responses)).keep_alive(
        KeepAlive::new().interval(Duration::from_secs(state.config.keep_alive_secs)),
    )
}

#[derive(Debug, Deserialize)]
struct MessageQuery {
    #[serde(rename = "sessionId")]
    session_id: String,
}

/// `POST /messages?sessionId=<id>` — submit one request on an open session.
///
/// The response travels back on the session's event stream; the POST itself
/// only acknowledges acceptance. A send to a peer whose stream has closed
/// mid-call is logged and discarded, never fatal.
async fn post_message(
    State(state): State<SseState>,
    Query(query): Query<MessageQuery>,
    body: String,
) -> impl IntoResponse {
    let handle = match read_lock(&state.sessions).get(&query.session_id) {
        Some(handle) => handle.clone(),
        None => {
            tracing::debug!(session = %query.session_id, "request for unknown session");
            return (StatusCode::NOT_FOUND, "unknown session");
        }
    };

    // One in-flight request per session.
    let _serving = handle.in_flight.lock().await;

    let Some(response) = handle_message(&state.dispatcher, &body).await else {
        return (StatusCode::ACCEPTED, "");
    };

    let encoded = match serde_json::to_string(&response) {
        Ok(encoded) => encoded,
        Err(e) => {
            tracing::error!(session = %query.session_id, error = %e, "response encoding failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "encoding failure");
        }
    };

    if handle.tx.send(encoded).await.is_err() {
        tracing::warn!(
            session = %query.session_id,
            "peer stream closed before response could be delivered, discarding"
        );
    }

    (StatusCode::ACCEPTED, "")
}

fn read_lock(sessions: &Sessions) -> std::sync::RwLockReadGuard<'_, HashMap<String, SessionHandle>> {
    sessions.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_lock(
    sessions: &Sessions,
) -> std::sync::RwLockWriteGuard<'_, HashMap<String, SessionHandle>> {
    sessions.write().unwrap_or_else(PoisonError::into_inner)
}
