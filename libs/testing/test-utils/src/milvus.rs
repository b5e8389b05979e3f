//! Milvus test infrastructure
//!
//! `MockMilvus` is an in-process HTTP server that imitates the two Milvus
//! REST endpoints the vector client talks to. Replies are scripted per
//! endpoint and every request is recorded for assertions.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, RawQuery, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Scripted answer for one endpoint
#[derive(Debug, Clone)]
pub struct MockReply {
    pub status: StatusCode,
    pub content_type: String,
    pub body: String,
    pub delay: Option<Duration>,
}

impl MockReply {
    /// JSON body, labelled the way real Milvus labels it (`text/plain`)
    pub fn json(value: Value) -> Self {
        Self {
            status: StatusCode::OK,
            content_type: "text/plain; charset=utf-8".to_string(),
            body: value.to_string(),
            delay: None,
        }
    }

    /// 200 with no body at all
    pub fn empty() -> Self {
        Self {
            status: StatusCode::OK,
            content_type: "text/plain; charset=utf-8".to_string(),
            body: String::new(),
            delay: None,
        }
    }

    pub fn raw(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..Self::empty()
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Hold the response back, e.g. to trigger client timeouts
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// One request as seen by the mock
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub collection: String,
    pub query: Option<String>,
    pub body: Option<Value>,
}

struct MockState {
    vectors_reply: Mutex<MockReply>,
    search_reply: Mutex<MockReply>,
    requests: Mutex<Vec<RecordedRequest>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockState {
    fn record(&self, request: RecordedRequest) {
        self.requests
            .lock()
            .expect("mock request log poisoned")
            .push(request);
    }
}

// Keeps the in-flight gauge right even when the client hangs up mid-request
struct InFlight<'a>(&'a MockState);

impl<'a> InFlight<'a> {
    fn enter(state: &'a MockState) -> Self {
        let now = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        state.max_in_flight.fetch_max(now, Ordering::SeqCst);
        Self(state)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// In-process fake Milvus server
///
/// The server stops when this value is dropped.
///
/// # Example
///
/// ```no_run
/// use serde_json::json;
/// use test_utils::{MockMilvus, MockReply};
///
/// # async fn example() {
/// let milvus = MockMilvus::start().await;
/// milvus.set_vectors_reply(MockReply::json(json!({"vectors": [{"vector": [0.1, 0.2]}]})));
///
/// let base_url = milvus.base_url();
/// // point the client at base_url ...
/// assert!(milvus.requests().is_empty());
/// # }
/// ```
pub struct MockMilvus {
    addr: SocketAddr,
    state: Arc<MockState>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl MockMilvus {
    /// Bind on an ephemeral localhost port and start serving.
    ///
    /// Both endpoints answer with an empty body until scripted.
    pub async fn start() -> Self {
        let state = Arc::new(MockState {
            vectors_reply: Mutex::new(MockReply::empty()),
            search_reply: Mutex::new(MockReply::empty()),
            requests: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        });

        let app = Router::new()
            .route(
                "/collections/{collection}/vectors",
                get(get_vectors).put(search_vectors),
            )
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock Milvus listener");
        let addr = listener
            .local_addr()
            .expect("Failed to read mock Milvus address");

        let (tx, rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = rx.await;
                })
                .await;
        });

        tracing::debug!("Mock Milvus listening on {}", addr);

        Self {
            addr,
            state,
            shutdown: Some(tx),
        }
    }

    /// `http://127.0.0.1:{port}`
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn set_vectors_reply(&self, reply: MockReply) {
        *self
            .state
            .vectors_reply
            .lock()
            .expect("mock reply poisoned") = reply;
    }

    pub fn set_search_reply(&self, reply: MockReply) {
        *self
            .state
            .search_reply
            .lock()
            .expect("mock reply poisoned") = reply;
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state
            .requests
            .lock()
            .expect("mock request log poisoned")
            .clone()
    }

    /// JSON body of the most recent search (PUT) request
    pub fn last_search_body(&self) -> Option<Value> {
        self.requests()
            .into_iter()
            .rev()
            .find(|r| r.method == "PUT")
            .and_then(|r| r.body)
    }

    /// Highest number of requests the mock was serving at the same time
    pub fn max_in_flight(&self) -> usize {
        self.state.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Drop for MockMilvus {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn get_vectors(
    State(state): State<Arc<MockState>>,
    Path(collection): Path<String>,
    RawQuery(query): RawQuery,
) -> Response {
    state.record(RecordedRequest {
        method: "GET",
        collection,
        query,
        body: None,
    });
    let reply = state
        .vectors_reply
        .lock()
        .expect("mock reply poisoned")
        .clone();
    respond(&state, reply).await
}

async fn search_vectors(
    State(state): State<Arc<MockState>>,
    Path(collection): Path<String>,
    body: Bytes,
) -> Response {
    state.record(RecordedRequest {
        method: "PUT",
        collection,
        query: None,
        body: serde_json::from_slice(&body).ok(),
    });
    let reply = state
        .search_reply
        .lock()
        .expect("mock reply poisoned")
        .clone();
    respond(&state, reply).await
}

async fn respond(state: &MockState, reply: MockReply) -> Response {
    let _in_flight = InFlight::enter(state);
    if let Some(delay) = reply.delay {
        tokio::time::sleep(delay).await;
    }

    (
        reply.status,
        [(header::CONTENT_TYPE, reply.content_type)],
        reply.body,
    )
        .into_response()
}
