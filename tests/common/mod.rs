//! Shared test helpers: stub MCP backends bound to ephemeral ports

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::response::IntoResponse;
use axum::{Json, Router, extract::State, routing::post};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use url::Url;

/// How the stub backend answers `POST /mcp`
#[derive(Clone)]
pub enum StubBehavior {
    /// Answer with a fixed JSON-RPC result
    Result(Value),
    /// Answer with a JSON-RPC error envelope
    RpcError {
        /// JSON-RPC error code
        code: i32,
        /// JSON-RPC error message
        message: String,
    },
    /// Sleep before answering (for timeout tests)
    Delay(Duration, Value),
    /// Answer with a body that is not a JSON-RPC envelope
    Garbage,
}

/// Handle to a running stub backend
pub struct StubBackend {
    /// Base URL of the stub
    pub url: Url,
    calls: Arc<AtomicU64>,
    requests: Arc<Mutex<Vec<Value>>>,
}

impl StubBackend {
    /// Number of requests that reached the stub
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Raw JSON-RPC request bodies received, in order
    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }
}

#[derive(Clone)]
struct StubState {
    behavior: StubBehavior,
    calls: Arc<AtomicU64>,
    requests: Arc<Mutex<Vec<Value>>>,
}

/// Spawn a stub MCP backend on an ephemeral port
pub async fn spawn_stub(behavior: StubBehavior) -> StubBackend {
    let calls = Arc::new(AtomicU64::new(0));
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = StubState {
        behavior,
        calls: Arc::clone(&calls),
        requests: Arc::clone(&requests),
    };

    let app = Router::new()
        .route("/mcp", post(stub_handler))
        .with_state(state);

    let addr = spawn_app(app).await;

    StubBackend {
        url: Url::parse(&format!("http://{addr}")).unwrap(),
        calls,
        requests,
    }
}

/// Serve an axum router on an ephemeral port, returning its address
pub async fn spawn_app(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn stub_handler(
    State(state): State<StubState>,
    Json(request): Json<Value>,
) -> axum::response::Response {
    state.calls.fetch_add(1, Ordering::SeqCst);
    state.requests.lock().unwrap().push(request.clone());

    let id = request.get("id").cloned().unwrap_or(Value::Null);

    match &state.behavior {
        StubBehavior::Result(value) => {
            Json(json!({ "jsonrpc": "2.0", "id": id, "result": value })).into_response()
        }
        StubBehavior::RpcError { code, message } => Json(json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": code, "message": message },
        }))
        .into_response(),
        StubBehavior::Delay(duration, value) => {
            tokio::time::sleep(*duration).await;
            Json(json!({ "jsonrpc": "2.0", "id": id, "result": value })).into_response()
        }
        StubBehavior::Garbage => "definitely not a JSON-RPC envelope".into_response(),
    }
}
