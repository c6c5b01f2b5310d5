//! Mock Vault Server
//!
//! Axum server implementing the three `sys` endpoints the unsealer uses:
//! - `GET /v1/sys/seal-status`
//! - `PUT /v1/sys/unseal`
//! - `GET /v1/sys/health`
//!
//! Bound to an ephemeral port on localhost so tests can run in parallel.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, put},
    Router,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::net::TcpListener;

#[derive(Debug, serde::Deserialize)]
struct UnsealBody {
    key: String,
}

#[derive(Debug)]
struct Seal {
    sealed: bool,
    threshold: u32,
    progress: u32,
}

/// Shared state of the mock server
#[derive(Debug)]
pub struct MockVaultState {
    seal: Mutex<Seal>,
    /// Keys received on `/v1/sys/unseal`, in order
    pub received_keys: Mutex<Vec<String>>,
    /// Seal status requests answered with 503 before the real answer
    status_failures: AtomicUsize,
    /// Serve an unparseable seal status body
    garbage_status: bool,
    /// Status code of `/v1/sys/health`
    health_code: u16,
    pub status_hits: AtomicUsize,
    pub health_hits: AtomicUsize,
}

impl MockVaultState {
    pub fn sealed(threshold: u32) -> Self {
        Self {
            seal: Mutex::new(Seal {
                sealed: true,
                threshold,
                progress: 0,
            }),
            received_keys: Mutex::new(Vec::new()),
            status_failures: AtomicUsize::new(0),
            garbage_status: false,
            health_code: 503,
            status_hits: AtomicUsize::new(0),
            health_hits: AtomicUsize::new(0),
        }
    }

    /// Answer seal status queries with a body that is not JSON
    pub fn with_garbage_status(mut self) -> Self {
        self.garbage_status = true;
        self
    }

    pub fn with_health_code(mut self, code: u16) -> Self {
        self.health_code = code;
        self
    }

    /// Answer the first `count` seal status queries with 503
    pub fn with_status_failures(self, count: usize) -> Self {
        self.status_failures.store(count, Ordering::SeqCst);
        self
    }

    pub fn is_sealed(&self) -> bool {
        self.seal.lock().unwrap_or_else(PoisonError::into_inner).sealed
    }

    pub fn keys(&self) -> Vec<String> {
        self.received_keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// A running mock server
pub struct MockVault {
    pub state: Arc<MockVaultState>,
    pub port: u16,
}

impl MockVault {
    pub fn endpoint(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }
}

/// Start a mock Vault on an ephemeral port
pub async fn start(state: MockVaultState) -> MockVault {
    let state = Arc::new(state);
    let app = Router::new()
        .route("/v1/sys/seal-status", get(seal_status))
        .route("/v1/sys/unseal", put(unseal))
        .route("/v1/sys/health", get(health))
        .with_state(Arc::clone(&state));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock vault");
    let port = listener.local_addr().expect("local addr").port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock vault server");
    });

    MockVault { state, port }
}

/// A localhost port with nothing listening on it
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe listener");
    listener.local_addr().expect("local addr").port()
}

fn seal_body(seal: &Seal) -> Json<serde_json::Value> {
    Json(json!({
        "type": "shamir",
        "initialized": true,
        "sealed": seal.sealed,
        "t": seal.threshold,
        "n": 5,
        "progress": seal.progress,
        "version": "1.15.2",
    }))
}

async fn seal_status(State(state): State<Arc<MockVaultState>>) -> Response {
    state.status_hits.fetch_add(1, Ordering::SeqCst);

    let failing = state
        .status_failures
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    if failing {
        return (StatusCode::SERVICE_UNAVAILABLE, "Vault is busy").into_response();
    }
    if state.garbage_status {
        return (StatusCode::OK, "<html>not vault</html>").into_response();
    }

    let seal = state.seal.lock().unwrap_or_else(PoisonError::into_inner);
    seal_body(&seal).into_response()
}

async fn unseal(
    State(state): State<Arc<MockVaultState>>,
    Json(body): Json<UnsealBody>,
) -> Response {
    state
        .received_keys
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(body.key);

    let mut seal = state.seal.lock().unwrap_or_else(PoisonError::into_inner);
    if seal.sealed {
        seal.progress += 1;
        if seal.progress >= seal.threshold {
            seal.sealed = false;
            seal.progress = 0;
        }
    }
    seal_body(&seal).into_response()
}

async fn health(State(state): State<Arc<MockVaultState>>) -> Response {
    state.health_hits.fetch_add(1, Ordering::SeqCst);
    let code = StatusCode::from_u16(state.health_code).unwrap_or(StatusCode::OK);
    (code, Json(json!({ "initialized": true }))).into_response()
}
