//! Mock Kubernetes API Server
//!
//! Axum server answering `GET /api/v1/namespaces/{namespace}/pods` with a
//! fixed pod list, an error `Status`, or a response that never arrives in time.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::net::TcpListener;
use vault_unsealer::config::UnsealerConfig;
use vault_unsealer::discovery::KubeDirectory;

/// How the pod list endpoint answers
#[derive(Debug, Clone)]
pub enum PodListReply {
    /// `PodList` with these items
    Pods(Vec<serde_json::Value>),
    /// `Status` failure with this HTTP code
    Failure(u16),
    /// Answer only after this delay
    Stall(Duration),
}

#[derive(Debug)]
struct ApiState {
    reply: PodListReply,
    /// `(namespace, labelSelector)` of every list call
    requests: Mutex<Vec<(String, String)>>,
}

/// A running mock API server
#[derive(Debug)]
pub struct MockApiServer {
    state: Arc<ApiState>,
    pub port: u16,
}

impl MockApiServer {
    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    pub fn requests(&self) -> Vec<(String, String)> {
        self.state
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// A directory talking to this server with the given list timeout
    pub fn directory(&self, discovery_timeout: Duration) -> KubeDirectory {
        vault_unsealer::runtime::install_crypto_provider();
        let uri = self.url().parse().expect("valid api server url");
        let client = kube::Client::try_from(kube::Config::new(uri)).expect("kube client builds");
        let config = UnsealerConfig {
            discovery_timeout,
            ..UnsealerConfig::default()
        };
        KubeDirectory::new(client, &config)
    }
}

/// Running Vault pod as returned by the API server
pub fn running_pod(name: &str, ip: &str) -> serde_json::Value {
    pod(name, "Running", ip)
}

pub fn pod(name: &str, phase: &str, ip: &str) -> serde_json::Value {
    json!({
        "apiVersion": "v1",
        "kind": "Pod",
        "metadata": { "name": name, "namespace": "vault" },
        "status": { "phase": phase, "podIP": ip },
    })
}

/// Start a mock API server on an ephemeral port
pub async fn start(reply: PodListReply) -> MockApiServer {
    let state = Arc::new(ApiState {
        reply,
        requests: Mutex::new(Vec::new()),
    });
    let app = Router::new()
        .route("/api/v1/namespaces/{namespace}/pods", get(list_pods))
        .with_state(Arc::clone(&state));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock api server");
    let port = listener.local_addr().expect("local addr").port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock api server");
    });

    MockApiServer { state, port }
}

async fn list_pods(
    State(state): State<Arc<ApiState>>,
    Path(namespace): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let selector = query.get("labelSelector").cloned().unwrap_or_default();
    state
        .requests
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push((namespace, selector));

    match &state.reply {
        PodListReply::Pods(items) => Json(json!({
            "apiVersion": "v1",
            "kind": "PodList",
            "metadata": { "resourceVersion": "1" },
            "items": items,
        }))
        .into_response(),
        PodListReply::Failure(code) => {
            let status = StatusCode::from_u16(*code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let body = json!({
                "kind": "Status",
                "apiVersion": "v1",
                "metadata": {},
                "status": "Failure",
                "message": "pods is forbidden: User \"system:serviceaccount:vault:unsealer\" cannot list resource \"pods\"",
                "reason": status.canonical_reason().unwrap_or("Failure"),
                "code": code,
            });
            (status, Json(body)).into_response()
        }
        PodListReply::Stall(delay) => {
            tokio::time::sleep(*delay).await;
            Json(json!({
                "apiVersion": "v1",
                "kind": "PodList",
                "metadata": {},
                "items": [],
            }))
            .into_response()
        }
    }
}
