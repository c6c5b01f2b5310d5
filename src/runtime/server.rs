//! # Metrics and Probe Server
//!
//! Small HTTP server for long-running watch deployments:
//! - `GET /metrics` - Prometheus text exposition
//! - `GET /healthz` - liveness, always `ok` while the process runs
//! - `GET /readyz` - readiness, `ok` once the server is bound

use crate::observability::metrics;
use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared state of the probe server
#[derive(Debug, Default)]
pub struct ServerState {
    pub is_ready: AtomicBool,
}

/// Routes served by the probe server
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the probe server on all interfaces
pub async fn bind_server(port: u16) -> Result<TcpListener> {
    TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind metrics server on port {port}"))
}

/// Serve until `cancel` fires
///
/// Readiness is reported as soon as the listener is serving.
pub async fn start_server(
    listener: TcpListener,
    state: Arc<ServerState>,
    cancel: CancellationToken,
) -> Result<()> {
    let addr = listener.local_addr().context("Listener has no local address")?;
    info!("Metrics server listening on {}", addr);

    state.is_ready.store(true, Ordering::Relaxed);
    axum::serve(listener, router(Arc::clone(&state)))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .context("Metrics server failed")?;

    state.is_ready.store(false, Ordering::Relaxed);
    Ok(())
}

async fn metrics_handler() -> Response {
    match metrics::gather_metrics() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to gather metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn healthz() -> &'static str {
    "ok"
}

async fn readyz(State(state): State<Arc<ServerState>>) -> Response {
    if state.is_ready.load(Ordering::Relaxed) {
        (StatusCode::OK, "ok").into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not ready").into_response()
    }
}
