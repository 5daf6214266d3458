use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::{
    Json, Router,
    extract::{ConnectInfo, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::debug;

/// Health and readiness endpoints.
///
/// `/ready` reports 503 until the first reconciliation pass has finished.
pub fn app(
    cargo_pkg_name: &'static str,
    cargo_pkg_version: &'static str,
    ready: Arc<AtomicBool>,
) -> Router {
    Router::new()
        .route(
            "/",
            get(move |connect_info| root_handler(cargo_pkg_name, cargo_pkg_version, connect_info)),
        )
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .fallback(not_found_handler)
        .with_state(ready)
        .layer(TraceLayer::new_for_http())
}

#[tracing::instrument(name = "root_handler", skip_all)]
async fn root_handler(
    cargo_pkg_name: &'static str,
    cargo_pkg_version: &'static str,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> impl IntoResponse {
    debug!(%addr, "client connected");
    Json(json!({
        "service": cargo_pkg_name,
        "version": cargo_pkg_version,
        "status": "ok"
    }))
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "healthy" }))
}

async fn ready_handler(State(ready): State<Arc<AtomicBool>>) -> impl IntoResponse {
    if ready.load(Ordering::Acquire) {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "starting" })),
        )
    }
}

async fn not_found_handler() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "nothing to see here")
}
