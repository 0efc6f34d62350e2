//! System and health endpoints.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use utoipa::OpenApi;

use crate::state::AppState;

use super::ApiDoc;
use super::types::HealthResponse;

/// Check server health.
///
/// Returns server status, version, and headline store counts.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Server is healthy", body = HealthResponse),
    ),
    tag = "System"
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = state.store();
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_secs(),
        users: store.user_count(),
        subscribers: store.subscriber_count(),
        posts: store.post_count(),
        active_sessions: state.sessions().active_count(),
    })
}

/// Prometheus-compatible metrics endpoint.
pub async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.store();
    let body = state.metrics().render(
        store.user_count(),
        store.subscriber_count(),
        store.post_count(),
        store.rating_count(),
        state.sessions().active_count(),
        state.uptime_secs(),
    );

    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        body,
    )
}

/// Machine-readable API description.
pub async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
