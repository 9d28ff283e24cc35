// GET handlers: version, current metrics, history, summary

use axum::{Json, extract::State, response::IntoResponse};

use super::AppState;
use crate::version::{NAME, VERSION};

/// GET /version — returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/metrics — a fresh snapshot (also folded into history).
pub(super) async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.broadcaster.collector().collect().await)
}

pub(super) async fn cpu_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.broadcaster.collector().collect().await.cpu)
}

pub(super) async fn memory_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.broadcaster.collector().collect().await.memory)
}

pub(super) async fn disk_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.broadcaster.collector().collect().await.disk)
}

/// GET /api/metrics/history — every series, oldest first.
pub(super) async fn history_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.broadcaster.collector().history())
}

pub(super) async fn summary_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.broadcaster.collector().summary())
}
