// HTTP + WebSocket routes: thin view layer over the collector and broadcaster

mod http;
mod ws;

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::broadcaster::Broadcaster;
use crate::config::AppConfig;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) broadcaster: Arc<Broadcaster>,
    pub(crate) config: AppConfig,
}

pub fn app(broadcaster: Arc<Broadcaster>, config: AppConfig) -> Router {
    let state = AppState {
        broadcaster,
        config,
    };
    Router::new()
        .route("/", get(|| async { "System Viewer" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/metrics", get(http::metrics_handler)) // GET /api/metrics
        .route("/api/metrics/cpu", get(http::cpu_handler)) // GET /api/metrics/cpu
        .route("/api/metrics/memory", get(http::memory_handler)) // GET /api/metrics/memory
        .route("/api/metrics/disk", get(http::disk_handler)) // GET /api/metrics/disk
        .route("/api/metrics/history", get(http::history_handler)) // GET /api/metrics/history
        .route("/api/metrics/summary", get(http::summary_handler)) // GET /api/metrics/summary
        .route("/ws", get(ws::ws_metrics)) // WS /ws
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
