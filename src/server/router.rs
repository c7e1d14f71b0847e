use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{Router, routing::get};

use super::playlist_router;
use crate::engine::PlaylistEngine;
use crate::identity::OWNER_HEADER;
use crate::store::Store;

pub struct AppState {
    pub engine: PlaylistEngine,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            engine: PlaylistEngine::new(store),
        }
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let owner = request
        .headers()
        .get(OWNER_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_owned();
    let start = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        %method,
        path = %path,
        owner = %owner,
        status = response.status().as_u16(),
        latency_ms = start.elapsed().as_millis() as u64,
        "request"
    );

    response
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", playlist_router())
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
