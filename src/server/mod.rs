pub mod error;
pub mod handlers;
pub mod models;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::detection::DetectionPipeline;
use crate::readiness::ModelReadiness;

pub const DEFAULT_BODY_LIMIT: usize = crate::config::DEFAULT_MAX_BODY_MB * 1024 * 1024;

/// Shared state injected into every handler
#[derive(Clone)]
pub struct AppState {
    pub readiness: Arc<ModelReadiness>,
    pub pipeline: Arc<DetectionPipeline>,
}

impl AppState {
    pub fn new(readiness: Arc<ModelReadiness>, pipeline: DetectionPipeline) -> Self {
        Self {
            readiness,
            pipeline: Arc::new(pipeline),
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    create_app_with_limit(state, DEFAULT_BODY_LIMIT)
}

pub fn create_app_with_limit(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/detect", post(handlers::detect))
        .route("/api/preload", get(handlers::preload))
        .route("/api/status", get(handlers::status))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(app: Router, addr: SocketAddr) -> anyhow::Result<()> {
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("API endpoint: http://{}/api/detect", addr);
    tracing::info!("Model status: http://{}/api/status", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
