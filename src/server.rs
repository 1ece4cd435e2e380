//! ==============================================================================
//! server.rs - http api
//! ==============================================================================
//!
//! routes:
//!     GET /reading   one simulated temperature/humidity sample
//!     GET /stream    ndjson, one sample per stream interval, until disconnect
//!     GET /snapshot  fresh capture, image/jpeg
//!     GET /metrics   brightness from the last snapshot (never fails)
//!     GET /config    static identity + capabilities for discovery
//!     GET /health    uptime and last snapshot outcome
//!
//! ==============================================================================

use crate::brightness;
use crate::camera::SnapshotError;
use crate::domain::{ApiError, ConfigReport, HealthReport, Metric, Reading};
use crate::sensor;
use crate::state::SharedState;
use crate::stream;

use anyhow::Result;
use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/reading", get(reading_handler))
        .route("/stream", get(stream_handler))
        .route("/snapshot", get(snapshot_handler))
        .route("/metrics", get(metrics_handler))
        .route("/config", get(config_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run_server(state: SharedState, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("[SERVER] ✓ listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn reading_handler() -> Json<Reading> {
    Json(sensor::generate_reading())
}

async fn stream_handler(State(state): State<SharedState>) -> Response {
    let feed = stream::reading_feed(state.stream_interval);
    (
        [(header::CONTENT_TYPE, "application/json")],
        Body::from_stream(feed),
    )
        .into_response()
}

async fn snapshot_handler(State(state): State<SharedState>) -> Result<Response, SnapshotError> {
    let jpeg = state.camera.capture(&state.snapshot).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "image/jpeg"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"snapshot.jpg\""),
        ],
        jpeg,
    )
        .into_response())
}

async fn metrics_handler(State(state): State<SharedState>) -> Json<Metric> {
    let ts = sensor::now_secs();
    let path = state.snapshot.read().await.path.clone();
    let brightness = brightness::brightness_or_fallback(&path).await;
    Json(Metric { ts, brightness })
}

async fn config_handler(State(state): State<SharedState>) -> Json<ConfigReport> {
    Json(state.config_report())
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthReport> {
    Json(state.health_report().await)
}

impl IntoResponse for SnapshotError {
    fn into_response(self) -> Response {
        let (status, code) = if self.is_capture_failure() {
            (StatusCode::INTERNAL_SERVER_ERROR, "CAPTURE_FAILED")
        } else {
            (StatusCode::SERVICE_UNAVAILABLE, "CAMERA_UNAVAILABLE")
        };
        let body = ApiError { error: code.to_string(), message: self.to_string() };
        (status, Json(body)).into_response()
    }
}
