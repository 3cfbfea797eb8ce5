//! HTTP server for the emoji cache
//!
//! `/` lists cached emoji, `/_health` reports status, and every other GET is
//! a read-through fetch of the same path from upstream.

use crate::error::Result;
use crate::fetcher::EmojiFetcher;
use crate::landing::{cached_paths, render_landing};
use crate::types::HealthResponse;
use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

/// Status endpoint, outside the upstream host's path space
pub const HEALTH_PATH: &str = "/_health";

/// Browser cache lifetime for served emoji (one week)
pub const CACHE_CONTROL_VALUE: &str = "max-age=604800";

/// Shared state for the HTTP server
pub struct ServerState {
    pub fetcher: EmojiFetcher,
    pub public_url: Option<String>,
    pub started_at: DateTime<Utc>,
}

impl ServerState {
    pub fn new(fetcher: EmojiFetcher, public_url: Option<String>) -> Self {
        Self {
            fetcher,
            public_url,
            started_at: Utc::now(),
        }
    }
}

pub type SharedState = Arc<ServerState>;

/// Create the HTTP router
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(landing))
        .route(HEALTH_PATH, get(health))
        .route("/{*path}", get(fetch_emoji))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server and run until Ctrl-C
pub async fn start_server(state: SharedState, host: &str, port: u16) -> std::io::Result<()> {
    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    info!("Server started at http://{}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

/// Landing page listing every cached emoji
async fn landing(State(state): State<SharedState>) -> Result<Html<String>> {
    let paths = cached_paths(state.fetcher.store()).await?;
    Ok(Html(render_landing(&paths, state.public_url.as_deref())))
}

/// Health check endpoint
async fn health(State(state): State<SharedState>) -> Result<Json<HealthResponse>> {
    let cached_entries = state.fetcher.store().list_keys().await?.len();
    let uptime_secs = (Utc::now() - state.started_at).num_seconds() as u64;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs,
        cached_entries,
        blocked_paths: state.fetcher.blocking().len(),
    }))
}

/// Read-through fetch of the request path (and query) from upstream
async fn fetch_emoji(State(state): State<SharedState>, uri: Uri) -> Result<Response> {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());

    let outcome = state.fetcher.fetch(path).await?;
    let status = StatusCode::from_u16(outcome.status).unwrap_or(StatusCode::BAD_GATEWAY);

    Ok(Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, outcome.content_type)
        .header(header::CACHE_CONTROL, CACHE_CONTROL_VALUE)
        .header("X-Cache", outcome.source.as_header())
        .body(Body::from(outcome.body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()))
}
