//! Control server for the indexer
//!
//! Exposes reindexing over HTTP so operators can rebuild indexes without
//! publishing synthetic events.

use crate::dispatch::{IndexerGroup, ReindexReport};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Query parameters of `POST /reindex`
#[derive(Debug, Default, Deserialize)]
pub struct ReindexParams {
    /// Resource to start from; the repository root when absent
    pub uri: Option<String>,
    /// Follow `hasChild` links, defaults to true
    pub recursive: Option<bool>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub repository_url: String,
    pub indexers: Vec<String>,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub struct AppState {
    pub group: Arc<IndexerGroup>,
}

/// Custom error type for API errors
pub enum ApiError {
    BadRequest(String),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

/// Create the router with all routes
pub fn create_router(group: Arc<IndexerGroup>) -> Router {
    let state = Arc::new(AppState { group });

    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/reindex", post(reindex))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// GET /health
async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        repository_url: state.group.repository_url().to_string(),
        indexers: state.group.indexers().iter().map(|i| i.name().to_string()).collect(),
    })
}

/// POST /reindex?uri=..&recursive=..
async fn reindex(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReindexParams>,
) -> Result<Json<ReindexReport>, ApiError> {
    let uri = match params.uri {
        Some(uri) if uri.trim().is_empty() => {
            return Err(ApiError::BadRequest("uri must not be blank".to_string()))
        }
        Some(uri) => uri,
        None => state.group.repository_url().to_string(),
    };
    let recursive = params.recursive.unwrap_or(true);

    tracing::info!(uri = %uri, recursive, "Reindex requested");
    let group = Arc::clone(&state.group);
    let report = tokio::task::spawn_blocking(move || group.reindex(&uri, recursive))
        .await
        .map_err(|e| ApiError::InternalError(format!("reindex task failed: {}", e)))?;

    Ok(Json(report))
}

/// Serve the control endpoints on `addr` until `shutdown` resolves.
pub async fn start_server_with_shutdown(
    addr: &str,
    group: Arc<IndexerGroup>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(group);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr, "Control server listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    Ok(())
}
