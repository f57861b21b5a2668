//! HTTP API
//!
//! Every endpoint answers with a JSON object carrying a boolean `result`.
//! Rejected requests get 400 with the reason in `error`; internal failures
//! get 500 with a generic message and are logged in full.

use crate::app::App;
use crate::commands::cmd_statistics;
use crate::error::{Error, Result};
use crate::search::SearchRequest;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Message returned in place of internal error details
pub const INTERNAL_ERROR: &str = "Internal server error";

/// Error wrapper that renders as an API response
#[derive(Debug)]
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = if self.0.is_rejection() {
            (StatusCode::BAD_REQUEST, self.0.to_string())
        } else {
            error!("Request failed: {}", self.0);
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR.to_string())
        };
        (status, Json(json!({ "result": false, "error": message }))).into_response()
    }
}

type ApiResult = std::result::Result<Json<Value>, ApiError>;

#[derive(Debug, Deserialize)]
struct IndexPageParams {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    query: Option<String>,
    site: Option<String>,
    offset: Option<i64>,
    limit: Option<i64>,
}

/// Build the API router over a wired application
pub fn build_router(app: App) -> Router {
    Router::new()
        .route("/api/statistics", get(statistics))
        .route("/api/startIndexing", get(start_indexing))
        .route("/api/stopIndexing", get(stop_indexing))
        .route("/api/indexPage", post(index_page))
        .route("/api/search", get(search))
        .layer(TraceLayer::new_for_http())
        .with_state(app)
}

/// Serve the API until Ctrl-C, then wind down any running indexing
pub async fn serve(app: App) -> Result<()> {
    let listener = TcpListener::bind(&app.config.server.bind).await?;
    info!("Server running at http://{}", listener.local_addr()?);

    let indexing = app.indexing.clone();
    let grace = Duration::from_secs(app.config.server.shutdown_grace_secs);

    axum::serve(listener, build_router(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    indexing.shutdown(grace).await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}

async fn statistics(State(app): State<App>) -> ApiResult {
    let report = cmd_statistics(&app).await?;
    Ok(Json(json!({ "result": true, "statistics": report })))
}

async fn start_indexing(State(app): State<App>) -> ApiResult {
    if !app.indexing.start().await {
        return Err(Error::IndexingAlreadyRunning.into());
    }
    Ok(Json(json!({ "result": true })))
}

async fn stop_indexing(State(app): State<App>) -> ApiResult {
    if !app.indexing.stop() {
        return Err(Error::IndexingNotRunning.into());
    }
    Ok(Json(json!({ "result": true })))
}

async fn index_page(State(app): State<App>, Query(params): Query<IndexPageParams>) -> ApiResult {
    let url = params.url.unwrap_or_default();
    app.indexing.index_single_page(&url).await?;
    Ok(Json(json!({ "result": true })))
}

async fn search(State(app): State<App>, Query(params): Query<SearchParams>) -> ApiResult {
    let request = SearchRequest {
        query: params.query.unwrap_or_default(),
        site: params.site,
        offset: params.offset.unwrap_or(0),
        limit: params.limit.unwrap_or(app.config.search.default_limit),
    };
    let results = app.search.search(&request).await?;
    Ok(Json(json!({
        "result": true,
        "count": results.count,
        "data": results.data,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_maps_to_bad_request() {
        let response = ApiError(Error::EmptyQuery).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_error_maps_to_server_error() {
        let response = ApiError(Error::Crawl("boom".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
