// =============================================================================
// server.rs — THE FRONT DOOR
// =============================================================================
//
// Routes:
//
//   GET     /api/competitor-scan   run a scan (brand, region, category)
//   OPTIONS <any>                  answered by the CORS layer, empty 200
//   GET     /api/categories        the peer catalog
//   GET     /healthz               liveness
//   GET     /metrics               counters + breaker state as JSON
//
// Every response, errors included, carries the three CORS headers (any
// origin, GET/OPTIONS, Content-Type/Authorization), so browser dashboards
// can call us directly. `CorsLayer` alone only sends the methods and headers
// lists on preflights, hence the two overriding header layers.
// =============================================================================

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::catalog::{self, CategoryEntry};
use crate::error::ScanError;
use crate::metrics::MetricsSnapshot;
use crate::models::{ScanParams, ScanReport, ScanRequest};
use crate::scan::CompetitorScanner;

#[derive(Clone)]
pub struct AppState {
    pub scanner: Arc<CompetitorScanner>,
}

impl AppState {
    pub fn new(scanner: Arc<CompetitorScanner>) -> Self {
        Self { scanner }
    }
}

const ALLOWED_METHODS: &str = "GET, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type, Authorization";

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/api/competitor-scan", get(competitor_scan))
        .route("/api/categories", get(list_categories))
        .route("/healthz", get(health))
        .route("/metrics", get(metrics))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        ))
        .with_state(state)
}

/// Serve until Ctrl+C.
pub async fn run_server(listener: TcpListener, state: AppState) -> anyhow::Result<()> {
    info!(addr = %listener.local_addr()?, "Competitor scan server listening");
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received, draining in-flight scans"),
        Err(e) => tracing::error!(error = %e, "Signal listener failed, shutting down"),
    }
}

async fn competitor_scan(
    State(state): State<AppState>,
    params: Result<Query<ScanParams>, QueryRejection>,
) -> Result<Json<ScanReport>, ScanError> {
    let metrics = state.scanner.metrics();
    metrics.increment_scans();

    let result = run_scan(&state, params).await;
    if result.is_err() {
        metrics.increment_scan_failures();
    }
    result.map(Json)
}

async fn run_scan(
    state: &AppState,
    params: Result<Query<ScanParams>, QueryRejection>,
) -> Result<ScanReport, ScanError> {
    let Query(params) = params.map_err(|e| ScanError::BadRequest(e.body_text()))?;
    let request = ScanRequest::from(params);

    // A panic inside the scan becomes a 500, not a dropped connection.
    let scanner = state.scanner.clone();
    tokio::spawn(async move { scanner.scan(&request).await })
        .await
        .map_err(|e| ScanError::Internal(e.to_string()))
}

async fn list_categories() -> Json<Vec<CategoryEntry>> {
    Json(catalog::categories())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    let scanner = &state.scanner;
    Json(scanner.metrics().snapshot(scanner.breaker_snapshot()))
}
