// =============================================================================
// error.rs — WHEN THE WHOLE REQUEST GOES WRONG
// =============================================================================
//
// Request-level failures only. Per-peer fetch failures never get this far;
// they are absorbed by the fallback chain in `scan`. Whatever does get here
// goes out as `500 {"error": "..."}`.
// =============================================================================

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ScanError {
    /// The query string could not be parsed.
    #[error("invalid request: {0}")]
    BadRequest(String),

    /// Anything else that kept the scan from finishing.
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ScanError {
    fn into_response(self) -> Response {
        error!(error = %self, "Competitor scan failed");
        let message = match self.to_string() {
            m if m.is_empty() => "server error".to_string(),
            m => m,
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": message }))).into_response()
    }
}
