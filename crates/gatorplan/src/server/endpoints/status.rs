use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::Arc;

use crate::types::AppState;

/// GET /health
pub async fn get_health(State(s): State<Arc<AppState>>) -> Response {
    let catalog = s.selector.catalog();

    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "colleges": catalog.college_codes(),
            "prerequisite_entries": s.selector.prerequisites().len(),
            "uptime_secs": s.uptime().as_secs(),
        })),
    )
        .into_response()
}
