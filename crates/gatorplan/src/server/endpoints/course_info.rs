//! API endpoints for catalog course info and its cache.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::requirements::normalize;
use crate::server::types::ApiErrorType;
use crate::types::AppState;

/// Body for `POST /course_info/invalidate_cache`. Without a code the whole
/// cache is cleared.
#[derive(Debug, Default, Deserialize)]
pub struct InvalidateBody {
    pub code: Option<String>,
}

/// GET /course_info/:code
///
/// Always answers with a record; `source` is `placeholder` when the catalog
/// could not be reached or does not list the course.
pub async fn get_course_info(
    Path(code): Path<String>,
    State(s): State<Arc<AppState>>,
) -> Response {
    info!(code = %code, "GET /course_info/:code");

    if normalize(&code).is_none() {
        return ApiErrorType::from((StatusCode::BAD_REQUEST, "Course code is blank", None))
            .into_response();
    }

    let course_info = s.catalog_client.lookup(&code).await;
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "course_info": course_info,
        })),
    )
        .into_response()
}

/// GET /course_info/cache_stats
pub async fn get_cache_stats(State(s): State<Arc<AppState>>) -> Response {
    (StatusCode::OK, Json(s.catalog_client.cache_stats())).into_response()
}

/// POST /course_info/invalidate_cache
pub async fn invalidate_cache(
    State(s): State<Arc<AppState>>,
    body: Option<Json<InvalidateBody>>,
) -> Response {
    let body = body.map(|Json(b)| b).unwrap_or_default();

    match body.code.as_deref() {
        Some(code) => {
            info!(code = %code, "POST /course_info/invalidate_cache");
            if !s.catalog_client.invalidate(code) {
                return ApiErrorType::from((StatusCode::BAD_REQUEST, "Course code is blank", None))
                    .into_response();
            }
        }
        None => {
            info!("POST /course_info/invalidate_cache - clearing all entries");
            s.catalog_client.clear_cache();
        }
    }

    (
        StatusCode::OK,
        Json(json!({
            "message": "Cache invalidated",
            "stats": s.catalog_client.cache_stats(),
        })),
    )
        .into_response()
}
