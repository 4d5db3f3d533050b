//! API endpoints for stateless recommendations and requirement progress.
//!
//! Completed courses arrive as a comma separated `classes` query value.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::catalog_info::{CatalogClient, CourseInfo};
use crate::requirements::{
    normalize, CategorySummary, CompletedSet, CourseCode, RecommendLimits,
    Recommendation,
};
use crate::server::types::ApiErrorType;
use crate::server::util::{parse_category, split_classes, CategoryParam};
use crate::types::AppState;

/// Query parameters for `GET /recommendations`.
#[derive(Debug, Default, Deserialize)]
pub struct RecommendParams {
    #[serde(default)]
    pub college: String,
    #[serde(default)]
    pub classes: String,
    pub category: Option<String>,
    pub per_category_limit: Option<usize>,
    pub category_limit: Option<usize>,
    /// If true, attach catalog info for every recommended code
    #[serde(default)]
    pub details: bool,
}

impl RecommendParams {
    fn limits(&self) -> RecommendLimits {
        let defaults = RecommendLimits::default();
        RecommendLimits {
            per_category: self.per_category_limit.unwrap_or(defaults.per_category),
            single_category: self.category_limit.unwrap_or(defaults.single_category),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub recommendations: Recommendation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_info: Option<BTreeMap<String, CourseInfo>>,
}

/// Query parameters carrying only completed courses.
#[derive(Debug, Default, Deserialize)]
pub struct ClassesParams {
    #[serde(default)]
    pub classes: String,
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub college: String,
    pub college_name: String,
    pub categories: Vec<CategorySummary>,
}

#[derive(Debug, Serialize)]
pub struct PrerequisiteResponse {
    pub course: CourseCode,
    pub prerequisites: Vec<CourseCode>,
    pub satisfied: bool,
    pub missing: Vec<CourseCode>,
}

/// Looks up catalog info for every recommended code concurrently.
pub(crate) async fn course_details(
    client: &CatalogClient,
    recommendations: &Recommendation,
) -> BTreeMap<String, CourseInfo> {
    let codes: Vec<&str> = recommendations
        .codes()
        .into_iter()
        .map(CourseCode::as_str)
        .collect();

    client
        .lookup_many(&codes)
        .await
        .into_iter()
        .map(|info| (info.code.clone(), info))
        .collect()
}

/// GET /recommendations
///
/// Query parameters:
/// - `college`: college code or alias
/// - `classes`: completed courses, comma separated
/// - `category` (optional): one category, otherwise all three
/// - `per_category_limit`, `category_limit` (optional): sample sizes
/// - `details` (optional): set to `true` to include catalog info
pub async fn get_recommendations(
    State(s): State<Arc<AppState>>,
    Query(params): Query<RecommendParams>,
) -> Response {
    info!(
        college = %params.college,
        category = ?params.category,
        details = params.details,
        "GET /recommendations"
    );

    let request = match parse_category(params.category.as_deref()) {
        CategoryParam::Known(request) => request,
        CategoryParam::Unknown(name) => {
            warn!(category = %name, "Unknown category requested, nothing to recommend");
            let response = RecommendationsResponse {
                recommendations: Recommendation::Single(Vec::new()),
                course_info: params.details.then(BTreeMap::new),
            };
            return (StatusCode::OK, Json(response)).into_response();
        }
    };

    if !params.college.trim().is_empty() && s.selector.catalog().college(&params.college).is_none()
    {
        warn!(college = %params.college, "Unknown college, every category is empty");
    }

    let classes = split_classes(&params.classes);
    let recommendations = s.selector.recommend(
        &params.college,
        &classes,
        request,
        params.limits(),
        &mut rand::thread_rng(),
    );

    let course_info = if params.details {
        Some(course_details(&s.catalog_client, &recommendations).await)
    } else {
        None
    };

    (
        StatusCode::OK,
        Json(RecommendationsResponse {
            recommendations,
            course_info,
        }),
    )
        .into_response()
}

/// GET /requirements/:college/progress
///
/// Returns per-category obligation counts and the courses still owed.
pub async fn get_progress(
    State(s): State<Arc<AppState>>,
    Path(college): Path<String>,
    Query(params): Query<ClassesParams>,
) -> Response {
    info!(college = %college, "GET /requirements/:college/progress");

    let Some(requirements) = s.selector.catalog().college(&college) else {
        return ApiErrorType::from((
            StatusCode::NOT_FOUND,
            "Unknown college",
            Some(format!("No requirements configured for {college:?}")),
        ))
        .into_response();
    };

    let classes = split_classes(&params.classes);
    let response = ProgressResponse {
        college: requirements.college_code.clone(),
        college_name: requirements.college_name.clone(),
        categories: s.selector.summarize(&requirements.college_code, &classes),
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// GET /prerequisites/:code
///
/// Reports a course's direct prerequisites and which of them are missing.
pub async fn get_prerequisites(
    State(s): State<Arc<AppState>>,
    Path(code): Path<String>,
    Query(params): Query<ClassesParams>,
) -> Response {
    info!(code = %code, "GET /prerequisites/:code");

    let Some(course) = normalize(&code) else {
        return ApiErrorType::from((StatusCode::BAD_REQUEST, "Course code is blank", None))
            .into_response();
    };

    let prerequisites = s.selector.prerequisites();
    let completed = CompletedSet::from_raw(split_classes(&params.classes));
    let response = PrerequisiteResponse {
        prerequisites: prerequisites.prerequisites_of(&course).to_vec(),
        satisfied: prerequisites.is_code_satisfied(&completed, &course),
        missing: prerequisites.missing_prerequisites(&completed, course.as_str()),
        course,
    };

    (StatusCode::OK, Json(response)).into_response()
}
