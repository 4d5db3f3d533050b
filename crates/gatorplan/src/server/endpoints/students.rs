//! API endpoints for stored student profiles and their completed courses.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::db::DbError;
use crate::server::endpoints::recommend::course_details;
use crate::server::types::ApiErrorType;
use crate::server::util::{parse_category, CategoryParam};
use crate::requirements::{Recommendation, RecommendLimits};
use crate::types::AppState;

#[derive(Debug, Deserialize)]
pub struct UpsertStudentBody {
    pub college: String,
}

#[derive(Debug, Deserialize)]
pub struct CompletedCoursesBody {
    #[serde(default)]
    pub classes: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StudentRecommendParams {
    pub category: Option<String>,
    #[serde(default)]
    pub details: bool,
}

/// Converts DbError to API response.
fn db_error_to_response(error: DbError, context: &str) -> Response {
    if error.is_not_found() {
        return ApiErrorType::from((
            StatusCode::NOT_FOUND,
            "Student not found",
            Some(error.to_string()),
        ))
        .into_response();
    }

    error!(error = %error, "{}", context);
    ApiErrorType::from((
        StatusCode::INTERNAL_SERVER_ERROR,
        context,
        Some(error.to_string()),
    ))
    .into_response()
}

fn blank_student_id() -> Response {
    ApiErrorType::from((StatusCode::BAD_REQUEST, "Student ID required", None)).into_response()
}

/// PUT /students/:id
///
/// Creates the student or changes their college. The college may be given by
/// code or alias and is stored by code.
pub async fn put_student(
    Path(student_id): Path<String>,
    State(s): State<Arc<AppState>>,
    Json(body): Json<UpsertStudentBody>,
) -> Response {
    info!(student_id = %student_id, college = %body.college, "PUT /students/:id");

    if student_id.trim().is_empty() {
        return blank_student_id();
    }

    let Some(college) = s.selector.catalog().college(&body.college) else {
        return ApiErrorType::from((
            StatusCode::BAD_REQUEST,
            "Unknown college",
            Some(format!(
                "Expected one of: {}",
                s.selector.catalog().college_codes().join(", ")
            )),
        ))
        .into_response();
    };

    match s.student_db.upsert_student(&student_id, &college.college_code) {
        Ok(student) => (StatusCode::OK, Json(student)).into_response(),
        Err(e) => db_error_to_response(e, "Failed to save student"),
    }
}

/// GET /students/:id
pub async fn get_student(
    Path(student_id): Path<String>,
    State(s): State<Arc<AppState>>,
) -> Response {
    info!(student_id = %student_id, "GET /students/:id");

    match s.student_db.get_student(&student_id) {
        Ok(Some(student)) => (StatusCode::OK, Json(student)).into_response(),
        Ok(None) => ApiErrorType::from((StatusCode::NOT_FOUND, "Student not found", None))
            .into_response(),
        Err(e) => db_error_to_response(e, "Failed to fetch student"),
    }
}

/// POST /students/:id/completed_courses
///
/// Body: `{"classes": ["COP 3502C", ...]}`. Codes are normalized and codes
/// the student already has are reported as skipped.
pub async fn post_completed_courses(
    Path(student_id): Path<String>,
    State(s): State<Arc<AppState>>,
    Json(body): Json<CompletedCoursesBody>,
) -> Response {
    info!(
        student_id = %student_id,
        classes = body.classes.len(),
        "POST /students/:id/completed_courses"
    );

    if student_id.trim().is_empty() {
        return blank_student_id();
    }

    match s
        .student_db
        .save_completed_courses(&student_id, &body.classes)
    {
        Ok(summary) => {
            if summary.saved_count == 0 {
                warn!(student_id = %student_id, "No new courses to save");
            }
            (
                StatusCode::OK,
                Json(json!({
                    "message": format!("{} courses saved", summary.saved_count),
                    "saved_count": summary.saved_count,
                    "total_courses": summary.total_courses,
                    "skipped": summary.skipped,
                })),
            )
                .into_response()
        }
        Err(e) => db_error_to_response(e, "Failed to save completed courses"),
    }
}

/// GET /students/:id/completed_courses
pub async fn get_completed_courses(
    Path(student_id): Path<String>,
    State(s): State<Arc<AppState>>,
) -> Response {
    info!(student_id = %student_id, "GET /students/:id/completed_courses");

    match s.student_db.completed_courses(&student_id) {
        Ok(codes) => (
            StatusCode::OK,
            Json(json!({
                "total_courses": codes.len(),
                "completed_courses": codes,
            })),
        )
            .into_response(),
        Err(e) => db_error_to_response(e, "Failed to fetch completed courses"),
    }
}

/// GET /students/:id/recommendations
///
/// Recommends from the student's stored college and completed courses.
///
/// Query parameters:
/// - `category` (optional): one category, otherwise all three
/// - `details` (optional): set to `true` to include catalog info
pub async fn get_student_recommendations(
    Path(student_id): Path<String>,
    State(s): State<Arc<AppState>>,
    Query(params): Query<StudentRecommendParams>,
) -> Response {
    info!(
        student_id = %student_id,
        category = ?params.category,
        "GET /students/:id/recommendations"
    );

    let student = match s.student_db.get_student(&student_id) {
        Ok(Some(student)) => student,
        Ok(None) => {
            return ApiErrorType::from((StatusCode::NOT_FOUND, "Student not found", None))
                .into_response()
        }
        Err(e) => return db_error_to_response(e, "Failed to fetch student"),
    };

    let completed = match s.student_db.completed_courses(&student_id) {
        Ok(codes) => codes,
        Err(e) => return db_error_to_response(e, "Failed to fetch completed courses"),
    };

    let courses = match parse_category(params.category.as_deref()) {
        CategoryParam::Known(request) => s.selector.recommend(
            &student.college,
            &completed,
            request,
            RecommendLimits::default(),
            &mut rand::thread_rng(),
        ),
        CategoryParam::Unknown(name) => {
            warn!(category = %name, "Unknown category requested, nothing to recommend");
            Recommendation::Single(Vec::new())
        }
    };

    let course_info = if params.details {
        Some(course_details(&s.catalog_client, &courses).await)
    } else {
        None
    };

    let mut response = json!({
        "college": student.college,
        "courses": courses,
        "completed_courses": completed,
    });
    if let Some(course_info) = course_info {
        response["course_info"] = json!(course_info);
    }

    (StatusCode::OK, Json(response)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::util::body_json;
    use crate::types::test_support::test_state;
    use serde_json::Value;

    async fn put(state: &Arc<AppState>, id: &str, college: &str) -> Response {
        put_student(
            Path(id.to_string()),
            State(state.clone()),
            Json(UpsertStudentBody {
                college: college.to_string(),
            }),
        )
        .await
    }

    async fn save(state: &Arc<AppState>, id: &str, classes: &[&str]) -> Response {
        post_completed_courses(
            Path(id.to_string()),
            State(state.clone()),
            Json(CompletedCoursesBody {
                classes: classes.iter().map(|c| c.to_string()).collect(),
            }),
        )
        .await
    }

    #[tokio::test]
    async fn test_put_and_get_student() {
        let state = test_state();

        let response = put(&state, "s1", "engineering").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["college"], "ENG");

        let response = get_student(Path("s1".to_string()), State(state.clone())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["student_id"], "s1");
    }

    #[tokio::test]
    async fn test_put_rejects_bad_input() {
        let state = test_state();
        assert_eq!(
            put(&state, "s1", "Medicine").await.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            put(&state, "  ", "ENG").await.status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_unknown_student_is_404() {
        let state = test_state();

        let response = get_student(Path("ghost".to_string()), State(state.clone())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = save(&state, "ghost", &["COP3502C"]).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "Student not found");

        let response = get_student_recommendations(
            Path("ghost".to_string()),
            State(state.clone()),
            Query(StudentRecommendParams::default()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_save_and_list_completed_courses() {
        let state = test_state();
        put(&state, "s2", "ENG").await;

        let value = body_json(save(&state, "s2", &["cop 3502c", "MAC2311", "COP3502C"]).await).await;
        assert_eq!(value["saved_count"], 2);
        assert_eq!(value["total_courses"], 2);

        let value = body_json(save(&state, "s2", &["MAC2311"]).await).await;
        assert_eq!(value["saved_count"], 0);
        assert_eq!(value["skipped"], json!(["MAC2311"]));

        let response =
            get_completed_courses(Path("s2".to_string()), State(state.clone())).await;
        let value = body_json(response).await;
        assert_eq!(value["total_courses"], 2);
        assert_eq!(value["completed_courses"], json!(["COP3502C", "MAC2311"]));
    }

    #[tokio::test]
    async fn test_student_recommendations_use_stored_data() {
        let state = test_state();
        put(&state, "s3", "ENG").await;
        save(
            &state,
            "s3",
            &["MAC2311", "MAC2312", "MAC2313", "COP3502C", "COP3503C"],
        )
        .await;

        let response = get_student_recommendations(
            Path("s3".to_string()),
            State(state.clone()),
            Query(StudentRecommendParams {
                category: Some("Core".to_string()),
                details: false,
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let value = body_json(response).await;
        let mut courses: Vec<&str> = value["courses"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        courses.sort_unstable();
        assert_eq!(courses, vec!["CIS4914", "COT3100", "EGN4952"]);
        assert_eq!(value["completed_courses"].as_array().unwrap().len(), 5);
        assert!(value.get("course_info").is_none());
    }

    #[tokio::test]
    async fn test_student_without_courses_gets_empty_mapping() {
        let state = test_state();
        put(&state, "s4", "CLAS").await;

        let response = get_student_recommendations(
            Path("s4".to_string()),
            State(state.clone()),
            Query(StudentRecommendParams {
                category: None,
                details: true,
            }),
        )
        .await;

        let value = body_json(response).await;
        assert_eq!(value["courses"], json!({}));
        assert_eq!(value["course_info"], json!({}));
    }
}
