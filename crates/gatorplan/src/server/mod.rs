use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::server::endpoints::{course_info, recommend, status, students};
use crate::types::AppState;

mod endpoints;
mod types;
mod util;

pub use types::ApiErrorType;

/// Creates a router that can be used by `axum`.
///
/// # Parameters
/// - `app_state`: The app server state.
///
/// # Returns
/// The router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    // Stateless endpoints: completed courses come in the query string
    let requirements_router = Router::new()
        .route("/recommendations", get(recommend::get_recommendations))
        .route(
            "/requirements/:college/progress",
            get(recommend::get_progress),
        )
        .route("/prerequisites/:code", get(recommend::get_prerequisites));

    let student_router = Router::new()
        .route(
            "/students/:id",
            put(students::put_student).get(students::get_student),
        )
        .route(
            "/students/:id/completed_courses",
            post(students::post_completed_courses).get(students::get_completed_courses),
        )
        .route(
            "/students/:id/recommendations",
            get(students::get_student_recommendations),
        );

    let course_info_router = Router::new()
        // Cache management endpoints
        .route("/course_info/cache_stats", get(course_info::get_cache_stats))
        .route(
            "/course_info/invalidate_cache",
            post(course_info::invalidate_cache),
        )
        .route("/course_info/:code", get(course_info::get_course_info));

    Router::new()
        .route("/health", get(status::get_health))
        .merge(requirements_router)
        .merge(student_router)
        .merge(course_info_router)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::test_support::test_state;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_routes_are_wired() {
        let router = create_router(test_state());

        let response = router
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .clone()
            .oneshot(
                Request::get("/course_info/cache_stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .oneshot(
                Request::get("/recommendations?college=ENG&classes=MAC2311&category=GenEd")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
