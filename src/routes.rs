// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, problem, solution, submission},
    state::AppState,
    utils::jwt::{auth_middleware, teacher_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, problems, code submission, solutions).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (database pool, config, grader).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:5173"),
        HeaderValue::from_static("http://127.0.0.1:5173"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let require_auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    // Authoring routes: Auth first, then the teacher check
    let authoring_routes = Router::new()
        .route("/", post(problem::create_problem))
        .route("/{id}/test_cases", post(problem::create_test_case))
        .route("/verify", post(problem::verify_test_cases))
        .layer(middleware::from_fn(teacher_middleware))
        .layer(require_auth.clone());

    let problem_routes = Router::new()
        .route("/", get(problem::list_problems))
        .route("/{id}", get(problem::get_problem))
        .route("/{id}/test_cases", get(problem::list_test_cases))
        .layer(require_auth.clone())
        .merge(authoring_routes);

    let submission_routes = Router::new()
        .route("/submit_code", post(submission::submit_code))
        .route("/{problem_id}/solutions", get(submission::list_problem_solutions))
        .layer(require_auth.clone())
        .merge(Router::new().route("/languages", get(submission::list_languages)));

    let solution_routes = Router::new()
        .route("/{user_id}", get(solution::list_user_solutions))
        .layer(require_auth);

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/problems", problem_routes)
        .nest("/api/code_submission", submission_routes)
        .nest("/api/solutions", solution_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
