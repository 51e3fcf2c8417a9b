// src/handlers/problem.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    config::{DEFAULT_MEMORY_LIMIT_KB, DEFAULT_TIME_LIMIT_SECS},
    error::AppError,
    extractors::ValidJson,
    grading::{Grader, Limits, SubmissionRequest},
    models::{
        problem::{CreateProblemRequest, CreateTestCaseRequest, Problem, TestCaseRecord, VerifyTestCasesRequest},
        user::ROLE_ADMIN,
    },
    utils::{html::clean_html, jwt::Claims},
};

const PROBLEM_COLUMNS: &str = "id, title, description, difficulty, category, grade, example_input, \
     example_output, solution_code, memory_limit, time_limit, status, created_by, created_at, updated_at";

/// Loads a problem or fails with 404.
pub(crate) async fn fetch_problem(pool: &PgPool, id: i64) -> Result<Problem, AppError> {
    let sql = format!("SELECT {} FROM problems WHERE id = $1", PROBLEM_COLUMNS);
    sqlx::query_as::<_, Problem>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Problem not found".to_string()))
}

/// Loads a problem's test cases in creation order.
pub(crate) async fn fetch_test_cases(pool: &PgPool, problem_id: i64) -> Result<Vec<TestCaseRecord>, AppError> {
    let test_cases = sqlx::query_as::<_, TestCaseRecord>(
        r#"
        SELECT id, problem_id, stdin, expected_output
        FROM test_cases
        WHERE problem_id = $1
        ORDER BY id
        "#,
    )
    .bind(problem_id)
    .fetch_all(pool)
    .await?;

    Ok(test_cases)
}

/// Lists all problems, newest first.
pub async fn list_problems(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let problems = sqlx::query_as::<_, Problem>(&format!(
        "SELECT {} FROM problems ORDER BY created_at DESC",
        PROBLEM_COLUMNS
    ))
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list problems: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(problems))
}

pub async fn get_problem(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(fetch_problem(&pool, id).await?))
}

/// Creates a problem owned by the calling teacher.
///
/// The statement is sanitized; limits fall back to the service defaults.
pub async fn create_problem(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    ValidJson(payload): ValidJson<CreateProblemRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let problem = sqlx::query_as::<_, Problem>(&format!(
        r#"
        INSERT INTO problems
        (title, description, difficulty, category, grade, example_input, example_output,
         solution_code, memory_limit, time_limit, created_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING {}
        "#,
        PROBLEM_COLUMNS
    ))
    .bind(&payload.title)
    .bind(clean_html(&payload.description))
    .bind(&payload.difficulty)
    .bind(&payload.category)
    .bind(payload.grade)
    .bind(&payload.example_input)
    .bind(&payload.example_output)
    .bind(&payload.solution_code)
    .bind(payload.memory_limit.unwrap_or(DEFAULT_MEMORY_LIMIT_KB))
    .bind(payload.time_limit.unwrap_or(DEFAULT_TIME_LIMIT_SECS))
    .bind(user_id)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create problem: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    tracing::info!(problem_id = problem.id, created_by = user_id, "problem created");

    Ok((StatusCode::CREATED, Json(problem)))
}

pub async fn list_test_cases(
    State(pool): State<PgPool>,
    Path(problem_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    fetch_problem(&pool, problem_id).await?;
    Ok(Json(fetch_test_cases(&pool, problem_id).await?))
}

/// Adds a test case to a problem.
/// Only the problem's author or an admin may do this.
pub async fn create_test_case(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(problem_id): Path<i64>,
    ValidJson(payload): ValidJson<CreateTestCaseRequest>,
) -> Result<impl IntoResponse, AppError> {
    let problem = fetch_problem(&pool, problem_id).await?;
    if problem.created_by != claims.user_id()? && claims.role != ROLE_ADMIN {
        return Err(AppError::Forbidden(
            "Only the problem's author can add test cases".to_string(),
        ));
    }

    let test_case = sqlx::query_as::<_, TestCaseRecord>(
        r#"
        INSERT INTO test_cases (problem_id, stdin, expected_output)
        VALUES ($1, $2, $3)
        RETURNING id, problem_id, stdin, expected_output
        "#,
    )
    .bind(problem_id)
    .bind(&payload.stdin)
    .bind(&payload.expected_output)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create test case: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(test_case)))
}

/// Runs a draft solution against ad hoc test cases so an author can check
/// them before publishing. Nothing is stored.
pub async fn verify_test_cases(
    State(grader): State<Arc<Grader>>,
    ValidJson(payload): ValidJson<VerifyTestCasesRequest>,
) -> Result<impl IntoResponse, AppError> {
    let request = SubmissionRequest {
        test_cases: payload.grading_cases(),
        source_code: payload.source_code,
        language_id: payload.language_id,
        limits: Limits {
            memory_limit: payload.memory_limit,
            time_limit: payload.time_limit,
        },
    };

    let report = grader.grade(&request).await?;

    Ok(Json(report))
}
