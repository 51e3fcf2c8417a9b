// src/handlers/submission.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    error::AppError,
    extractors::ValidJson,
    grading::{Grader, Limits, SubmissionRequest},
    handlers::problem::{fetch_problem, fetch_test_cases},
    models::solution::{Solution, SubmissionResponse, SubmitCodeRequest},
    utils::jwt::Claims,
};

pub(crate) const SOLUTION_COLUMNS: &str =
    "id, problem_id, user_id, homework_id, code, language_id, percentage_passed, created_at";

/// Grades code against a stored problem and records the attempt.
///
/// * 404 if the problem does not exist (checked before the judge is contacted).
/// * Judge failures abort without storing anything.
/// * On success a Solution row with the rounded pass percentage is inserted.
pub async fn submit_code(
    State(pool): State<PgPool>,
    State(grader): State<Arc<Grader>>,
    Extension(claims): Extension<Claims>,
    ValidJson(payload): ValidJson<SubmitCodeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let problem = fetch_problem(&pool, payload.problem_id).await?;
    let test_cases = fetch_test_cases(&pool, problem.id).await?;

    let request = SubmissionRequest {
        source_code: payload.source_code,
        language_id: payload.language_id,
        test_cases: test_cases.into_iter().map(Into::into).collect(),
        limits: Limits {
            memory_limit: problem.memory_limit,
            time_limit: problem.time_limit,
        },
    };

    let report = grader.grade(&request).await?;
    let percentage_passed = report.percentage_passed();

    let solution_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO solutions (problem_id, user_id, homework_id, code, language_id, percentage_passed)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(problem.id)
    .bind(user_id)
    .bind(payload.homework_id)
    .bind(&request.source_code)
    .bind(request.language_id)
    .bind(percentage_passed)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to store solution: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    tracing::info!(
        solution_id,
        problem_id = problem.id,
        user_id,
        percentage_passed,
        "solution stored"
    );

    Ok(Json(SubmissionResponse {
        solution_id,
        percentage_passed,
        report,
    }))
}

/// Lists every stored solution for a problem.
pub async fn list_problem_solutions(
    State(pool): State<PgPool>,
    Path(problem_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let solutions = sqlx::query_as::<_, Solution>(&format!(
        "SELECT {} FROM solutions WHERE problem_id = $1 ORDER BY created_at DESC",
        SOLUTION_COLUMNS
    ))
    .bind(problem_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(solutions))
}

/// Judge language list, passed through unchanged.
pub async fn list_languages(State(grader): State<Arc<Grader>>) -> Result<impl IntoResponse, AppError> {
    let languages = grader.judge().languages().await?;
    Ok(Json(languages))
}
