// src/handlers/solution.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{error::AppError, handlers::submission::SOLUTION_COLUMNS, models::solution::Solution};

/// Lists a user's solutions, newest first.
pub async fn list_user_solutions(
    State(pool): State<PgPool>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let solutions = sqlx::query_as::<_, Solution>(&format!(
        "SELECT {} FROM solutions WHERE user_id = $1 ORDER BY created_at DESC",
        SOLUTION_COLUMNS
    ))
    .bind(user_id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list solutions: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(solutions))
}
