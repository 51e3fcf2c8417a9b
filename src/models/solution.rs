// src/models/solution.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::config::DEFAULT_LANGUAGE_ID;
use crate::grading::GradingReport;

/// Represents the 'solutions' table in the database.
/// Rows are insert-only: one per graded submission.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Solution {
    pub id: i64,
    pub problem_id: i64,
    pub user_id: i64,
    pub homework_id: Option<i64>,
    pub code: String,
    pub language_id: i32,
    /// 0-100, rounded.
    pub percentage_passed: i32,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for submitting code against a stored problem.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitCodeRequest {
    #[validate(length(min = 1, max = 65536))]
    pub source_code: String,
    #[serde(default = "default_language_id")]
    pub language_id: i32,
    pub problem_id: i64,
    pub homework_id: Option<i64>,
}

fn default_language_id() -> i32 {
    DEFAULT_LANGUAGE_ID
}

/// Response for a graded and stored submission.
#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub solution_id: i64,
    pub percentage_passed: i32,
    #[serde(flatten)]
    pub report: GradingReport,
}
