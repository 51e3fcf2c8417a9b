// src/models/problem.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use validator::Validate;

use crate::grading::TestCase;

pub const DIFFICULTIES: [&str; 3] = ["easy", "medium", "hard"];

pub const CATEGORIES: [&str; 18] = [
    "arrays",
    "linked_lists",
    "sorting",
    "searching",
    "trees",
    "graphs",
    "dynamic_programming",
    "recursion",
    "backtracking",
    "bit_manipulation",
    "greedy",
    "math",
    "geometry",
    "combinatorics",
    "probability",
    "game_theory",
    "puzzles",
    "miscellaneous",
];

/// Represents the 'problems' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Problem {
    pub id: i64,
    pub title: String,

    /// Sanitized HTML statement.
    pub description: String,

    /// 'easy', 'medium' or 'hard'.
    pub difficulty: String,

    pub category: String,

    /// School grade the problem targets (9-12).
    pub grade: i32,

    pub example_input: String,
    pub example_output: String,

    /// Reference solution; kept server-side only.
    #[serde(skip)]
    pub solution_code: String,

    /// Memory ceiling in KB.
    pub memory_limit: i64,

    /// CPU ceiling in seconds.
    pub time_limit: f64,

    /// 'PENDING', 'ACCEPTED' or 'REJECTED'.
    pub status: String,

    pub created_by: i64,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Represents the 'test_cases' table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TestCaseRecord {
    pub id: i64,
    pub problem_id: i64,
    pub stdin: String,
    pub expected_output: String,
}

impl From<TestCaseRecord> for TestCase {
    fn from(record: TestCaseRecord) -> Self {
        TestCase {
            id: record.id,
            stdin: record.stdin,
            expected_output: record.expected_output,
        }
    }
}

/// DTO for creating a new problem.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProblemRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1, max = 20000))]
    pub description: String,
    #[validate(custom(function = validate_difficulty))]
    pub difficulty: String,
    #[validate(custom(function = validate_category))]
    pub category: String,
    #[validate(range(min = 9, max = 12, message = "grade must be one of 9, 10, 11, 12"))]
    pub grade: i32,
    #[validate(length(max = 10000))]
    pub example_input: String,
    #[validate(length(max = 10000))]
    pub example_output: String,
    #[validate(length(max = 65536))]
    pub solution_code: String,
    #[validate(range(min = 1, max = 1_048_576))]
    pub memory_limit: Option<i64>,
    #[validate(range(min = 0.1, max = 15.0))]
    pub time_limit: Option<f64>,
}

/// DTO for adding a test case to an existing problem.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTestCaseRequest {
    #[validate(length(max = 100000))]
    pub stdin: String,
    #[validate(length(max = 100000))]
    pub expected_output: String,
}

/// A test case supplied inline for verification; never stored.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct AdHocTestCase {
    pub id: Option<i64>,
    #[validate(length(max = 100000))]
    pub stdin: String,
    #[validate(length(max = 100000))]
    pub expected_output: String,
}

/// DTO for checking a draft problem's test cases against a source solution.
#[derive(Debug, Deserialize, Validate)]
pub struct VerifyTestCasesRequest {
    #[validate(length(min = 1, max = 65536))]
    pub source_code: String,
    pub language_id: i32,
    #[validate(length(max = 50), nested)]
    pub test_cases: Vec<AdHocTestCase>,
    #[validate(range(min = 1, max = 1_048_576))]
    pub memory_limit: i64,
    #[validate(range(min = 0.1, max = 15.0))]
    pub time_limit: f64,
}

impl VerifyTestCasesRequest {
    /// Test cases in request order; unnamed ones are numbered by position from 1.
    pub fn grading_cases(&self) -> Vec<TestCase> {
        self.test_cases
            .iter()
            .enumerate()
            .map(|(index, case)| TestCase {
                id: case.id.unwrap_or(index as i64 + 1),
                stdin: case.stdin.clone(),
                expected_output: case.expected_output.clone(),
            })
            .collect()
    }
}

fn validate_difficulty(difficulty: &str) -> Result<(), validator::ValidationError> {
    if !DIFFICULTIES.contains(&difficulty) {
        return Err(validator::ValidationError::new("invalid_difficulty"));
    }
    Ok(())
}

fn validate_category(category: &str) -> Result<(), validator::ValidationError> {
    if !CATEGORIES.contains(&category) {
        return Err(validator::ValidationError::new("invalid_category"));
    }
    Ok(())
}
