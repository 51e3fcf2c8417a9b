//! External code-execution judge: error type, backend seam and HTTP client.

use async_trait::async_trait;
use thiserror::Error;

mod client;
#[cfg(test)]
pub(crate) mod fake;
pub mod types;

pub use client::Judge0Client;
pub use types::{JudgeOutcome, JudgeStatus, SubmissionPayload};

/// Failures that abort a whole grading call.
///
/// A wrong answer or an exceeded limit is never a `JudgeError`; those are
/// ordinary results inside the report.
#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("judge accepted the submission but returned no token")]
    TokenMissing,

    #[error("judge unreachable: {0}")]
    Unreachable(String),

    #[error("invalid judge response: {0}")]
    InvalidResponse(String),
}

/// The operations the grader needs from a judge.
#[async_trait]
pub trait JudgeBackend: Send + Sync {
    /// Queues one run and returns the judge's opaque token.
    async fn submit(&self, payload: &SubmissionPayload<'_>) -> Result<String, JudgeError>;

    /// Fetches the current state of a queued run.
    async fn fetch(&self, token: &str) -> Result<JudgeOutcome, JudgeError>;

    /// Lists the judge's supported languages, untouched.
    async fn languages(&self) -> Result<serde_json::Value, JudgeError>;
}
