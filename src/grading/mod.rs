//! Grading orchestration: run a submission against ordered test cases on the
//! external judge and aggregate the verdicts into a [`GradingReport`].

use std::sync::Arc;

use futures::{StreamExt, TryStreamExt, stream};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::JudgeConfig;
use crate::judge::{Judge0Client, JudgeBackend, JudgeError, SubmissionPayload};

mod classify;
mod poll;

pub use classify::{MEMORY_LIMIT_EXCEEDED, POLL_TIMEOUT, TIME_LIMIT_EXCEEDED, classify, outputs_match};
pub use poll::PollPolicy;

use poll::{PollOutcome, poll_until_terminal};

/// One input/expected-output pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub id: i64,
    pub stdin: String,
    pub expected_output: String,
}

/// Resource ceilings a run is judged against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    /// Peak memory in the judge's unit (KB).
    pub memory_limit: i64,
    /// CPU seconds.
    pub time_limit: f64,
}

#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    pub source_code: String,
    pub language_id: i32,
    pub test_cases: Vec<TestCase>,
    pub limits: Limits,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCaseResult {
    pub test_case_id: i64,
    pub input: String,
    pub expected_output: String,
    pub actual_output: String,
    pub status: String,
    pub passed: bool,
    pub memory_exceeded: bool,
    pub time_exceeded: bool,
    pub compile_output: Option<String>,
    pub stderr: Option<String>,
    pub message: Option<String>,
}

/// Per-test-case results in input order, plus the pass tally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingReport {
    pub results: Vec<TestCaseResult>,
    pub passed_count: usize,
    pub total_count: usize,
}

impl GradingReport {
    pub fn from_results(results: Vec<TestCaseResult>) -> Self {
        let passed_count = results.iter().filter(|r| r.passed).count();
        Self {
            total_count: results.len(),
            passed_count,
            results,
        }
    }

    /// Rounded share of passed test cases, 0 when there were none.
    pub fn percentage_passed(&self) -> i32 {
        percentage_passed(self.passed_count, self.total_count)
    }
}

pub fn percentage_passed(passed_count: usize, total_count: usize) -> i32 {
    if total_count == 0 {
        return 0;
    }
    (passed_count as f64 / total_count as f64 * 100.0).round() as i32
}

/// Runs submissions against a judge.
///
/// Holds no per-call state, so one instance is shared by every request.
#[derive(Clone)]
pub struct Grader {
    judge: Arc<dyn JudgeBackend>,
    policy: PollPolicy,
    max_concurrency: usize,
}

impl Grader {
    pub fn new(judge: Arc<dyn JudgeBackend>, policy: PollPolicy, max_concurrency: usize) -> Self {
        Self {
            judge,
            policy,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Builds a grader backed by the Judge0 HTTP client.
    pub fn from_config(config: &JudgeConfig) -> Result<Self, JudgeError> {
        let client = Judge0Client::new(config)?;
        Ok(Self::new(Arc::new(client), config.poll_policy(), config.max_concurrency))
    }

    pub fn judge(&self) -> &dyn JudgeBackend {
        self.judge.as_ref()
    }

    /// Grades `request` and returns a report whose results line up with
    /// `request.test_cases`.
    ///
    /// Up to `max_concurrency` test cases are in flight at once. The first
    /// submission or transport failure aborts the call as soon as it happens,
    /// whatever stage the other runs are at; runs still in flight are dropped
    /// and left to the judge's own housekeeping.
    pub async fn grade(&self, request: &SubmissionRequest) -> Result<GradingReport, JudgeError> {
        info!(
            language_id = request.language_id,
            test_cases = request.test_cases.len(),
            memory_limit = request.limits.memory_limit,
            time_limit = request.limits.time_limit,
            "grading submission"
        );

        let shared = Arc::new(request.clone());
        let mut judged: Vec<(usize, TestCaseResult)> = stream::iter(0..shared.test_cases.len())
            .map(|index| {
                let grader = self.clone();
                let request = Arc::clone(&shared);
                async move {
                    let result = grader.run_case(&request, &request.test_cases[index]).await?;
                    Ok::<_, JudgeError>((index, result))
                }
            })
            .buffer_unordered(self.max_concurrency)
            .try_collect()
            .await?;

        // Runs complete in any order; the report follows the input.
        judged.sort_by_key(|(index, _)| *index);
        let results = judged.into_iter().map(|(_, result)| result).collect();
        let report = GradingReport::from_results(results);
        info!(
            passed = report.passed_count,
            total = report.total_count,
            "grading finished"
        );
        Ok(report)
    }

    async fn run_case(&self, request: &SubmissionRequest, case: &TestCase) -> Result<TestCaseResult, JudgeError> {
        let payload = SubmissionPayload::new(
            &request.source_code,
            request.language_id,
            &case.stdin,
            request.limits.time_limit,
        );
        let token = self.judge.submit(&payload).await?;
        debug!(test_case_id = case.id, token = %token, "run queued");

        let result = match poll_until_terminal(self.judge.as_ref(), &token, &self.policy).await? {
            PollOutcome::Terminal(outcome) => classify(case, outcome, request.limits),
            PollOutcome::TimedOut { attempts } => classify::poll_timeout(case, attempts),
        };
        debug!(test_case_id = case.id, status = %result.status, passed = result.passed, "run judged");
        Ok(result)
    }
}
