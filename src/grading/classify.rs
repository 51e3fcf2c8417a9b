use crate::judge::JudgeOutcome;

use super::{Limits, TestCase, TestCaseResult};

pub const MEMORY_LIMIT_EXCEEDED: &str = "Memory Limit Exceeded";
pub const TIME_LIMIT_EXCEEDED: &str = "Time Limit Exceeded";
pub const POLL_TIMEOUT: &str = "Poll Timeout";

/// Output comparison ignores leading and trailing whitespace only.
pub fn outputs_match(actual: &str, expected: &str) -> bool {
    actual.trim() == expected.trim()
}

/// Turns a terminal judge outcome into a result for `case`.
///
/// Resource limits are checked locally and override whatever status the judge
/// reported: memory first, then time, so a run over both reads as
/// "Time Limit Exceeded".
pub fn classify(case: &TestCase, outcome: JudgeOutcome, limits: Limits) -> TestCaseResult {
    let actual_output = outcome.stdout.unwrap_or_default();
    let memory_exceeded = outcome.memory.unwrap_or(0) > limits.memory_limit;
    let time_exceeded = outcome.time.unwrap_or(0.0) > limits.time_limit;

    let mut status = outcome.status.description;
    if memory_exceeded {
        status = MEMORY_LIMIT_EXCEEDED.to_string();
    }
    if time_exceeded {
        status = TIME_LIMIT_EXCEEDED.to_string();
    }

    let passed = outputs_match(&actual_output, &case.expected_output) && !memory_exceeded && !time_exceeded;

    TestCaseResult {
        test_case_id: case.id,
        input: case.stdin.clone(),
        expected_output: case.expected_output.clone(),
        actual_output,
        status,
        passed,
        memory_exceeded,
        time_exceeded,
        compile_output: outcome.compile_output,
        stderr: outcome.stderr,
        message: outcome.message,
    }
}

/// Result recorded for a run whose status never became terminal.
pub fn poll_timeout(case: &TestCase, attempts: u32) -> TestCaseResult {
    TestCaseResult {
        test_case_id: case.id,
        input: case.stdin.clone(),
        expected_output: case.expected_output.clone(),
        actual_output: String::new(),
        status: POLL_TIMEOUT.to_string(),
        passed: false,
        memory_exceeded: false,
        time_exceeded: false,
        compile_output: None,
        stderr: None,
        message: Some(format!("no verdict after {} polls", attempts)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge::fake::outcome;

    fn case(expected: &str) -> TestCase {
        TestCase {
            id: 7,
            stdin: "2 3".to_string(),
            expected_output: expected.to_string(),
        }
    }

    const LIMITS: Limits = Limits {
        memory_limit: 1000,
        time_limit: 1.0,
    };

    #[test]
    fn test_trailing_newline_is_ignored() {
        let result = classify(&case("5\n"), outcome(3, "Accepted", Some("5"), 0.1, 500), LIMITS);
        assert!(result.passed);
        assert_eq!(result.status, "Accepted");
        assert_eq!(result.test_case_id, 7);
        assert_eq!(result.input, "2 3");
    }

    #[test]
    fn test_internal_whitespace_is_significant() {
        let result = classify(&case("1 2"), outcome(4, "Wrong Answer", Some("1  2"), 0.1, 500), LIMITS);
        assert!(!result.passed);
        assert_eq!(result.status, "Wrong Answer");
    }

    #[test]
    fn test_memory_over_limit_fails_matching_output() {
        let result = classify(&case("5"), outcome(3, "Accepted", Some("5"), 0.1, 2000), LIMITS);
        assert!(!result.passed);
        assert!(result.memory_exceeded);
        assert!(!result.time_exceeded);
        assert_eq!(result.status, MEMORY_LIMIT_EXCEEDED);
    }

    #[test]
    fn test_time_wins_over_memory() {
        let result = classify(&case("5"), outcome(3, "Accepted", Some("5"), 1.5, 2000), LIMITS);
        assert!(result.memory_exceeded);
        assert!(result.time_exceeded);
        assert_eq!(result.status, TIME_LIMIT_EXCEEDED);
        assert!(!result.passed);
    }

    #[test]
    fn test_limit_override_applies_to_runtime_errors() {
        let result = classify(
            &case("5"),
            outcome(11, "Runtime Error (NZEC)", None, 2.5, 100),
            LIMITS,
        );
        assert_eq!(result.status, TIME_LIMIT_EXCEEDED);
    }

    #[test]
    fn test_limits_are_strict_inequalities() {
        let result = classify(&case("5"), outcome(3, "Accepted", Some("5"), 1.0, 1000), LIMITS);
        assert!(result.passed);
    }

    #[test]
    fn test_missing_stdout_is_empty() {
        let mut raw = outcome(6, "Compilation Error", None, 0.0, 0);
        raw.time = None;
        raw.memory = None;
        raw.compile_output = Some("main.c:1: error".to_string());

        let result = classify(&case("5"), raw, LIMITS);
        assert_eq!(result.actual_output, "");
        assert!(!result.passed);
        assert_eq!(result.status, "Compilation Error");
        assert_eq!(result.compile_output.as_deref(), Some("main.c:1: error"));
    }

    #[test]
    fn test_empty_expected_matches_missing_stdout() {
        let result = classify(&case("\n"), outcome(3, "Accepted", None, 0.0, 0), LIMITS);
        assert!(result.passed);
    }

    #[test]
    fn test_poll_timeout_result() {
        let result = poll_timeout(&case("5"), 12);
        assert!(!result.passed);
        assert_eq!(result.status, POLL_TIMEOUT);
        assert!(!result.time_exceeded);
    }
}
