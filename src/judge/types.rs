//! Wire types exchanged with a Judge0-compatible service.

use serde::{Deserialize, Deserializer, Serialize};

/// Status id the judge reports while a job waits in its queue.
pub const STATUS_IN_QUEUE: i32 = 1;
/// Status id the judge reports while a job is executing.
pub const STATUS_PROCESSING: i32 = 2;

/// Extra CPU seconds the judge grants before killing the process.
pub const CPU_EXTRA_TIME_SECS: f64 = 0.5;
/// Floor for the judge's wall-clock ceiling, in seconds.
pub const MIN_WALL_TIME_SECS: f64 = 20.0;

/// Body of `POST /submissions`.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionPayload<'a> {
    pub source_code: &'a str,
    pub language_id: i32,
    pub stdin: &'a str,
    pub cpu_time_limit: f64,
    pub cpu_extra_time: f64,
    pub wall_time_limit: f64,
}

impl<'a> SubmissionPayload<'a> {
    /// The wall-clock ceiling always sits above `cpu_time_limit + cpu_extra_time`,
    /// so the judge's own timeout cannot preempt the local time-limit check.
    pub fn new(source_code: &'a str, language_id: i32, stdin: &'a str, cpu_time_limit: f64) -> Self {
        let wall_time_limit = MIN_WALL_TIME_SECS.max(cpu_time_limit + CPU_EXTRA_TIME_SECS + 1.0);
        Self {
            source_code,
            language_id,
            stdin,
            cpu_time_limit,
            cpu_extra_time: CPU_EXTRA_TIME_SECS,
            wall_time_limit,
        }
    }
}

/// Body returned by `POST /submissions`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct JudgeStatus {
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub description: String,
}

impl JudgeStatus {
    /// Queued or running; anything else is terminal.
    pub fn is_pending(&self) -> bool {
        matches!(self.id, STATUS_IN_QUEUE | STATUS_PROCESSING)
    }
}

/// Body returned by `GET /submissions/{token}`.
///
/// Every field is optional on the wire: compile and runtime failures routinely
/// come back without `stdout`, `time` or `memory`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JudgeOutcome {
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub status: JudgeStatus,
    /// CPU seconds. Judge0 encodes this as a decimal string.
    #[serde(default, deserialize_with = "number_or_text")]
    pub time: Option<f64>,
    /// Peak memory in KB.
    #[serde(default)]
    pub memory: Option<i64>,
    #[serde(default)]
    pub compile_output: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

fn number_or_text<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(n)) => Ok(Some(n)),
        Some(NumberOrText::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrText::Text(s)) => s.trim().parse().map(Some).map_err(serde::de::Error::custom),
    }
}
