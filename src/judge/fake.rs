//! In-memory judge double for unit tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::{JudgeBackend, JudgeError, JudgeOutcome, JudgeStatus, SubmissionPayload};

pub(crate) fn outcome(id: i32, description: &str, stdout: Option<&str>, time: f64, memory: i64) -> JudgeOutcome {
    JudgeOutcome {
        stdout: stdout.map(str::to_string),
        status: JudgeStatus {
            id,
            description: description.to_string(),
        },
        time: Some(time),
        memory: Some(memory),
        ..Default::default()
    }
}

pub(crate) fn queued() -> JudgeOutcome {
    outcome(1, "In Queue", None, 0.0, 0)
}

pub(crate) fn running() -> JudgeOutcome {
    outcome(2, "Processing", None, 0.0, 0)
}

pub(crate) fn accepted(stdout: &str) -> JudgeOutcome {
    outcome(3, "Accepted", Some(stdout), 0.01, 1024)
}

/// Scripted judge keyed by stdin: the token for a run is its stdin, and each
/// fetch pops the next scripted outcome (the last one repeats forever).
#[derive(Default)]
pub(crate) struct ScriptedJudge {
    scripts: Mutex<HashMap<String, VecDeque<JudgeOutcome>>>,
    fetch_delays: HashMap<String, Duration>,
    withhold_tokens: bool,
    withheld: HashSet<String>,
    submitted: Mutex<Vec<String>>,
    fetches: AtomicU32,
}

impl ScriptedJudge {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn script(self, stdin: &str, outcomes: Vec<JudgeOutcome>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(stdin.to_string(), outcomes.into());
        self
    }

    /// Delays every fetch for `stdin`, to make runs finish out of order.
    pub(crate) fn slow(mut self, stdin: &str, delay: Duration) -> Self {
        self.fetch_delays.insert(stdin.to_string(), delay);
        self
    }

    pub(crate) fn without_tokens(mut self) -> Self {
        self.withhold_tokens = true;
        self
    }

    /// Submissions for `stdin` come back without a token.
    pub(crate) fn withhold_token(mut self, stdin: &str) -> Self {
        self.withheld.insert(stdin.to_string());
        self
    }

    pub(crate) fn submitted(&self) -> Vec<String> {
        self.submitted.lock().unwrap().clone()
    }

    pub(crate) fn fetch_count(&self) -> u32 {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JudgeBackend for ScriptedJudge {
    async fn submit(&self, payload: &SubmissionPayload<'_>) -> Result<String, JudgeError> {
        self.submitted.lock().unwrap().push(payload.stdin.to_string());
        if self.withhold_tokens || self.withheld.contains(payload.stdin) {
            return Err(JudgeError::TokenMissing);
        }
        Ok(payload.stdin.to_string())
    }

    async fn fetch(&self, token: &str) -> Result<JudgeOutcome, JudgeError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.fetch_delays.get(token) {
            tokio::time::sleep(*delay).await;
        }

        let mut scripts = self.scripts.lock().unwrap();
        let queue = scripts
            .get_mut(token)
            .ok_or_else(|| JudgeError::InvalidResponse(format!("unknown token {}", token)))?;
        let next = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        next.ok_or_else(|| JudgeError::InvalidResponse(format!("empty script for {}", token)))
    }

    async fn languages(&self) -> Result<serde_json::Value, JudgeError> {
        Ok(serde_json::json!([{"id": 71, "name": "Python (3.8.1)"}]))
    }
}
