use std::time::Duration;

use tracing::{debug, warn};

use crate::judge::{JudgeBackend, JudgeError, JudgeOutcome};

/// Pacing for result polling: exponential backoff from `initial_delay`,
/// doubling per attempt and capped at `max_delay`, for at most `max_attempts`
/// fetches per run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub max_attempts: u32,
}

impl PollPolicy {
    /// Delay before the fetch numbered `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.min(16);
        self.initial_delay.saturating_mul(factor).min(self.max_delay)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(2),
            max_attempts: 120,
        }
    }
}

enum PollState {
    Submitted,
    Polling { attempt: u32 },
    Terminal(JudgeOutcome),
    TimedOut,
}

/// How polling a run ended.
#[derive(Debug)]
pub(crate) enum PollOutcome {
    Terminal(JudgeOutcome),
    TimedOut { attempts: u32 },
}

/// Polls `token` until the judge reports a terminal status or the policy's
/// attempt budget runs out. Transport failures abort with `JudgeError`.
pub(crate) async fn poll_until_terminal(
    judge: &dyn JudgeBackend,
    token: &str,
    policy: &PollPolicy,
) -> Result<PollOutcome, JudgeError> {
    let mut state = PollState::Submitted;

    loop {
        state = match state {
            PollState::Submitted => PollState::Polling { attempt: 0 },
            PollState::Polling { attempt } if attempt >= policy.max_attempts => PollState::TimedOut,
            PollState::Polling { attempt } => {
                tokio::time::sleep(policy.delay_for(attempt)).await;
                let outcome = judge.fetch(token).await?;
                if outcome.status.is_pending() {
                    debug!(token, attempt, status = %outcome.status.description, "run not finished");
                    PollState::Polling { attempt: attempt + 1 }
                } else {
                    PollState::Terminal(outcome)
                }
            }
            PollState::Terminal(outcome) => return Ok(PollOutcome::Terminal(outcome)),
            PollState::TimedOut => {
                warn!(token, attempts = policy.max_attempts, "judge never reached a terminal status");
                return Ok(PollOutcome::TimedOut {
                    attempts: policy.max_attempts,
                });
            }
        };
    }
}
