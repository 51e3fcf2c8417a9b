// src/config.rs

use std::env;
use std::str::FromStr;
use std::time::Duration;

use dotenvy::dotenv;
use url::Url;

use crate::grading::PollPolicy;

/// Judge0 language used when a submission does not name one (Python 3.8.1).
pub const DEFAULT_LANGUAGE_ID: i32 = 71;

/// Default memory ceiling for new problems, in the judge's unit (KB).
pub const DEFAULT_MEMORY_LIMIT_KB: i64 = 128_000;

/// Default CPU time ceiling for new problems, in seconds.
pub const DEFAULT_TIME_LIMIT_SECS: f64 = 2.0;

/// Settings for talking to the external judge.
#[derive(Debug, Clone)]
pub struct JudgeConfig {
    /// Base URL without a trailing slash, e.g. `http://judge0:2358`.
    pub base_url: String,
    /// Sent as `X-Auth-Token` when the judge has authentication enabled.
    pub auth_token: Option<String>,
    pub request_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub poll_max_interval_ms: u64,
    pub max_polls: u32,
    /// How many test cases of one submission may be in flight at once.
    pub max_concurrency: usize,
}

impl JudgeConfig {
    /// Builds a judge configuration with default tuning for the given base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            auth_token: None,
            request_timeout_secs: 10,
            poll_interval_ms: 250,
            poll_max_interval_ms: 2_000,
            max_polls: 120,
            max_concurrency: 4,
        }
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            initial_delay: Duration::from_millis(self.poll_interval_ms),
            max_delay: Duration::from_millis(self.poll_max_interval_ms.max(self.poll_interval_ms)),
            max_attempts: self.max_polls.max(1),
        }
    }

    fn from_env() -> Self {
        let raw_url = env::var("JUDGE_URL").expect("JUDGE_URL must be set");
        Url::parse(raw_url.trim()).expect("JUDGE_URL must be a valid URL");

        let defaults = Self::with_base_url(raw_url);

        Self {
            auth_token: env::var("JUDGE_AUTH_TOKEN").ok().filter(|t| !t.is_empty()),
            request_timeout_secs: env_or("JUDGE_REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs),
            poll_interval_ms: env_or("JUDGE_POLL_INTERVAL_MS", defaults.poll_interval_ms),
            poll_max_interval_ms: env_or("JUDGE_POLL_MAX_INTERVAL_MS", defaults.poll_max_interval_ms),
            max_polls: env_or("JUDGE_MAX_POLLS", defaults.max_polls),
            max_concurrency: env_or("JUDGE_MAX_CONCURRENCY", defaults.max_concurrency).max(1),
            ..defaults
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    pub judge: JudgeConfig,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        Self {
            database_url,
            jwt_secret,
            jwt_expiration: env_or("JWT_EXPIRATION", 86_400),
            rust_log,
            admin_username: env::var("ADMIN_USERNAME").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
            judge: JudgeConfig::from_env(),
        }
    }
}

/// Reads and parses an optional variable, falling back to `default` when it
/// is unset or malformed.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "ignoring malformed configuration value");
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let config = JudgeConfig::with_base_url(" http://judge.local:2358/ \n");
        assert_eq!(config.base_url, "http://judge.local:2358");
    }

    #[test]
    fn test_poll_policy_clamps_degenerate_values() {
        let mut config = JudgeConfig::with_base_url("http://judge.local");
        config.poll_interval_ms = 500;
        config.poll_max_interval_ms = 100;
        config.max_polls = 0;

        let policy = config.poll_policy();
        assert_eq!(policy.max_delay, Duration::from_millis(500));
        assert_eq!(policy.max_attempts, 1);
    }
}
