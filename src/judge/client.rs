use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, warn};

use super::types::TokenResponse;
use super::{JudgeBackend, JudgeError, JudgeOutcome, SubmissionPayload};
use crate::config::JudgeConfig;

const AUTH_TOKEN_HEADER: HeaderName = HeaderName::from_static("x-auth-token");

/// HTTP client for a Judge0-compatible service.
#[derive(Debug, Clone)]
pub struct Judge0Client {
    client: reqwest::Client,
    base_url: String,
}

impl Judge0Client {
    pub fn new(config: &JudgeConfig) -> Result<Self, JudgeError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.auth_token {
            let value = HeaderValue::from_str(token).map_err(|e| {
                JudgeError::Unreachable(format!("invalid judge auth token: {}", e))
            })?;
            headers.insert(AUTH_TOKEN_HEADER, value);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| JudgeError::Unreachable(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, JudgeError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| JudgeError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(JudgeError::Unreachable(format!("GET {} returned {}", url, status)));
        }

        response
            .json()
            .await
            .map_err(|e| JudgeError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl JudgeBackend for Judge0Client {
    async fn submit(&self, payload: &SubmissionPayload<'_>) -> Result<String, JudgeError> {
        let url = format!("{}/submissions?base64_encoded=false", self.base_url);
        debug!(url = %url, language_id = payload.language_id, "submitting to judge");

        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| JudgeError::Unreachable(e.to_string()))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(JudgeError::Unreachable(format!("POST {} returned {}", url, status)));
        }

        // A 4xx (unknown language, oversized source) still carries a JSON body,
        // just without a token.
        let body = response
            .text()
            .await
            .map_err(|e| JudgeError::Unreachable(e.to_string()))?;
        let parsed: TokenResponse =
            serde_json::from_str(&body).map_err(|e| JudgeError::InvalidResponse(e.to_string()))?;

        match parsed.token.filter(|t| !t.trim().is_empty()) {
            Some(token) => Ok(token),
            None => {
                warn!(status = %status, body = %body, "judge did not issue a token");
                Err(JudgeError::TokenMissing)
            }
        }
    }

    async fn fetch(&self, token: &str) -> Result<JudgeOutcome, JudgeError> {
        let url = format!("{}/submissions/{}?base64_encoded=false", self.base_url, token);
        self.get_json(&url).await
    }

    async fn languages(&self) -> Result<serde_json::Value, JudgeError> {
        let url = format!("{}/languages", self.base_url);
        self.get_json(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> Judge0Client {
        Judge0Client::new(&JudgeConfig::with_base_url(server.uri())).expect("failed to create client")
    }

    #[tokio::test]
    async fn test_submit_returns_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/submissions"))
            .and(query_param("base64_encoded", "false"))
            .and(body_partial_json(serde_json::json!({
                "source_code": "print(input())",
                "language_id": 71,
                "stdin": "5",
                "cpu_time_limit": 1.0,
                "cpu_extra_time": 0.5,
                "wall_time_limit": 20.0
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"token": "abc-123"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let payload = SubmissionPayload::new("print(input())", 71, "5", 1.0);
        let token = client.submit(&payload).await.unwrap();
        assert_eq!(token, "abc-123");
    }

    #[tokio::test]
    async fn test_submit_without_token_is_token_missing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/submissions"))
            .respond_with(
                ResponseTemplate::new(422).set_body_json(serde_json::json!({"language_id": ["is invalid"]})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .submit(&SubmissionPayload::new("x", 9999, "", 1.0))
            .await
            .unwrap_err();
        assert!(matches!(err, JudgeError::TokenMissing));
    }

    #[tokio::test]
    async fn test_server_error_is_unreachable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/submissions"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client
            .submit(&SubmissionPayload::new("x", 71, "", 1.0))
            .await
            .unwrap_err();
        assert!(matches!(err, JudgeError::Unreachable(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_unreachable() {
        // Nothing listens on the discard port.
        let client = Judge0Client::new(&JudgeConfig::with_base_url("http://127.0.0.1:9")).unwrap();
        let err = client.fetch("tok").await.unwrap_err();
        assert!(matches!(err, JudgeError::Unreachable(_)));
    }

    #[tokio::test]
    async fn test_fetch_decodes_outcome() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/submissions/abc-123"))
            .and(query_param("base64_encoded", "false"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "stdout": "5\n",
                "time": "0.004",
                "memory": 2048,
                "status": {"id": 3, "description": "Accepted"}
            })))
            .mount(&server)
            .await;

        let outcome = client_for(&server).fetch("abc-123").await.unwrap();
        assert_eq!(outcome.status.id, 3);
        assert_eq!(outcome.time, Some(0.004));
        assert_eq!(outcome.memory, Some(2048));
    }

    #[tokio::test]
    async fn test_fetch_garbage_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/submissions/abc-123"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch("abc-123").await.unwrap_err();
        assert!(matches!(err, JudgeError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_languages_passthrough_with_auth_header() {
        let server = MockServer::start().await;
        let languages = serde_json::json!([
            {"id": 71, "name": "Python (3.8.1)"},
            {"id": 54, "name": "C++ (GCC 9.2.0)"}
        ]);
        Mock::given(method("GET"))
            .and(path("/languages"))
            .and(header("x-auth-token", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(languages.clone()))
            .mount(&server)
            .await;

        let mut config = JudgeConfig::with_base_url(server.uri());
        config.auth_token = Some("secret".to_string());
        let client = Judge0Client::new(&config).unwrap();

        assert_eq!(client.languages().await.unwrap(), languages);
    }

    #[tokio::test]
    async fn test_trailing_slash_in_base_url_is_ignored() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/languages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = JudgeConfig::with_base_url(server.uri());
        config.base_url.push('/');
        let client = Judge0Client::new(&config).unwrap();

        assert_eq!(client.languages().await.unwrap(), serde_json::json!([]));
    }
}
