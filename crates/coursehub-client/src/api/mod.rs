//! HTTP client for the CourseHub backend.
//!
//! One [`ApiClient`] wraps a shared `reqwest::Client` and the session
//! context. Mutating endpoints require an authenticated session and are
//! rejected client-side, before any request is made, when none exists.
//! Non-2xx responses are reduced to a single message taken from the JSON
//! `error`/`message` field when present, else the HTTP status text.

mod courses;
mod discussions;
mod users;

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::session::{Session, SessionData};

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    session: Session,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, session: Session) -> Self {
        Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the bearer token when a session is active. Listing endpoints
    /// accept anonymous requests, so absence is not an error here.
    async fn maybe_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.session.token().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Require an authenticated session before issuing a request. `action`
    /// names the blocked operation in the error message.
    async fn require_auth(&self, action: &str) -> ClientResult<SessionData> {
        self.session
            .current()
            .await
            .ok_or_else(|| ClientError::AuthRequired(action.to_string()))
    }

    /// Parse a successful response, or reduce a failed one to an API error.
    async fn handle<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(Self::api_error(status, &body))
        }
    }

    /// Check a successful response's status and discard the body.
    async fn handle_empty(response: reqwest::Response) -> ClientResult<()> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(Self::api_error(status, &body))
        }
    }

    fn api_error(status: reqwest::StatusCode, body: &str) -> ClientError {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                value
                    .get("error")
                    .or_else(|| value.get("message"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });

        tracing::debug!(status = status.as_u16(), message = %message, "API request failed");
        ClientError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserIdentity;

    // Nothing listens on this port; reaching the network would fail loudly,
    // so passing guards prove no request was made.
    fn offline_client(session: Session) -> ApiClient {
        let config = ClientConfig {
            api_url: "http://127.0.0.1:1".to_string(),
            ..ClientConfig::default()
        };
        ApiClient::new(&config, session)
    }

    #[tokio::test]
    async fn test_mutations_blocked_without_session() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::load_from(dir.path().join("session.yaml")).unwrap();
        let api = offline_client(session);

        let err = api.submit_review("c1", 5.0, "great").await.unwrap_err();
        assert!(matches!(err, ClientError::AuthRequired(_)));

        let err = api.post_reply("d1", "hello").await.unwrap_err();
        assert!(matches!(err, ClientError::AuthRequired(_)));

        let err = api.create_discussion("t", "body", &[]).await.unwrap_err();
        assert!(matches!(err, ClientError::AuthRequired(_)));

        let err = api.delete_reply("d1", "r1").await.unwrap_err();
        assert!(matches!(err, ClientError::AuthRequired(_)));
    }

    #[tokio::test]
    async fn test_rating_range_validated_before_request() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::load_from(dir.path().join("session.yaml")).unwrap();
        session
            .login(
                "tok".to_string(),
                UserIdentity {
                    id: 1,
                    username: "ada".to_string(),
                    email: None,
                },
            )
            .await
            .unwrap();
        let api = offline_client(session);

        let err = api.submit_review("c1", 9.0, "").await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[test]
    fn test_api_error_prefers_error_field() {
        let err = ApiClient::api_error(
            reqwest::StatusCode::CONFLICT,
            r#"{"error": "Review already exists"}"#,
        );
        assert_eq!(err.to_string(), "Review already exists");
        assert!(err.is_duplicate_review());
    }

    #[test]
    fn test_api_error_falls_back_to_message_field() {
        let err = ApiClient::api_error(
            reqwest::StatusCode::BAD_REQUEST,
            r#"{"message": "missing rating"}"#,
        );
        assert_eq!(err.to_string(), "missing rating");
    }

    #[test]
    fn test_api_error_falls_back_to_status_text() {
        let err = ApiClient::api_error(reqwest::StatusCode::BAD_GATEWAY, "<html>oops</html>");
        assert_eq!(err.to_string(), "Bad Gateway");
    }
}
