//! User and account-lifecycle models.

use base64::{engine::general_purpose, Engine};
use serde::{Deserialize, Serialize};

/// The authenticated user's identity, persisted alongside the bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: i64,

    pub username: String,

    #[serde(default)]
    pub email: Option<String>,
}

/// Request body for `POST /users/insert`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request body for `POST /users/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response of the login and registration endpoints. The two endpoints have
/// drifted on the success-flag name; absence of both means success.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub successful: Option<bool>,

    #[serde(default)]
    pub success: Option<bool>,

    pub access_token: String,

    #[serde(default)]
    pub user_id: Option<i64>,
}

impl AuthResponse {
    pub fn is_ok(&self) -> bool {
        self.successful.or(self.success).unwrap_or(true)
    }

    /// The user id, recovered from the JWT payload (`sub` or `identity`
    /// claim) when the response body omits it.
    pub fn resolve_user_id(&self) -> Option<i64> {
        self.user_id
            .or_else(|| user_id_from_token(&self.access_token))
    }
}

/// Decode the payload segment of a JWT and pull the user id out of the
/// `sub` or `identity` claim. Tolerates both base64url and standard
/// alphabets since token issuers have differed on this.
fn user_id_from_token(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    let bytes = general_purpose::URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| general_purpose::STANDARD_NO_PAD.decode(payload))
        .ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    let claim = claims.get("sub").or_else(|| claims.get("identity"))?;
    claim
        .as_i64()
        .or_else(|| claim.as_str().and_then(|s| s.parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_with_payload(payload: &str) -> String {
        let encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload);
        format!("header.{encoded}.signature")
    }

    #[test]
    fn test_user_id_from_numeric_sub() {
        let token = token_with_payload(r#"{"sub": 42}"#);
        assert_eq!(user_id_from_token(&token), Some(42));
    }

    #[test]
    fn test_user_id_from_string_identity() {
        let token = token_with_payload(r#"{"identity": "7"}"#);
        assert_eq!(user_id_from_token(&token), Some(7));
    }

    #[test]
    fn test_resolve_prefers_response_body() {
        let response = AuthResponse {
            successful: Some(true),
            success: None,
            access_token: token_with_payload(r#"{"sub": 1}"#),
            user_id: Some(9),
        };
        assert_eq!(response.resolve_user_id(), Some(9));
    }

    #[test]
    fn test_garbage_token_yields_none() {
        assert_eq!(user_id_from_token("not-a-jwt"), None);
    }
}
