//! Account lifecycle endpoints.
//!
//! Login and registration persist the returned token and identity into the
//! session context, which notifies its subscribers.

use super::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, UserIdentity};

impl ApiClient {
    /// Create an account and establish a session.
    /// POST /users/insert
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> ClientResult<UserIdentity> {
        validate_registration(username, email, password)?;

        let response = self
            .http
            .post(self.url("/users/insert"))
            .json(&RegisterRequest {
                username: username.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;

        let auth: AuthResponse = Self::handle(response).await?;
        if !auth.is_ok() {
            return Err(ClientError::Auth("registration was rejected".to_string()));
        }

        self.establish_session(auth, username, Some(email)).await
    }

    /// Log in and establish a session.
    /// POST /users/login
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<UserIdentity> {
        if username.trim().is_empty() || password.trim().is_empty() {
            return Err(ClientError::Validation(
                "username and password are required".to_string(),
            ));
        }

        let response = self
            .http
            .post(self.url("/users/login"))
            .json(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;

        let auth: AuthResponse = Self::handle(response).await?;
        if !auth.is_ok() {
            return Err(ClientError::Auth(
                "invalid username or password".to_string(),
            ));
        }

        self.establish_session(auth, username, None).await
    }

    async fn establish_session(
        &self,
        auth: AuthResponse,
        username: &str,
        email: Option<&str>,
    ) -> ClientResult<UserIdentity> {
        let user_id = auth.resolve_user_id().ok_or_else(|| {
            ClientError::Auth("response carried no user id, in body or token".to_string())
        })?;

        let user = UserIdentity {
            id: user_id,
            username: username.to_string(),
            email: email.map(str::to_string),
        };

        self.session.login(auth.access_token, user.clone()).await?;
        Ok(user)
    }

    /// All registered users.
    /// GET /users
    pub async fn list_users(&self) -> ClientResult<Vec<UserIdentity>> {
        let response = self.http.get(self.url("/users")).send().await?;
        Self::handle(response).await
    }

    /// A single user.
    /// GET /users/{id}
    pub async fn get_user(&self, user_id: i64) -> ClientResult<UserIdentity> {
        let response = self
            .http
            .get(self.url(&format!("/users/{user_id}")))
            .send()
            .await?;

        Self::handle(response).await
    }
}

/// Pre-submit checks for registration. Field-scoped messages; nothing is
/// sent until all pass.
fn validate_registration(username: &str, email: &str, password: &str) -> ClientResult<()> {
    if username.trim().is_empty() {
        return Err(ClientError::Validation("username is required".to_string()));
    }
    if email.trim().is_empty() || !email.contains('@') {
        return Err(ClientError::Validation(
            "a valid email address is required".to_string(),
        ));
    }
    if password.len() < 8 {
        return Err(ClientError::Validation(
            "password must be at least 8 characters".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_alphabetic())
        || !password.chars().any(|c| c.is_ascii_digit())
    {
        return Err(ClientError::Validation(
            "password must contain both letters and digits".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_validation() {
        assert!(validate_registration("ada", "ada@example.com", "hunter42x").is_ok());
        assert!(validate_registration("", "ada@example.com", "hunter42x").is_err());
        assert!(validate_registration("ada", "not-an-email", "hunter42x").is_err());
        assert!(validate_registration("ada", "ada@example.com", "short1").is_err());
        assert!(validate_registration("ada", "ada@example.com", "onlyletters").is_err());
        assert!(validate_registration("ada", "ada@example.com", "12345678").is_err());
    }
}
