//! Remote authentication API contract.
//!
//! The Session Manager talks to the remote side exclusively through
//! [`AuthApi`], which keeps the HTTP implementation swappable for tests.

use crate::user::UserProfile;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported by an [`AuthApi`] call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The server answered with a non-success status.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The request never produced a response (DNS, connect, timeout, ...).
    #[error("{0}")]
    Transport(String),

    /// The response body did not have the expected shape.
    #[error("{0}")]
    Decode(String),
}

impl ApiError {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// Human-readable message suitable for surfacing to the user.
    pub fn message(&self) -> &str {
        match self {
            Self::Rejected { message, .. } => message,
            Self::Transport(message) | Self::Decode(message) => message,
        }
    }

    /// HTTP status, if the server responded at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Success payload of login and register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserProfile,
}

/// Success payload of refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshedToken {
    pub access_token: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username_or_email: String,
    pub password: String,
    pub remember_me: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

/// The remote authentication collaborator.
///
/// Bearer tokens are passed explicitly; implementations never read the token
/// store themselves.
#[async_trait::async_trait]
pub trait AuthApi: Send + Sync {
    async fn register(&self, request: &RegisterRequest) -> Result<AuthTokens, ApiError>;

    async fn login(&self, request: &LoginRequest) -> Result<AuthTokens, ApiError>;

    async fn refresh(&self, request: &RefreshRequest) -> Result<RefreshedToken, ApiError>;

    /// Validates `access_token` and returns the profile it belongs to.
    async fn verify(&self, access_token: &str) -> Result<UserProfile, ApiError>;

    async fn logout(&self, access_token: &str) -> Result<(), ApiError>;

    async fn change_password(
        &self,
        access_token: &str,
        request: &ChangePasswordRequest,
    ) -> Result<(), ApiError>;

    async fn forgot_password(&self, request: &ForgotPasswordRequest) -> Result<(), ApiError>;

    async fn reset_password(&self, request: &ResetPasswordRequest) -> Result<(), ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_wire_names() {
        let request = LoginRequest {
            username_or_email: "alice".into(),
            password: "secret".into(),
            remember_me: true,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["usernameOrEmail"], "alice");
        assert_eq!(value["rememberMe"], true);
    }

    #[test]
    fn test_auth_tokens_from_wire() {
        let json = r#"{
            "accessToken": "at",
            "refreshToken": "rt",
            "user": {"id": 7, "username": "alice", "email": "a@x.com", "createdAt": "2024-01-01T00:00:00Z"}
        }"#;
        let tokens: AuthTokens = serde_json::from_str(json).unwrap();
        assert_eq!(tokens.access_token, "at");
        assert_eq!(tokens.refresh_token, "rt");
        assert_eq!(tokens.user.id, "7");
    }

    #[test]
    fn test_api_error_accessors() {
        let err = ApiError::rejected(400, "Invalid credentials");
        assert_eq!(err.message(), "Invalid credentials");
        assert_eq!(err.status(), Some(400));
        assert_eq!(ApiError::Transport("timeout".into()).status(), None);
    }
}
