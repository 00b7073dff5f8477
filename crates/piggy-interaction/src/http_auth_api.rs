//! HttpAuthApi - REST implementation of the remote authentication contract.
//!
//! All endpoints live under `{base_url}/api/auth/`. Requests and responses
//! are JSON; responses may be wrapped in a `data` envelope.

use crate::envelope::{error_message, parse_body, unwrap_data, unwrap_user};
use async_trait::async_trait;
use piggy_core::auth::{
    ApiError, AuthApi, AuthTokens, ChangePasswordRequest, ForgotPasswordRequest, LoginRequest,
    RefreshRequest, RefreshedToken, RegisterRequest, ResetPasswordRequest,
};
use piggy_core::config::{ApiConfig, DEFAULT_TIMEOUT_SECS};
use piggy_core::user::UserProfile;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

const REGISTER_PATH: &str = "/api/auth/register";
const LOGIN_PATH: &str = "/api/auth/login";
const REFRESH_PATH: &str = "/api/auth/refresh";
const VERIFY_PATH: &str = "/api/auth/verify";
const LOGOUT_PATH: &str = "/api/auth/logout";
const CHANGE_PASSWORD_PATH: &str = "/api/auth/change-password";
const FORGOT_PASSWORD_PATH: &str = "/api/auth/forgot-password";
const RESET_PASSWORD_PATH: &str = "/api/auth/reset-password";

/// [`AuthApi`] over HTTP.
#[derive(Clone)]
pub struct HttpAuthApi {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpAuthApi {
    /// Creates a client for the API rooted at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(config.base_url.clone()).with_timeout(Duration::from_secs(config.timeout_secs))
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn post(&self, path: &str) -> RequestBuilder {
        tracing::debug!("[HttpAuthApi] POST {}", path);
        self.client
            .post(format!("{}{}", self.base_url, path))
            .timeout(self.timeout)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        tracing::debug!("[HttpAuthApi] GET {}", path);
        self.client
            .get(format!("{}{}", self.base_url, path))
            .timeout(self.timeout)
    }

    /// Sends the request and returns the unwrapped success body.
    async fn send(&self, request: RequestBuilder) -> Result<Value, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(format!("Request to auth API failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(format!("Failed to read response body: {}", e)))?;
        let body = parse_body(&text);

        if !status.is_success() {
            let message = error_message(&body, status.as_u16());
            tracing::debug!("[HttpAuthApi] Request rejected ({}): {}", status, message);
            return Err(ApiError::rejected(status.as_u16(), message));
        }

        Ok(unwrap_data(body))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let body = self.send(request).await?;
        decode(body)
    }

    async fn send_empty(&self, request: RequestBuilder) -> Result<(), ApiError> {
        self.send(request).await.map(|_| ())
    }
}

fn decode<T: DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    serde_json::from_value(body)
        .map_err(|e| ApiError::Decode(format!("Unexpected response from auth API: {}", e)))
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn register(&self, request: &RegisterRequest) -> Result<AuthTokens, ApiError> {
        self.send_json(self.post(REGISTER_PATH).json(request)).await
    }

    async fn login(&self, request: &LoginRequest) -> Result<AuthTokens, ApiError> {
        self.send_json(self.post(LOGIN_PATH).json(request)).await
    }

    async fn refresh(&self, request: &RefreshRequest) -> Result<RefreshedToken, ApiError> {
        self.send_json(self.post(REFRESH_PATH).json(request)).await
    }

    async fn verify(&self, access_token: &str) -> Result<UserProfile, ApiError> {
        let body = self
            .send(self.get(VERIFY_PATH).bearer_auth(access_token))
            .await?;
        decode(unwrap_user(body))
    }

    async fn logout(&self, access_token: &str) -> Result<(), ApiError> {
        self.send_empty(self.post(LOGOUT_PATH).bearer_auth(access_token))
            .await
    }

    async fn change_password(
        &self,
        access_token: &str,
        request: &ChangePasswordRequest,
    ) -> Result<(), ApiError> {
        self.send_empty(
            self.post(CHANGE_PASSWORD_PATH)
                .bearer_auth(access_token)
                .json(request),
        )
        .await
    }

    async fn forgot_password(&self, request: &ForgotPasswordRequest) -> Result<(), ApiError> {
        self.send_empty(self.post(FORGOT_PASSWORD_PATH).json(request))
            .await
    }

    async fn reset_password(&self, request: &ResetPasswordRequest) -> Result<(), ApiError> {
        self.send_empty(self.post(RESET_PASSWORD_PATH).json(request))
            .await
    }
}
