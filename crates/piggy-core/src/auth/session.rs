//! Session state and operation results.

use super::api::ApiError;
use crate::user::UserProfile;
use serde::{Deserialize, Serialize};

/// Where the current credentials are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persistence {
    /// Written to the durable token store and restored on next start.
    #[default]
    Durable,
    /// Kept in memory only; gone when the process exits.
    SessionOnly,
}

impl Persistence {
    /// Maps the login "remember me" flag to a persistence tier.
    pub fn from_remember_me(remember_me: bool) -> Self {
        if remember_me {
            Persistence::Durable
        } else {
            Persistence::SessionOnly
        }
    }

    /// The tier that does not hold the credentials.
    pub fn other(self) -> Self {
        match self {
            Persistence::Durable => Persistence::SessionOnly,
            Persistence::SessionOnly => Persistence::Durable,
        }
    }
}

/// Coarse authentication state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
    Unauthenticated,
    Initializing,
    Authenticated,
}

/// In-memory session record.
///
/// `current_user` is present iff a validated access token is held in the
/// store named by `persistence`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub current_user: Option<UserProfile>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub loading: bool,
    pub last_error: Option<String>,
    pub persistence: Persistence,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            current_user: None,
            access_token: None,
            refresh_token: None,
            // A fresh session has not been initialized yet.
            loading: true,
            last_error: None,
            persistence: Persistence::Durable,
        }
    }
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.current_user.is_some()
    }

    pub fn state(&self) -> AuthState {
        if self.loading {
            AuthState::Initializing
        } else if self.is_authenticated() {
            AuthState::Authenticated
        } else {
            AuthState::Unauthenticated
        }
    }

    /// Replaces the whole authenticated part of the session.
    pub fn authenticate(
        &mut self,
        user: UserProfile,
        access_token: String,
        refresh_token: Option<String>,
        persistence: Persistence,
    ) {
        self.current_user = Some(user);
        self.access_token = Some(access_token);
        self.refresh_token = refresh_token;
        self.persistence = persistence;
    }

    /// Drops the user and both tokens. `loading` and `last_error` are kept.
    pub fn sign_out(&mut self) {
        self.current_user = None;
        self.access_token = None;
        self.refresh_token = None;
        self.persistence = Persistence::Durable;
    }
}

/// Why startup ended without an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnauthenticatedReason {
    /// No access token or no stored user was found.
    NoStoredSession,
    /// Verify rejected the token and there was no refresh token.
    NoRefreshToken,
    /// Verify rejected the token and refresh was rejected too.
    RefreshRejected,
    /// Refresh succeeded but the new access token failed verification.
    ReverifyRejected,
    /// The token store could not be read or written.
    StorageFailure,
}

/// Result of the startup `initialize` sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    /// The stored access token was accepted.
    Verified(UserProfile),
    /// The stored access token was renewed through the refresh token.
    RefreshedAndVerified(UserProfile),
    /// Storage ends up cleared and no user is signed in.
    Unauthenticated(UnauthenticatedReason),
}

impl InitOutcome {
    pub fn user(&self) -> Option<&UserProfile> {
        match self {
            InitOutcome::Verified(user) | InitOutcome::RefreshedAndVerified(user) => Some(user),
            InitOutcome::Unauthenticated(_) => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }
}

/// Failure returned by every public Session Manager operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthFailure {
    pub message: String,
    pub status: Option<u16>,
}

impl AuthFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }
}

impl std::fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for AuthFailure {}

impl From<ApiError> for AuthFailure {
    fn from(err: ApiError) -> Self {
        let status = err.status();
        let message = match err.message().trim() {
            "" => GENERIC_FAILURE_MESSAGE.to_string(),
            message => message.to_string(),
        };
        Self { message, status }
    }
}

/// Fallback when the remote gives no usable message.
pub const GENERIC_FAILURE_MESSAGE: &str = "Request failed, please try again";

/// Discriminated success/failure result of a Session Manager operation.
pub type AuthResult<T> = std::result::Result<T, AuthFailure>;
