//! Authentication domain module.
//!
//! - `api`: the remote authentication contract
//! - `token_store`: credential storage trait and helpers
//! - `session`: session record, startup outcome, and operation results

mod api;
mod session;
mod token_store;

pub use api::{
    ApiError, AuthApi, AuthTokens, ChangePasswordRequest, ForgotPasswordRequest, LoginRequest,
    RefreshRequest, RefreshedToken, RegisterRequest, ResetPasswordRequest,
};
pub use session::{
    AuthFailure, AuthResult, AuthState, GENERIC_FAILURE_MESSAGE, InitOutcome, Persistence, Session,
    UnauthenticatedReason,
};
pub use token_store::{
    StorageKey, StoredCredentials, TokenStore, clear_credentials, load_credentials,
    save_credentials,
};
