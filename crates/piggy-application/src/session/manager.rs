use piggy_core::auth::{
    AuthApi, AuthFailure, AuthResult, AuthState, AuthTokens, ChangePasswordRequest,
    ForgotPasswordRequest, InitOutcome, LoginRequest, Persistence, RefreshRequest,
    RegisterRequest, ResetPasswordRequest, Session, StorageKey, StoredCredentials, TokenStore,
    UnauthenticatedReason, clear_credentials, load_credentials, save_credentials,
};
use piggy_core::error::{PiggyError, Result};
use piggy_core::user::UserProfile;
use piggy_infrastructure::MemoryTokenStore;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, RwLock};

/// Failure message for operations that need a signed-in user.
pub const NOT_AUTHENTICATED: &str = "Not authenticated";

/// Owns the authentication session of the client.
///
/// `SessionManager` is responsible for:
/// - Restoring the stored session on startup, refreshing the access token
///   silently when the stored one is rejected
/// - Login, registration and logout
/// - Password change and the forgot/reset pass-throughs
///
/// Credentials live in one of two token stores: the durable store (kept
/// across restarts) or the session-only store (in memory). The three
/// credential entries are always written and cleared together.
pub struct SessionManager {
    api: Arc<dyn AuthApi>,
    /// Credentials of "remember me" logins and registrations
    durable: Arc<dyn TokenStore>,
    /// Credentials that must not outlive the process
    session_only: Arc<dyn TokenStore>,
    session: RwLock<Session>,
    /// Serializes operations so their state mutations never interleave.
    op_lock: Mutex<()>,
}

impl SessionManager {
    /// Creates a manager over the remote API and the durable token store.
    ///
    /// Session-only credentials go to a fresh [`MemoryTokenStore`].
    pub fn new(api: Arc<dyn AuthApi>, durable: Arc<dyn TokenStore>) -> Self {
        Self {
            api,
            durable,
            session_only: Arc::new(MemoryTokenStore::new()),
            session: RwLock::new(Session::default()),
            op_lock: Mutex::new(()),
        }
    }

    /// Replaces the store used for session-only credentials.
    pub fn with_session_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.session_only = store;
        self
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    /// Returns a snapshot of the whole session.
    pub async fn session(&self) -> Session {
        self.session.read().await.clone()
    }

    pub async fn current_user(&self) -> Option<UserProfile> {
        self.session.read().await.current_user.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_authenticated()
    }

    /// True on a fresh manager and while [`initialize`](Self::initialize)
    /// runs. Any completed operation leaves it false.
    pub async fn is_loading(&self) -> bool {
        self.session.read().await.loading
    }

    /// Message of the most recent failed operation.
    pub async fn last_error(&self) -> Option<String> {
        self.session.read().await.last_error.clone()
    }

    pub async fn state(&self) -> AuthState {
        self.session.read().await.state()
    }

    // ---------------------------------------------------------------------
    // Startup
    // ---------------------------------------------------------------------

    /// Restores the stored session.
    ///
    /// The stored access token is verified remotely. A rejected token is
    /// renewed through the refresh token when one is stored; otherwise, or
    /// when the renewal fails, all stored credentials are cleared. Never
    /// fails: every problem ends in [`InitOutcome::Unauthenticated`].
    pub async fn initialize(&self) -> InitOutcome {
        let _guard = self.op_lock.lock().await;
        {
            let mut session = self.session.write().await;
            session.loading = true;
            session.last_error = None;
        }

        let outcome = match self.restore().await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!("[SessionManager] Failed to restore session: {}", e);
                self.clear_stores();
                InitOutcome::Unauthenticated(UnauthenticatedReason::StorageFailure)
            }
        };

        let mut session = self.session.write().await;
        match &outcome {
            InitOutcome::Verified(user) | InitOutcome::RefreshedAndVerified(user) => {
                tracing::info!("[SessionManager] Session restored for {}", user.username);
            }
            InitOutcome::Unauthenticated(reason) => {
                tracing::info!("[SessionManager] No session restored ({:?})", reason);
                session.sign_out();
            }
        }
        session.loading = false;

        outcome
    }

    async fn restore(&self) -> Result<InitOutcome> {
        let (persistence, stored) = self.read_stored()?;
        let store = self.store_for(persistence);

        let access_token = match stored.access_token.as_deref() {
            Some(access_token) if stored.is_resumable() => access_token.to_string(),
            _ => {
                if !stored.is_empty() {
                    tracing::debug!("[SessionManager] Clearing partial stored credentials");
                    clear_credentials(store)?;
                }
                return Ok(InitOutcome::Unauthenticated(
                    UnauthenticatedReason::NoStoredSession,
                ));
            }
        };

        tracing::debug!("[SessionManager] Verifying stored access token");
        match self.api.verify(&access_token).await {
            Ok(user) => {
                store.set(StorageKey::User, &user.to_json()?)?;
                self.session.write().await.authenticate(
                    user.clone(),
                    access_token,
                    stored.refresh_token.clone(),
                    persistence,
                );
                return Ok(InitOutcome::Verified(user));
            }
            Err(e) => {
                tracing::debug!("[SessionManager] Stored access token rejected: {}", e);
            }
        }

        let Some(refresh_token) = stored.refresh_token else {
            clear_credentials(store)?;
            return Ok(InitOutcome::Unauthenticated(
                UnauthenticatedReason::NoRefreshToken,
            ));
        };

        let request = RefreshRequest {
            refresh_token: refresh_token.clone(),
        };
        let refreshed = match self.api.refresh(&request).await {
            Ok(refreshed) => refreshed,
            Err(e) => {
                tracing::debug!("[SessionManager] Refresh rejected: {}", e);
                clear_credentials(store)?;
                return Ok(InitOutcome::Unauthenticated(
                    UnauthenticatedReason::RefreshRejected,
                ));
            }
        };
        store.set(StorageKey::AccessToken, &refreshed.access_token)?;

        match self.api.verify(&refreshed.access_token).await {
            Ok(user) => {
                store.set(StorageKey::User, &user.to_json()?)?;
                self.session.write().await.authenticate(
                    user.clone(),
                    refreshed.access_token,
                    Some(refresh_token),
                    persistence,
                );
                Ok(InitOutcome::RefreshedAndVerified(user))
            }
            Err(e) => {
                tracing::debug!("[SessionManager] Refreshed access token rejected: {}", e);
                clear_credentials(store)?;
                Ok(InitOutcome::Unauthenticated(
                    UnauthenticatedReason::ReverifyRejected,
                ))
            }
        }
    }

    /// Picks the session-only store when it holds an access token.
    fn read_stored(&self) -> Result<(Persistence, StoredCredentials)> {
        let session_only = load_credentials(self.session_only.as_ref())?;
        if session_only.access_token.is_some() {
            return Ok((Persistence::SessionOnly, session_only));
        }
        if !session_only.is_empty() {
            clear_credentials(self.session_only.as_ref())?;
        }
        Ok((Persistence::Durable, load_credentials(self.durable.as_ref())?))
    }

    // ---------------------------------------------------------------------
    // Login / registration / logout
    // ---------------------------------------------------------------------

    /// Signs in with a username or email.
    ///
    /// With `remember_me` the credentials go to the durable store, otherwise
    /// to the session-only store. The user is signed in before this returns.
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
        remember_me: bool,
    ) -> AuthResult<UserProfile> {
        let _guard = self.begin().await;

        if identifier.trim().is_empty() || password.is_empty() {
            return self
                .fail(AuthFailure::new("Username/email and password are required"))
                .await;
        }

        let request = LoginRequest {
            username_or_email: identifier.trim().to_string(),
            password: password.to_string(),
            remember_me,
        };
        tracing::debug!("[SessionManager] Logging in");
        match self.api.login(&request).await {
            Ok(tokens) => {
                self.establish(tokens, Persistence::from_remember_me(remember_me))
                    .await
            }
            Err(e) => self.fail(e.into()).await,
        }
    }

    /// Creates an account and signs it in with durable credentials.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> AuthResult<UserProfile> {
        let _guard = self.begin().await;

        if username.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
            return self
                .fail(AuthFailure::new("Username, email and password are required"))
                .await;
        }

        let request = RegisterRequest {
            username: username.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        tracing::debug!("[SessionManager] Registering {}", request.username);
        match self.api.register(&request).await {
            Ok(tokens) => self.establish(tokens, Persistence::Durable).await,
            Err(e) => self.fail(e.into()).await,
        }
    }

    /// Persists freshly issued credentials and signs the user in.
    async fn establish(
        &self,
        tokens: AuthTokens,
        persistence: Persistence,
    ) -> AuthResult<UserProfile> {
        let store = self.store_for(persistence);

        let previous = match snapshot(store) {
            Ok(previous) => previous,
            Err(e) => return self.fail(storage_failure(e)).await,
        };
        if let Err(e) = save_credentials(
            store,
            &tokens.access_token,
            &tokens.refresh_token,
            &tokens.user,
        ) {
            if let Err(rollback) = restore_snapshot(store, &previous) {
                tracing::warn!("[SessionManager] Rollback failed: {}", rollback);
            }
            return self.fail(storage_failure(e)).await;
        }

        // Stale credentials left in the other store would win the next restore.
        if let Err(e) = clear_credentials(self.store_for(persistence.other())) {
            tracing::warn!(
                "[SessionManager] Failed to clear {:?} credentials: {}",
                persistence.other(),
                e
            );
            if let Err(rollback) = restore_snapshot(store, &previous) {
                tracing::warn!("[SessionManager] Rollback failed: {}", rollback);
            }
            return self.fail(storage_failure(e)).await;
        }

        let AuthTokens {
            access_token,
            refresh_token,
            user,
        } = tokens;
        self.session.write().await.authenticate(
            user.clone(),
            access_token,
            Some(refresh_token),
            persistence,
        );
        tracing::info!(
            "[SessionManager] Signed in as {} ({:?})",
            user.username,
            persistence
        );
        Ok(user)
    }

    /// Signs out locally, notifying the server when a token is held.
    ///
    /// The remote call is best-effort; local credentials are always cleared.
    pub async fn logout(&self) {
        let _guard = self.begin().await;

        if let Some(access_token) = self.stored_access_token() {
            if let Err(e) = self.api.logout(&access_token).await {
                tracing::warn!("[SessionManager] Remote logout failed: {}", e);
            }
        }

        self.clear_stores();
        self.session.write().await.sign_out();
        tracing::info!("[SessionManager] Signed out");
    }

    // ---------------------------------------------------------------------
    // Passwords
    // ---------------------------------------------------------------------

    /// Changes the password of the signed-in user. Tokens stay as they are.
    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> AuthResult<()> {
        let _guard = self.begin().await;

        let Some(access_token) = self.stored_access_token() else {
            return self.fail(AuthFailure::new(NOT_AUTHENTICATED)).await;
        };
        if current_password.is_empty() || new_password.is_empty() {
            return self
                .fail(AuthFailure::new("Current and new password are required"))
                .await;
        }

        let request = ChangePasswordRequest {
            current_password: current_password.to_string(),
            new_password: new_password.to_string(),
        };
        match self.api.change_password(&access_token, &request).await {
            Ok(()) => {
                tracing::info!("[SessionManager] Password changed");
                Ok(())
            }
            Err(e) => self.fail(e.into()).await,
        }
    }

    /// Asks the server to send a password reset link.
    pub async fn forgot_password(&self, email: &str) -> AuthResult<()> {
        let _guard = self.begin().await;

        if email.trim().is_empty() {
            return self.fail(AuthFailure::new("Email is required")).await;
        }

        let request = ForgotPasswordRequest {
            email: email.trim().to_string(),
        };
        match self.api.forgot_password(&request).await {
            Ok(()) => Ok(()),
            Err(e) => self.fail(e.into()).await,
        }
    }

    /// Sets a new password using a reset token.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> AuthResult<()> {
        let _guard = self.begin().await;

        if token.trim().is_empty() || new_password.is_empty() {
            return self
                .fail(AuthFailure::new("Reset token and new password are required"))
                .await;
        }

        let request = ResetPasswordRequest {
            token: token.trim().to_string(),
            new_password: new_password.to_string(),
        };
        match self.api.reset_password(&request).await {
            Ok(()) => Ok(()),
            Err(e) => self.fail(e.into()).await,
        }
    }

    // ---------------------------------------------------------------------
    // Local profile
    // ---------------------------------------------------------------------

    /// Replaces the signed-in user's profile locally. No remote call.
    pub async fn update_user(&self, user: UserProfile) -> AuthResult<()> {
        let _guard = self.begin().await;

        let persistence = {
            let session = self.session.read().await;
            if !session.is_authenticated() {
                drop(session);
                return self.fail(AuthFailure::new(NOT_AUTHENTICATED)).await;
            }
            session.persistence
        };

        let written = user
            .to_json()
            .and_then(|json| self.store_for(persistence).set(StorageKey::User, &json));
        if let Err(e) = written {
            return self.fail(storage_failure(e)).await;
        }

        self.session.write().await.current_user = Some(user);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------------

    /// Takes the operation lock and clears the previous error.
    async fn begin(&self) -> MutexGuard<'_, ()> {
        let guard = self.op_lock.lock().await;
        {
            let mut session = self.session.write().await;
            session.loading = false;
            session.last_error = None;
        }
        guard
    }

    async fn fail<T>(&self, failure: AuthFailure) -> AuthResult<T> {
        tracing::debug!("[SessionManager] Operation failed: {}", failure);
        self.session.write().await.last_error = Some(failure.message.clone());
        Err(failure)
    }

    fn store_for(&self, persistence: Persistence) -> &dyn TokenStore {
        match persistence {
            Persistence::Durable => self.durable.as_ref(),
            Persistence::SessionOnly => self.session_only.as_ref(),
        }
    }

    /// Access token of the active store, session-only first.
    fn stored_access_token(&self) -> Option<String> {
        [Persistence::SessionOnly, Persistence::Durable]
            .into_iter()
            .find_map(|persistence| {
                match self.store_for(persistence).get(StorageKey::AccessToken) {
                    Ok(token) => token,
                    Err(e) => {
                        tracing::warn!(
                            "[SessionManager] Failed to read {:?} access token: {}",
                            persistence,
                            e
                        );
                        None
                    }
                }
            })
    }

    /// Clears both stores, logging failures.
    fn clear_stores(&self) {
        for persistence in [Persistence::SessionOnly, Persistence::Durable] {
            if let Err(e) = clear_credentials(self.store_for(persistence)) {
                tracing::warn!(
                    "[SessionManager] Failed to clear {:?} credentials: {}",
                    persistence,
                    e
                );
            }
        }
    }
}

type Snapshot = Vec<(StorageKey, Option<String>)>;

/// Raw values of the three entries, for rollback.
fn snapshot(store: &dyn TokenStore) -> Result<Snapshot> {
    let mut entries = Vec::with_capacity(StorageKey::ALL.len());
    for key in StorageKey::ALL {
        entries.push((key, store.get(key)?));
    }
    Ok(entries)
}

fn restore_snapshot(store: &dyn TokenStore, snapshot: &Snapshot) -> Result<()> {
    let batch: Vec<(StorageKey, Option<&str>)> = snapshot
        .iter()
        .map(|(key, value)| (*key, value.as_deref()))
        .collect();
    store.write_batch(&batch)
}

fn storage_failure(err: PiggyError) -> AuthFailure {
    AuthFailure::new(format!("Failed to save session: {}", err))
}

#[cfg(test)]
#[path = "manager_test.rs"]
mod tests;
