//! Token store trait and credential helpers.
//!
//! A token store is a plain key-value surface holding three well-known
//! entries. The helpers in this module are the only code that reads or writes
//! those entries as a group.

use crate::error::Result;
use crate::user::UserProfile;

/// The three well-known, namespaced storage keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    AccessToken,
    RefreshToken,
    User,
}

impl StorageKey {
    pub const ALL: [StorageKey; 3] = [
        StorageKey::AccessToken,
        StorageKey::RefreshToken,
        StorageKey::User,
    ];

    /// The persisted name of the key.
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::AccessToken => "piggy_access_token",
            StorageKey::RefreshToken => "piggy_refresh_token",
            StorageKey::User => "piggy_user",
        }
    }
}

impl std::fmt::Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Durable or session-scoped key-value storage for credentials.
///
/// All operations are synchronous. Implementations must be safe to share
/// between tasks.
pub trait TokenStore: Send + Sync {
    fn get(&self, key: StorageKey) -> Result<Option<String>>;

    fn set(&self, key: StorageKey, value: &str) -> Result<()>;

    fn remove(&self, key: StorageKey) -> Result<()>;

    /// Applies several writes; `None` removes the key.
    ///
    /// The default applies entries one by one. File-backed stores override
    /// this to commit the whole batch in a single write.
    fn write_batch(&self, entries: &[(StorageKey, Option<&str>)]) -> Result<()> {
        for (key, value) in entries {
            match value {
                Some(value) => self.set(*key, value)?,
                None => self.remove(*key)?,
            }
        }
        Ok(())
    }
}

/// Credentials as read back from a store.
///
/// Any field may be absent; callers decide what a partial read means.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredCredentials {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<UserProfile>,
}

impl StoredCredentials {
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none() && self.user.is_none()
    }

    /// True when the fields needed to resume a session are present.
    pub fn is_resumable(&self) -> bool {
        self.access_token.is_some() && self.user.is_some()
    }
}

/// Writes all three credential fields as one batch.
pub fn save_credentials(
    store: &dyn TokenStore,
    access_token: &str,
    refresh_token: &str,
    user: &UserProfile,
) -> Result<()> {
    let user_json = user.to_json()?;
    store.write_batch(&[
        (StorageKey::AccessToken, Some(access_token)),
        (StorageKey::RefreshToken, Some(refresh_token)),
        (StorageKey::User, Some(user_json.as_str())),
    ])
}

/// Removes all three credential fields as one batch.
pub fn clear_credentials(store: &dyn TokenStore) -> Result<()> {
    store.write_batch(&[
        (StorageKey::AccessToken, None),
        (StorageKey::RefreshToken, None),
        (StorageKey::User, None),
    ])
}

/// Reads all three credential fields.
///
/// A USER entry that fails to parse is removed and reported as absent.
pub fn load_credentials(store: &dyn TokenStore) -> Result<StoredCredentials> {
    let access_token = store.get(StorageKey::AccessToken)?;
    let refresh_token = store.get(StorageKey::RefreshToken)?;

    let user = match store.get(StorageKey::User)? {
        Some(raw) => match UserProfile::from_json(&raw) {
            Ok(user) => Some(user),
            Err(err) => {
                tracing::warn!(
                    "[TokenStore] Discarding corrupted {} entry: {}",
                    StorageKey::User,
                    err
                );
                store.remove(StorageKey::User)?;
                None
            }
        },
        None => None,
    };

    Ok(StoredCredentials {
        access_token,
        refresh_token,
        user,
    })
}
