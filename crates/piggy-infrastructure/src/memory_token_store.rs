//! Session-only token store.

use piggy_core::auth::{StorageKey, TokenStore};
use piggy_core::error::{PiggyError, Result};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory token store; contents are lost when the process exits.
///
/// Backs logins made without "remember me", and doubles as the store used in
/// tests.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: RwLock<HashMap<StorageKey, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().map(|e| e.is_empty()).unwrap_or(true)
    }
}

fn poisoned() -> PiggyError {
    PiggyError::storage("memory token store lock poisoned")
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: StorageKey) -> Result<Option<String>> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(&key).cloned())
    }

    fn set(&self, key: StorageKey, value: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: StorageKey) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.remove(&key);
        Ok(())
    }

    fn write_batch(&self, batch: &[(StorageKey, Option<&str>)]) -> Result<()> {
        // One write guard for the whole batch.
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        for (key, value) in batch {
            match value {
                Some(value) => {
                    entries.insert(*key, (*value).to_string());
                }
                None => {
                    entries.remove(key);
                }
            }
        }
        Ok(())
    }
}
