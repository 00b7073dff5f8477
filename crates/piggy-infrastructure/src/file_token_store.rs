//! Durable token store backed by a single JSON file.

use crate::paths::PiggyPaths;
use crate::storage::{AtomicJsonError, AtomicJsonFile};
use piggy_core::auth::{StorageKey, TokenStore};
use piggy_core::error::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

type Entries = BTreeMap<String, String>;

/// Token store persisted to `tokens.json`.
///
/// The file is a flat JSON object keyed by the namespaced storage key names.
/// A batch write is committed as a single atomic file replacement, so the
/// three credential fields can never be observed half-written.
///
/// A file that cannot be parsed reads as empty and is replaced on the next
/// write.
pub struct FileTokenStore {
    file: AtomicJsonFile<Entries>,
}

impl FileTokenStore {
    /// Creates a store at the default location (`~/.config/piggy/tokens.json`).
    pub fn new() -> Result<Self> {
        let path = PiggyPaths::default().token_file()?;
        Ok(Self::with_path(path))
    }

    /// Creates a store at a custom path.
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: AtomicJsonFile::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    fn read_entries(&self) -> Result<Entries> {
        match self.file.load() {
            Ok(entries) => Ok(entries.unwrap_or_default()),
            Err(AtomicJsonError::JsonError(e)) => {
                tracing::warn!(
                    "[FileTokenStore] Ignoring unreadable token file {:?}: {}",
                    self.file.path(),
                    e
                );
                Ok(Entries::new())
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn apply(entries: &mut Entries, batch: &[(StorageKey, Option<&str>)]) {
    for (key, value) in batch {
        match value {
            Some(value) => {
                entries.insert(key.as_str().to_string(), (*value).to_string());
            }
            None => {
                entries.remove(key.as_str());
            }
        }
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: StorageKey) -> Result<Option<String>> {
        Ok(self.read_entries()?.remove(key.as_str()))
    }

    fn set(&self, key: StorageKey, value: &str) -> Result<()> {
        self.write_batch(&[(key, Some(value))])
    }

    fn remove(&self, key: StorageKey) -> Result<()> {
        self.write_batch(&[(key, None)])
    }

    fn write_batch(&self, batch: &[(StorageKey, Option<&str>)]) -> Result<()> {
        let result = self.file.update(Entries::new(), |entries| {
            apply(entries, batch);
            Ok(())
        });

        match result {
            Ok(()) => Ok(()),
            Err(AtomicJsonError::JsonError(e)) => {
                tracing::warn!(
                    "[FileTokenStore] Replacing unreadable token file {:?}: {}",
                    self.file.path(),
                    e
                );
                let mut entries = Entries::new();
                apply(&mut entries, batch);
                self.file.overwrite(&entries)?;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
