//! Credential storage: where the token and role flag live between runs.
//!
//! adreward doesn't care where credentials are kept. It defines the
//! [`CredentialStore`] trait and ships two implementations:
//!
//! - [`FileCredentialStore`]: a small JSON file, the desktop/CLI stand-in
//!   for browser local storage.
//! - [`MemoryCredentialStore`]: process-local, for tests and demos.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::{CredentialError, Credentials};

/// Loads, saves, and clears the persisted credential.
///
/// `Send + Sync + 'static` so a store can be shared with background tasks
/// for the life of the client.
pub trait CredentialStore: Send + Sync + 'static {
    /// Returns the stored credential, or `Ok(None)` if nobody is signed in.
    fn load(&self) -> Result<Option<Credentials>, CredentialError>;

    /// Persists a credential, replacing any previous one.
    fn save(&self, credentials: &Credentials) -> Result<(), CredentialError>;

    /// Removes the stored credential (sign-out). Clearing an empty store
    /// is not an error.
    fn clear(&self) -> Result<(), CredentialError>;

    /// Like [`load`](Self::load) but a missing credential is an error.
    ///
    /// This is what authenticated flows call: without a token there is
    /// nothing to send, so the caller must redirect to sign-in.
    fn require(&self) -> Result<Credentials, CredentialError> {
        self.load()?.ok_or(CredentialError::Missing)
    }
}

// ---------------------------------------------------------------------------
// FileCredentialStore
// ---------------------------------------------------------------------------

/// Keeps the credential as JSON in a single file.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Creates a store backed by `path`. Nothing is touched on disk until
    /// the first `load`/`save`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credentials>, CredentialError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no credential file");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let creds: Credentials =
            serde_json::from_slice(&bytes).map_err(CredentialError::Malformed)?;
        creds.check()?;
        Ok(Some(creds))
    }

    fn save(&self, credentials: &Credentials) -> Result<(), CredentialError> {
        credentials.check()?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json =
            serde_json::to_vec_pretty(credentials).map_err(CredentialError::Malformed)?;
        std::fs::write(&self.path, json)?;
        tracing::info!(
            path = %self.path.display(),
            role = %credentials.role,
            "credential saved"
        );
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "credential cleared");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryCredentialStore
// ---------------------------------------------------------------------------

/// Keeps the credential in memory only.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<Credentials>>,
}

impl MemoryCredentialStore {
    /// An empty store (signed out).
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `credentials`.
    pub fn with(credentials: Credentials) -> Self {
        Self {
            slot: Mutex::new(Some(credentials)),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<Credentials>> {
        // A poisoned lock only means another thread panicked mid-write of a
        // plain Option; the value itself is still coherent.
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<Credentials>, CredentialError> {
        Ok(self.slot().clone())
    }

    fn save(&self, credentials: &Credentials) -> Result<(), CredentialError> {
        credentials.check()?;
        *self.slot() = Some(credentials.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        *self.slot() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use adreward_protocol::Role;

    use super::*;

    fn creds(token: &str) -> Credentials {
        Credentials::new(token, Role::User).unwrap()
    }

    #[test]
    fn test_memory_store_starts_empty() {
        let store = MemoryCredentialStore::new();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_memory_store_save_then_load() {
        let store = MemoryCredentialStore::new();
        store.save(&creds("tok")).unwrap();
        assert_eq!(store.load().unwrap(), Some(creds("tok")));
    }

    #[test]
    fn test_memory_store_clear_signs_out() {
        let store = MemoryCredentialStore::with(creds("tok"));
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        // Clearing twice is fine.
        store.clear().unwrap();
    }

    #[test]
    fn test_require_on_empty_store_returns_missing() {
        let store = MemoryCredentialStore::new();
        assert!(matches!(store.require(), Err(CredentialError::Missing)));
    }

    #[test]
    fn test_memory_store_rejects_blank_token() {
        let store = MemoryCredentialStore::new();
        let blank = Credentials {
            token: String::new(),
            role: Role::User,
        };
        assert!(matches!(store.save(&blank), Err(CredentialError::EmptyToken)));
        assert!(store.load().unwrap().is_none());
    }
}
