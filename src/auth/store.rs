use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::credential::Credential;
use super::error::AuthError;

/// Storage abstraction for the session credential.
///
/// The client only ever touches credentials through this trait: it reads the
/// current credential before dispatching, replaces it after a successful
/// refresh or login, and clears it on logout or unrecoverable refresh failure.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<Option<Credential>, AuthError>;
    fn store(&self, credential: &Credential) -> Result<(), AuthError>;
    fn clear(&self) -> Result<(), AuthError>;
}

/// In-memory credential store; the default for embedded SDK use.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    credential: RwLock<Option<Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        Self {
            credential: RwLock::new(Some(credential)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<Credential>, AuthError> {
        Ok(self.credential.read().unwrap().clone())
    }

    fn store(&self, credential: &Credential) -> Result<(), AuthError> {
        *self.credential.write().unwrap() = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        *self.credential.write().unwrap() = None;
        Ok(())
    }
}

/// Configuration for file-backed credential storage.
#[derive(Debug, Clone)]
pub struct CredentialStoreConfig {
    pub base_dir: PathBuf,
}

impl CredentialStoreConfig {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn default_dir() -> PathBuf {
        default_transitops_dir()
    }
}

/// File-backed credential store using a TOML file.
///
/// Persists the session across CLI invocations, the way the console keeps a
/// session across browser reloads.
///
/// # Example
/// ```no_run
/// use transitops::auth::{Credential, CredentialStore, FileCredentialStore};
///
/// let store = FileCredentialStore::new_default();
/// store.store(&Credential::new("access").with_refresh_token("refresh"))?;
/// # Ok::<(), transitops::auth::AuthError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    base_dir: PathBuf,
}

impl FileCredentialStore {
    pub fn new(config: CredentialStoreConfig) -> Self {
        Self {
            base_dir: config.base_dir,
        }
    }

    pub fn new_default() -> Self {
        Self {
            base_dir: default_transitops_dir(),
        }
    }

    fn credential_path(&self) -> PathBuf {
        self.base_dir.join("credentials.toml")
    }

    fn ensure_parent(path: &Path) -> Result<(), AuthError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credential>, AuthError> {
        let path = self.credential_path();
        let raw = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(AuthError::Io(err.to_string())),
        };
        let file: CredentialFile = toml::from_str(&raw)?;
        Ok(Some(file.credential))
    }

    fn store(&self, credential: &Credential) -> Result<(), AuthError> {
        let path = self.credential_path();
        Self::ensure_parent(&path)?;
        let file = CredentialFile {
            version: 1,
            credential: credential.clone(),
            saved_at: Utc::now(),
        };
        let serialized = toml::to_string(&file)?;
        fs::write(&path, serialized)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        let path = self.credential_path();
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AuthError::Io(err.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CredentialFile {
    version: u32,
    credential: Credential,
    saved_at: DateTime<Utc>,
}

fn default_transitops_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".transitops"))
        .unwrap_or_else(|| PathBuf::from(".transitops"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::credential::Principal;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, FileCredentialStore) {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(CredentialStoreConfig::new(dir.path().to_path_buf()));
        (dir, store)
    }

    fn sample_credential() -> Credential {
        Credential::new("access")
            .with_refresh_token("refresh")
            .with_principal(Principal::new("ops@transit.example"))
    }

    #[test]
    fn credential_round_trip_works() {
        let (_dir, store) = temp_store();
        store.store(&sample_credential()).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.access_token, "access");
        assert_eq!(loaded.refresh_token.as_deref(), Some("refresh"));
        assert_eq!(loaded.principal_email(), Some("ops@transit.example"));
    }

    #[test]
    fn load_returns_none_when_file_missing() {
        let (_dir, store) = temp_store();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn clear_removes_credential() {
        let (_dir, store) = temp_store();
        store.store(&sample_credential()).unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn clear_succeeds_when_already_cleared() {
        let (_dir, store) = temp_store();
        store.clear().unwrap();
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryCredentialStore::new();
        assert!(store.load().unwrap().is_none());
        store.store(&sample_credential()).unwrap();
        assert_eq!(store.load().unwrap().unwrap().access_token, "access");
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
