// Credential persistence.
//
// Keys are stored in plaintext under names like `openrouter_api_key`, with no
// expiry. The dispatcher only ever sees the `CredentialStore` trait.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const CREDENTIALS_FILE: &str = "credentials.toml";

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("failed to access credential file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("credential file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to encode credentials: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("no config directory available on this platform")]
    NoConfigDir,
}

pub trait CredentialStore: Send + Sync {
    /// Stored value for `name`. Blank values count as absent.
    fn get(&self, name: &str) -> Result<Option<String>, CredentialError>;
    fn set(&self, name: &str, value: &str) -> Result<(), CredentialError>;
    /// Returns whether anything was removed.
    fn remove(&self, name: &str) -> Result<bool, CredentialError>;
    fn names(&self) -> Result<Vec<String>, CredentialError>;
}

// ── File-backed store ─────────────────────────────────────────────────────────

pub struct FileCredentialStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    /// Store at `<config_dir>/perplex/credentials.toml`.
    pub fn open_default() -> Result<Self, CredentialError> {
        let dir = crate::config::config_dir().ok_or(CredentialError::NoConfigDir)?;
        Ok(Self::new(dir.join(CREDENTIALS_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, CredentialError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => return Err(CredentialError::Io { path: self.path.clone(), source }),
        };
        toml::from_str(&content).map_err(|source| CredentialError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), CredentialError> {
        let io_err = |source| CredentialError::Io { path: self.path.clone(), source };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let encoded = toml::to_string(entries)?;
        std::fs::write(&self.path, encoded).map_err(io_err)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .map_err(io_err)?;
        }
        Ok(())
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, name: &str) -> Result<Option<String>, CredentialError> {
        let _g = self.guard();
        Ok(non_blank(self.read_all()?.remove(name)))
    }

    fn set(&self, name: &str, value: &str) -> Result<(), CredentialError> {
        let _g = self.guard();
        let mut entries = self.read_all()?;
        entries.insert(name.to_string(), value.trim().to_string());
        self.write_all(&entries)?;
        tracing::info!(name, path = %self.path.display(), "stored credential");
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<bool, CredentialError> {
        let _g = self.guard();
        let mut entries = self.read_all()?;
        let removed = entries.remove(name).is_some();
        if removed {
            self.write_all(&entries)?;
            tracing::info!(name, "removed credential");
        }
        Ok(removed)
    }

    fn names(&self) -> Result<Vec<String>, CredentialError> {
        let _g = self.guard();
        Ok(self.read_all()?.into_keys().collect())
    }
}

// ── In-memory store ───────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(name: &str, value: &str) -> Self {
        let store = Self::new();
        store.lock().insert(name.to_string(), value.to_string());
        store
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, name: &str) -> Result<Option<String>, CredentialError> {
        Ok(non_blank(self.lock().get(name).cloned()))
    }

    fn set(&self, name: &str, value: &str) -> Result<(), CredentialError> {
        self.lock().insert(name.to_string(), value.trim().to_string());
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<bool, CredentialError> {
        Ok(self.lock().remove(name).is_some())
    }

    fn names(&self) -> Result<Vec<String>, CredentialError> {
        let mut names: Vec<String> = self.lock().keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
