//! Storage backends for the session token.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use keyring::Entry;
use serde::{Deserialize, Serialize};

use super::session::{Session, StorageError, TOKEN_KEY};

/// Keychain service name
const SERVICE_NAME: &str = "greendan";

/// Session file name in the data directory
const SESSION_FILE: &str = "session.json";

/// Key-value slot holding one `Session`.
pub trait TokenBackend: Send + Sync {
    fn read(&self) -> Result<Option<Session>, StorageError>;
    fn write(&self, session: &Session) -> Result<(), StorageError>;
    fn remove(&self) -> Result<(), StorageError>;
    fn name(&self) -> &'static str;
}

/// OS keychain entry `greendan` / `authToken`.
pub struct KeyringBackend {
    service: String,
}

impl KeyringBackend {
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self) -> Result<Entry, StorageError> {
        Ok(Entry::new(&self.service, TOKEN_KEY)?)
    }
}

impl Default for KeyringBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenBackend for KeyringBackend {
    fn read(&self) -> Result<Option<Session>, StorageError> {
        match self.entry()?.get_password() {
            Ok(stored) => Ok(Some(serde_json::from_str(&stored)?)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, session: &Session) -> Result<(), StorageError> {
        let stored = serde_json::to_string(session)?;
        self.entry()?.set_password(&stored)?;
        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn name(&self) -> &'static str {
        "keyring"
    }
}

#[derive(Serialize, Deserialize)]
struct SessionFile {
    #[serde(rename = "authToken")]
    auth_token: Session,
}

/// JSON file `session.json` in the app data directory.
pub struct FileBackend {
    data_dir: PathBuf,
}

impl FileBackend {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join(SESSION_FILE)
    }

    fn io_error(path: &Path, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl TokenBackend for FileBackend {
    fn read(&self) -> Result<Option<Session>, StorageError> {
        let path = self.session_path();
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Self::io_error(&path, e)),
        };
        let file: SessionFile = serde_json::from_str(&contents)?;
        Ok(Some(file.auth_token))
    }

    fn write(&self, session: &Session) -> Result<(), StorageError> {
        let path = self.session_path();
        std::fs::create_dir_all(&self.data_dir).map_err(|e| Self::io_error(&self.data_dir, e))?;

        let contents = serde_json::to_string_pretty(&SessionFile {
            auth_token: session.clone(),
        })?;

        // Write then rename so a crash never leaves a half-written session
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, contents).map_err(|e| Self::io_error(&tmp, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| Self::io_error(&path, e))?;
        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        let path = self.session_path();
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(&path, e)),
        }
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

/// Process-local slot, lost on exit.
#[derive(Default)]
pub struct MemoryBackend {
    slot: Mutex<Option<Session>>,
}

impl TokenBackend for MemoryBackend {
    fn read(&self) -> Result<Option<Session>, StorageError> {
        Ok(self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn write(&self, session: &Session) -> Result<(), StorageError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
