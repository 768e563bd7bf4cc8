use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::backend::{MemoryBackend, TokenBackend};

/// Well-known key the session token is persisted under
pub const TOKEN_KEY: &str = "authToken";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("Failed to access session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Session data is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Could not find a data directory for the session file")]
    NoDataDir,
}

/// The current authenticated session. The token is opaque to everything
/// outside `SessionTokenStore`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub obtained_at: DateTime<Utc>,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            obtained_at: Utc::now(),
        }
    }

    pub fn age(&self) -> Duration {
        Utc::now() - self.obtained_at
    }

    /// Age in whole minutes (for display)
    pub fn age_minutes(&self) -> i64 {
        self.age().num_minutes().max(0)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token_len", &self.token.len())
            .field("obtained_at", &self.obtained_at)
            .finish()
    }
}

/// Persists the session token across restarts.
///
/// Absence of a token is `Ok(None)`; only backend failures are errors.
pub struct SessionTokenStore {
    backend: Box<dyn TokenBackend>,
}

impl SessionTokenStore {
    pub fn new(backend: impl TokenBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// Store backed by process memory only
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::default())
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Persist `token`, replacing any previous session
    pub fn save(&self, token: &str) -> Result<Session, StorageError> {
        let session = Session::new(token);
        self.backend.write(&session)?;
        debug!(backend = self.backend.name(), token_len = token.len(), "Session token saved");
        Ok(session)
    }

    pub fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.load_session()?.map(|s| s.token))
    }

    pub fn load_session(&self) -> Result<Option<Session>, StorageError> {
        let session = self.backend.read()?;
        debug!(backend = self.backend.name(), found = session.is_some(), "Session token loaded");
        Ok(session)
    }

    /// Remove the persisted token. Clearing an empty store is not an error.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.backend.remove()?;
        debug!(backend = self.backend.name(), "Session token cleared");
        Ok(())
    }
}
