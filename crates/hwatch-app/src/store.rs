//! Persisted session storage
//!
//! The session survives restarts through a small key/value-style store.
//! The interface is deliberately narrow (`load`/`save`/`clear`) so
//! alternate backings -- in-memory for tests, secure storage on other
//! platforms -- can be substituted without touching the session manager.

use std::path::{Path, PathBuf};

use hwatch_core::prelude::*;
use hwatch_core::AuthSession;

/// Storage backing for the persisted session
pub trait SessionStore {
    /// Load the persisted session, if one exists
    fn load(&self) -> Option<AuthSession>;

    /// Persist the session, replacing any previous one
    fn save(&mut self, session: &AuthSession) -> Result<()>;

    /// Remove the persisted session; a no-op when none exists
    fn clear(&mut self) -> Result<()>;
}

// ─────────────────────────────────────────────────────────
// In-memory store
// ─────────────────────────────────────────────────────────

/// Volatile store for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryStore {
    session: Option<AuthSession>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Option<AuthSession> {
        self.session.clone()
    }

    fn save(&mut self, session: &AuthSession) -> Result<()> {
        self.session = Some(session.clone());
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.session = None;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────
// File-backed store
// ─────────────────────────────────────────────────────────

const SESSION_FILENAME: &str = "session.json";

/// JSON file under the platform data directory
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default platform location
    /// (`<data dir>/homewatch/session.json`)
    pub fn default_location() -> Self {
        let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::new(base.join("homewatch").join(SESSION_FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileStore {
    fn load(&self) -> Option<AuthSession> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %self.path.display(), "failed to read session file: {e}");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                // Corrupt state is treated as logged-out, not as an error.
                warn!(path = %self.path.display(), "discarding corrupt session file: {e}");
                None
            }
        }
    }

    fn save(&mut self, session: &AuthSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, raw)?;
        debug!(path = %self.path.display(), "session persisted");
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
