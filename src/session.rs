//! Signed-in user session.
//!
//! The session is an explicit object owned by the server. It is hydrated from
//! a [`SessionStore`] at startup and torn down on logout, which also clears
//! the store.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("session file is malformed: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("session could not be encoded: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// Persistence for the session between server runs.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<SessionUser>, SessionError>;
    fn save(&self, user: &SessionUser) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

/// On-disk layout of the session file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    user: Option<SessionUser>,
}

/// Stores the session as a small TOML file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<SessionUser>, SessionError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let file: SessionFile = toml::from_str(&content)?;
        Ok(file.user)
    }

    fn save(&self, user: &SessionUser) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string(&SessionFile {
            user: Some(user.clone()),
        })?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Keeps the session in memory only.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    user: Mutex<Option<SessionUser>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<SessionUser>> {
        self.user.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<SessionUser>, SessionError> {
        Ok(self.slot().clone())
    }

    fn save(&self, user: &SessionUser) -> Result<(), SessionError> {
        *self.slot() = Some(user.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.slot() = None;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<SessionUser>,
}

impl Session {
    /// Restore the session from `store`.
    ///
    /// An unreadable store yields a signed-out session.
    pub fn hydrate(store: &dyn SessionStore) -> Self {
        match store.load() {
            Ok(user) => {
                if let Some(u) = &user {
                    tracing::info!(username = %u.username, "session restored");
                }
                Self { user }
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to restore session, starting signed out");
                Self::default()
            }
        }
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn username(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.username.as_str())
    }

    pub fn login(&mut self, store: &dyn SessionStore, user: SessionUser) -> Result<(), SessionError> {
        store.save(&user)?;
        self.user = Some(user);
        Ok(())
    }

    /// Sign out. The in-memory session is cleared even if the store fails.
    pub fn logout(&mut self, store: &dyn SessionStore) -> Result<(), SessionError> {
        self.user = None;
        store.clear()
    }
}
