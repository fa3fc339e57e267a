//! Durable session identity (the authenticated user's id).
//!
//! SYSTEM CONTEXT
//! ==============
//! Only the submission controller writes the session; anything may read it.
//! The store is injected so the controller can run against an in-memory
//! double in tests, a JSON file in the terminal front-end, or
//! `localStorage` in the browser.
//!
//! ERROR HANDLING
//! ==============
//! Reads degrade to "no session" on any storage failure. Writes report a
//! [`SessionError`] and leave it to the caller whether that matters.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Storage key under which the user id is persisted.
pub const SESSION_KEY: &str = "nutrifit_user_id";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session storage io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("session storage is corrupt: {0}")]
    Json(#[from] serde_json::Error),
    #[error("session storage unavailable: {0}")]
    Unavailable(String),
}

/// Get/set capability over the persisted session id.
pub trait SessionStore {
    /// Current session user id, if one was ever stored.
    fn user_id(&self) -> Option<String>;

    /// Overwrite the stored user id.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the backing storage rejects the write.
    fn set_user_id(&mut self, user_id: &str) -> Result<(), SessionError>;
}

impl<S: SessionStore + ?Sized> SessionStore for &mut S {
    fn user_id(&self) -> Option<String> {
        (**self).user_id()
    }

    fn set_user_id(&mut self, user_id: &str) -> Result<(), SessionError> {
        (**self).set_user_id(user_id)
    }
}

// =============================================================================
// IN-MEMORY
// =============================================================================

/// Process-local store; forgets everything on exit.
#[derive(Clone, Debug, Default)]
pub struct MemorySession {
    user_id: Option<String>,
}

impl MemorySession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySession {
    fn user_id(&self) -> Option<String> {
        self.user_id.clone()
    }

    fn set_user_id(&mut self, user_id: &str) -> Result<(), SessionError> {
        self.user_id = Some(user_id.to_owned());
        Ok(())
    }
}

// =============================================================================
// JSON FILE
// =============================================================================

/// Key-value JSON file on disk, shared by every form instance that points at
/// the same path. Survives restarts.
#[derive(Clone, Debug)]
pub struct FileSession {
    path: PathBuf,
}

impl FileSession {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, SessionError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl SessionStore for FileSession {
    fn user_id(&self) -> Option<String> {
        match self.load() {
            Ok(mut entries) => entries.remove(SESSION_KEY),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "session file unreadable");
                None
            }
        }
    }

    fn set_user_id(&mut self, user_id: &str) -> Result<(), SessionError> {
        // A corrupt file is replaced rather than blocking sign-in.
        let mut entries = self.load().unwrap_or_default();
        entries.insert(SESSION_KEY.to_owned(), user_id.to_owned());
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(&entries)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

// =============================================================================
// BROWSER
// =============================================================================

/// `window.localStorage` store for browser builds.
#[cfg(feature = "hydrate")]
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorageSession;

#[cfg(feature = "hydrate")]
impl LocalStorageSession {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window().and_then(|w| w.local_storage().ok().flatten())
    }
}

#[cfg(feature = "hydrate")]
impl SessionStore for LocalStorageSession {
    fn user_id(&self) -> Option<String> {
        Self::storage()?.get_item(SESSION_KEY).ok().flatten()
    }

    fn set_user_id(&mut self, user_id: &str) -> Result<(), SessionError> {
        let storage = Self::storage().ok_or_else(|| SessionError::Unavailable("localStorage missing".to_owned()))?;
        storage
            .set_item(SESSION_KEY, user_id)
            .map_err(|e| SessionError::Unavailable(format!("{e:?}")))
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;
