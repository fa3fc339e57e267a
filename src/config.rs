//! Client configuration parsed from environment variables.

use std::path::PathBuf;

/// Development backend address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_SESSION_FILE: &str = ".nutrifit_session.json";

pub const BASE_URL_VAR: &str = "NUTRIFIT_API_URL";
pub const SESSION_FILE_VAR: &str = "NUTRIFIT_SESSION_FILE";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// Backend root, without a trailing slash.
    pub base_url: String,
    /// Where the terminal front-end persists the session.
    pub session_file: PathBuf,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_BASE_URL.to_owned(), session_file: PathBuf::from(DEFAULT_SESSION_FILE) }
    }
}

impl AuthConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `NUTRIFIT_API_URL`: default `http://localhost:5000`
    /// - `NUTRIFIT_SESSION_FILE`: default `.nutrifit_session.json`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Empty`] if a variable is set but blank.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_values(
            std::env::var(BASE_URL_VAR).ok().as_deref(),
            std::env::var(SESSION_FILE_VAR).ok().as_deref(),
        )
    }

    /// Build config from raw optional values; `None` falls back to defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Empty`] if a provided value is blank.
    pub fn from_values(base_url: Option<&str>, session_file: Option<&str>) -> Result<Self, ConfigError> {
        let base_url = match base_url.map(str::trim) {
            Some("") => return Err(ConfigError::Empty(BASE_URL_VAR)),
            Some(raw) => raw.trim_end_matches('/').to_owned(),
            None => DEFAULT_BASE_URL.to_owned(),
        };
        let session_file = match session_file.map(str::trim) {
            Some("") => return Err(ConfigError::Empty(SESSION_FILE_VAR)),
            Some(raw) => PathBuf::from(raw),
            None => PathBuf::from(DEFAULT_SESSION_FILE),
        };
        Ok(Self { base_url, session_file })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
