//! Wire types for the authentication endpoints.
//!
//! DESIGN
//! ======
//! The backend's JSON is loose (`user_id` may be a string or a number,
//! `profile_completed` may be missing). [`AuthResponse`] accepts that shape
//! and [`AuthResponse::into_result`] normalizes it to a [`SubmissionResult`]
//! the controller can match on exhaustively.

use serde::{Deserialize, Deserializer};

/// Raw response body from `/api/login` or `/api/signup`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, deserialize_with = "string_or_number")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub profile_completed: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Normalized backend verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionResult {
    /// Server accepted the credentials.
    Accepted { user_id: String, profile_completed: bool },
    /// Server was reachable but declined; `error` is its message, if any.
    Rejected { error: Option<String> },
}

/// Failure to obtain an interpretable response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("http client build failed: {0}")]
    HttpClientBuild(String),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("response decode failed (status {status}): {message}")]
    Decode { status: u16, message: String },
    #[error("success response carried no user_id")]
    MissingUserId,
}

impl AuthResponse {
    /// Collapse the loose wire shape into a [`SubmissionResult`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MissingUserId`] when the server claims success but
    /// omits (or blanks) the user id.
    pub fn into_result(self) -> Result<SubmissionResult, ApiError> {
        if !self.success {
            let error = self.error.filter(|e| !e.is_empty());
            return Ok(SubmissionResult::Rejected { error });
        }
        match self.user_id {
            Some(user_id) if !user_id.is_empty() => Ok(SubmissionResult::Accepted {
                user_id,
                profile_completed: self.profile_completed.unwrap_or(false),
            }),
            _ => Err(ApiError::MissingUserId),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
