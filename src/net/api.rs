//! Backend calls for sign-in and registration.
//!
//! Native builds: real HTTP calls via `reqwest`.
//! Browser builds (`hydrate`): real HTTP calls via `gloo-net`.
//!
//! ERROR HANDLING
//! ==============
//! The body is interpreted whatever the HTTP status, so a 401 carrying
//! `{"success": false, "error": ...}` is a rejection, not a transport
//! failure. Only "no usable body" becomes an [`ApiError`].

use async_trait::async_trait;

use super::types::{ApiError, AuthResponse, SubmissionResult};
use crate::state::form::{FormFields, Mode};

pub const LOGIN_PATH: &str = "/api/login";
pub const SIGNUP_PATH: &str = "/api/signup";

/// Endpoint path for `mode`.
#[must_use]
pub fn endpoint_path(mode: Mode) -> &'static str {
    match mode {
        Mode::Login => LOGIN_PATH,
        Mode::Signup => SIGNUP_PATH,
    }
}

/// Absolute endpoint URL for `mode` under `base_url`.
#[must_use]
pub fn endpoint_url(base_url: &str, mode: Mode) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), endpoint_path(mode))
}

/// Decode a response body into a [`SubmissionResult`].
///
/// # Errors
///
/// Returns [`ApiError::Decode`] for a non-JSON body and
/// [`ApiError::MissingUserId`] for a success without a user id.
pub fn parse_auth_response(status: u16, body: &str) -> Result<SubmissionResult, ApiError> {
    let parsed: AuthResponse =
        serde_json::from_str(body).map_err(|e| ApiError::Decode { status, message: e.to_string() })?;
    parsed.into_result()
}

/// Capability the submission controller consumes to reach the backend.
///
/// Futures are not required to be `Send`: the form runs on a single UI
/// thread and browser fetch futures are `!Send`.
#[async_trait(?Send)]
pub trait AuthBackend {
    /// POST `fields` to the endpoint for `mode` and interpret the reply.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] when no interpretable response was obtained.
    async fn authenticate(&self, mode: Mode, fields: &FormFields) -> Result<SubmissionResult, ApiError>;
}

// =============================================================================
// NATIVE
// =============================================================================

/// `reqwest`-backed client for the authentication endpoints.
#[derive(Debug, Clone)]
pub struct HttpAuthBackend {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAuthBackend {
    /// Build a client rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self::with_client(http, base_url))
    }

    /// Use a preconfigured `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { http, base_url }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait(?Send)]
impl AuthBackend for HttpAuthBackend {
    async fn authenticate(&self, mode: Mode, fields: &FormFields) -> Result<SubmissionResult, ApiError> {
        let url = endpoint_url(&self.base_url, mode);
        tracing::debug!(%url, %mode, "posting credentials");

        let response = self
            .http
            .post(&url)
            .json(fields)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        parse_auth_response(status, &text)
    }
}

// =============================================================================
// BROWSER
// =============================================================================

/// `gloo-net` client for browser builds.
#[cfg(feature = "hydrate")]
#[derive(Debug, Clone)]
pub struct BrowserAuthBackend {
    base_url: String,
}

#[cfg(feature = "hydrate")]
impl BrowserAuthBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { base_url }
    }
}

#[cfg(feature = "hydrate")]
#[async_trait(?Send)]
impl AuthBackend for BrowserAuthBackend {
    async fn authenticate(&self, mode: Mode, fields: &FormFields) -> Result<SubmissionResult, ApiError> {
        let url = endpoint_url(&self.base_url, mode);
        let response = gloo_net::http::Request::post(&url)
            .json(fields)
            .map_err(|e| ApiError::Transport(e.to_string()))?
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        parse_auth_response(status, &text)
    }
}

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;
