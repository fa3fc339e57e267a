//! Sign-in / sign-up submission controller.
//!
//! SYSTEM CONTEXT
//! ==============
//! Owns one form instance and the three capabilities it talks to: the
//! backend, the session store and the navigator. Renderers feed edits in
//! through [`AuthController::set_field`] / [`AuthController::toggle_mode`]
//! and read [`AuthController::form`] back out.
//!
//! LIFECYCLE
//! =========
//! `Idle -> Validating -> Idle` when validation fails (no request is sent).
//! `Idle -> Validating -> Submitting -> NavigatedAway | Idle-with-error`
//! otherwise. While submitting, edits, toggles and further submits are
//! refused. The in-flight flag is cleared on every exit from `Submitting`,
//! including the one that navigates away and an abandoned request.

use crate::nav::{NavState, Navigator, Route};
use crate::net::api::AuthBackend;
use crate::net::types::{ApiError, SubmissionResult};
use crate::state::form::{ErrorMap, Field, FormFields, FormState, Mode};
use crate::state::session::SessionStore;
use crate::util::validate::validate;

/// General error shown when no interpretable response was obtained.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please try again.";
/// General error shown when the server rejects without saying why.
pub const AUTH_FAILED_MESSAGE: &str = "Authentication failed";

/// How one submit attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Local validation failed; field errors are set and nothing was sent.
    Invalid,
    /// A submission was already in flight; nothing happened.
    Busy,
    /// The server declined; `message` is now the general error.
    Rejected { message: String },
    /// No usable response; the network message is now the general error.
    TransportFailed,
    /// Authenticated, session written, navigator invoked.
    Navigated { route: Route, user_id: String },
}

impl SubmitOutcome {
    #[must_use]
    pub fn is_navigated(&self) -> bool {
        matches!(self, Self::Navigated { .. })
    }
}

/// Snapshot of a validated form that is waiting on the backend.
#[must_use]
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    mode: Mode,
    fields: FormFields,
}

impl PendingSubmission {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn fields(&self) -> &FormFields {
        &self.fields
    }
}

/// Where a successful authentication leads.
///
/// Sign-in goes to the main screen only when the profile is complete; every
/// other case goes to onboarding with the user id as payload.
#[must_use]
pub fn destination(mode: Mode, user_id: &str, profile_completed: bool) -> (Route, Option<NavState>) {
    match (mode, profile_completed) {
        (Mode::Login, true) => (Route::Main, None),
        (Mode::Login, false) | (Mode::Signup, _) => {
            (Route::Questions, Some(NavState { user_id: user_id.to_owned() }))
        }
    }
}

/// Clears the in-flight flag if the request future is dropped before it
/// resolves.
struct InFlightGuard<'a> {
    form: &'a mut FormState,
    armed: bool,
}

impl InFlightGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            tracing::debug!("auth request dropped before completion");
            self.form.set_loading(false);
        }
    }
}

pub struct AuthController<B, S, N> {
    form: FormState,
    backend: B,
    session: S,
    navigator: N,
}

impl<B, S, N> AuthController<B, S, N>
where
    B: AuthBackend,
    S: SessionStore,
    N: Navigator,
{
    /// Controller starting in sign-in mode with an empty form.
    pub fn new(backend: B, session: S, navigator: N) -> Self {
        Self::with_mode(Mode::Login, backend, session, navigator)
    }

    pub fn with_mode(mode: Mode, backend: B, session: S, navigator: N) -> Self {
        Self { form: FormState::new(mode), backend, session, navigator }
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Apply a user edit. Returns `false` (and changes nothing) while a
    /// submission is in flight.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) -> bool {
        if self.form.is_loading() {
            return false;
        }
        self.form.set_field(field, value);
        true
    }

    /// Switch between sign-in and sign-up. Refused while in flight.
    pub fn toggle_mode(&mut self) -> bool {
        if self.form.is_loading() {
            return false;
        }
        self.form.toggle_mode();
        tracing::debug!(mode = %self.form.mode(), "auth mode toggled");
        true
    }

    /// Validate and, if clean, mark the form in flight.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitOutcome::Invalid`] when validation fails and
    /// [`SubmitOutcome::Busy`] when a submission is already in flight.
    pub fn begin_submit(&mut self) -> Result<PendingSubmission, SubmitOutcome> {
        if self.form.is_loading() {
            return Err(SubmitOutcome::Busy);
        }
        let mode = self.form.mode();
        let errors = validate(self.form.fields(), mode);
        let invalid = !errors.is_empty();
        self.form.set_errors(errors);
        if invalid {
            tracing::debug!(%mode, invalid_fields = self.form.errors().len(), "auth form failed validation");
            return Err(SubmitOutcome::Invalid);
        }
        self.form.set_loading(true);
        Ok(PendingSubmission { mode, fields: self.form.fields().clone() })
    }

    /// Apply the backend's verdict for `pending` and leave the in-flight state.
    pub fn finish_submit(
        &mut self,
        pending: PendingSubmission,
        result: Result<SubmissionResult, ApiError>,
    ) -> SubmitOutcome {
        let outcome = match result {
            Err(e) => {
                tracing::warn!(mode = %pending.mode, error = %e, "auth request failed");
                self.form.set_errors(ErrorMap::general(NETWORK_ERROR_MESSAGE));
                SubmitOutcome::TransportFailed
            }
            Ok(SubmissionResult::Rejected { error }) => {
                let message = error.unwrap_or_else(|| AUTH_FAILED_MESSAGE.to_owned());
                tracing::debug!(mode = %pending.mode, %message, "auth rejected by server");
                self.form.set_errors(ErrorMap::general(message.clone()));
                SubmitOutcome::Rejected { message }
            }
            Ok(SubmissionResult::Accepted { user_id, profile_completed }) => {
                self.complete_authentication(pending.mode, user_id, profile_completed)
            }
        };
        self.form.set_loading(false);
        outcome
    }

    /// Leave the in-flight state without applying any result. For hosts that
    /// drive `begin_submit` themselves and give up on the request.
    pub fn abort_submit(&mut self, pending: PendingSubmission) {
        tracing::debug!(mode = %pending.mode, "auth submission abandoned");
        self.form.set_loading(false);
    }

    /// Run one full submit attempt: validate, call the backend, apply the result.
    ///
    /// Dropping the returned future mid-request (timeout, `select!`, unmount)
    /// re-enables the form and leaves errors, session and route untouched.
    pub async fn submit(&mut self) -> SubmitOutcome {
        let pending = match self.begin_submit() {
            Ok(pending) => pending,
            Err(outcome) => return outcome,
        };
        let result = {
            let guard = InFlightGuard { form: &mut self.form, armed: true };
            let result = self.backend.authenticate(pending.mode, &pending.fields).await;
            guard.disarm();
            result
        };
        self.finish_submit(pending, result)
    }

    fn complete_authentication(&mut self, mode: Mode, user_id: String, profile_completed: bool) -> SubmitOutcome {
        if let Err(e) = self.session.set_user_id(&user_id) {
            tracing::warn!(%user_id, error = %e, "failed to persist session");
        }
        let (route, state) = destination(mode, &user_id, profile_completed);
        tracing::info!(%mode, %user_id, path = route.path(), "authenticated");
        self.navigator.navigate(route.path(), state.as_ref());
        SubmitOutcome::Navigated { route, user_id }
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;
