//! Post-authentication destinations and the navigation capability.
//!
//! SYSTEM CONTEXT
//! ==============
//! The form never inspects routing internals. It hands a path and an
//! optional payload to whatever [`Navigator`] the host provides (a router in
//! the browser, a printer in the terminal, a recorder in tests).

use serde::{Deserialize, Serialize};

/// Screens the form can send the user to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    /// Main application screen.
    Main,
    /// Onboarding questionnaire.
    Questions,
}

impl Route {
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Main => "/nutrition",
            Self::Questions => "/questions",
        }
    }
}

/// Payload passed alongside a navigation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavState {
    pub user_id: String,
}

/// Transition the visible screen to `path`, carrying `state` if given.
pub trait Navigator {
    fn navigate(&mut self, path: &str, state: Option<&NavState>);
}

impl<F> Navigator for F
where
    F: FnMut(&str, Option<&NavState>),
{
    fn navigate(&mut self, path: &str, state: Option<&NavState>) {
        self(path, state);
    }
}

#[cfg(test)]
#[path = "nav_test.rs"]
mod nav_test;
