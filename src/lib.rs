//! NutriFit credential form: sign-in / sign-up state machine.
//!
//! Layering, leaf first:
//! - `util::validate`: pure field validation.
//! - `state::form`: mode, field values, errors, in-flight flag.
//! - `state::session`, `net::api`, `nav`: injected capabilities.
//! - `pages::auth`: the submission controller tying them together.

pub mod config;
pub mod nav;
pub mod net;
pub mod pages;
pub mod state;
pub mod theme;
pub mod util;

pub use nav::{NavState, Navigator, Route};
pub use net::api::{AuthBackend, HttpAuthBackend};
pub use pages::auth::{AuthController, SubmitOutcome};
pub use state::form::{ErrorKey, ErrorMap, Field, FormFields, FormState, Mode};
pub use state::session::{FileSession, MemorySession, SessionStore};
