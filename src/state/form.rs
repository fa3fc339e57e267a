//! Credential form state: mode, field values, errors, in-flight flag.
//!
//! DESIGN
//! ======
//! Pure state holder. Validation lives in `util::validate` and orchestration
//! in `pages::auth`; this module only stores their results and applies the
//! optimistic error clearing that happens on every edit.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Which authentication flow the form represents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Sign in to an existing account.
    #[default]
    Login,
    /// Register a new account.
    Signup,
}

impl Mode {
    /// The other mode.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Login => Self::Signup,
            Self::Signup => Self::Login,
        }
    }

    /// Fields a renderer shows for this mode, in display order.
    #[must_use]
    pub fn visible_fields(self) -> &'static [Field] {
        match self {
            Self::Login => &[Field::Username, Field::Password],
            Self::Signup => &[Field::Username, Field::Email, Field::Password, Field::ConfirmPassword],
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Login => f.write_str("login"),
            Self::Signup => f.write_str("signup"),
        }
    }
}

/// One editable input on the form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Username,
    Password,
    ConfirmPassword,
    Email,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Username, Field::Password, Field::ConfirmPassword, Field::Email];

    /// Wire / DOM name of the field.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Password => "password",
            Self::ConfirmPassword => "confirmPassword",
            Self::Email => "email",
        }
    }

    /// Human label shown next to the input.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Username => "Username",
            Self::Password => "Password",
            Self::ConfirmPassword => "Confirm Password",
            Self::Email => "Email (optional)",
        }
    }

    /// Whether the input holds a secret and should be masked.
    #[must_use]
    pub fn is_secret(self) -> bool {
        matches!(self, Self::Password | Self::ConfirmPassword)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown field name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown form field: {0}")]
pub struct UnknownField(pub String);

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "username" => Ok(Self::Username),
            "password" => Ok(Self::Password),
            "confirmPassword" | "confirm_password" | "confirm-password" => Ok(Self::ConfirmPassword),
            "email" => Ok(Self::Email),
            other => Err(UnknownField(other.to_owned())),
        }
    }
}

/// Raw credential inputs, serialized as the request body for both endpoints.
#[derive(Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormFields {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    pub email: String,
}

impl FormFields {
    #[must_use]
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Username => &self.username,
            Field::Password => &self.password,
            Field::ConfirmPassword => &self.confirm_password,
            Field::Email => &self.email,
        }
    }

    pub fn set(&mut self, field: Field, value: String) {
        match field {
            Field::Username => self.username = value,
            Field::Password => self.password = value,
            Field::ConfirmPassword => self.confirm_password = value,
            Field::Email => self.email = value,
        }
    }

    /// True when every field is empty.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        Field::ALL.iter().all(|f| self.get(*f).is_empty())
    }
}

// Secrets stay out of logs.
impl fmt::Debug for FormFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormFields")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("confirm_password", &"<redacted>")
            .field("email", &self.email)
            .finish()
    }
}

/// Key into an [`ErrorMap`]: a specific field or the form-level banner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorKey {
    Field(Field),
    General,
}

impl From<Field> for ErrorKey {
    fn from(field: Field) -> Self {
        Self::Field(field)
    }
}

/// Field name (or `general`) to message. Absence means valid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorMap(BTreeMap<ErrorKey, String>);

impl ErrorMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map holding only a form-level message.
    #[must_use]
    pub fn general(message: impl Into<String>) -> Self {
        let mut map = Self::new();
        map.insert(ErrorKey::General, message);
        map
    }

    pub fn insert(&mut self, key: impl Into<ErrorKey>, message: impl Into<String>) {
        self.0.insert(key.into(), message.into());
    }

    pub fn remove(&mut self, key: impl Into<ErrorKey>) {
        self.0.remove(&key.into());
    }

    #[must_use]
    pub fn get(&self, key: impl Into<ErrorKey>) -> Option<&str> {
        self.0.get(&key.into()).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, key: impl Into<ErrorKey>) -> bool {
        self.0.contains_key(&key.into())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ErrorKey, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

/// Mutable UI state for one form instance.
///
/// Renderers read `mode`, `fields`, `errors` and `is_loading` and never
/// mutate them directly.
#[derive(Clone, Debug, Default)]
pub struct FormState {
    mode: Mode,
    fields: FormFields,
    errors: ErrorMap,
    loading: bool,
}

impl FormState {
    #[must_use]
    pub fn new(mode: Mode) -> Self {
        Self { mode, ..Self::default() }
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    #[must_use]
    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether the input for `field` should be marked invalid.
    #[must_use]
    pub fn is_invalid(&self, field: Field) -> bool {
        self.errors.contains(field)
    }

    /// Overwrite one field and clear its error plus the general error.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        self.fields.set(field, value.into());
        self.errors.remove(field);
        self.errors.remove(ErrorKey::General);
    }

    /// Flip the mode, empty every field, drop every error.
    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
        self.fields = FormFields::default();
        self.errors = ErrorMap::default();
    }

    /// Replace the error mapping wholesale.
    pub fn set_errors(&mut self, errors: ErrorMap) {
        self.errors = errors;
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }
}

#[cfg(test)]
#[path = "form_test.rs"]
mod form_test;
