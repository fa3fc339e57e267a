//! Local credential validation run before any network call.
//!
//! Each field reports at most one message: the first rule it fails.

use crate::state::form::{ErrorMap, Field, FormFields, Mode};

pub const USERNAME_REQUIRED: &str = "Username is required";
pub const USERNAME_TOO_SHORT: &str = "Username must be at least 3 characters";
pub const USERNAME_INVALID_CHARS: &str = "Username can only contain letters, numbers, and underscores";
pub const PASSWORD_REQUIRED: &str = "Password is required";
pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters";
pub const PASSWORDS_DO_NOT_MATCH: &str = "Passwords do not match";
pub const EMAIL_INVALID: &str = "Please enter a valid email address";

const MIN_USERNAME_LEN: usize = 3;
const MIN_PASSWORD_LEN: usize = 6;

/// Validate `fields` for `mode`. An empty map means the form may be submitted.
#[must_use]
pub fn validate(fields: &FormFields, mode: Mode) -> ErrorMap {
    let mut errors = ErrorMap::new();

    if let Err(msg) = check_username(&fields.username) {
        errors.insert(Field::Username, msg);
    }
    if let Err(msg) = check_password(&fields.password) {
        errors.insert(Field::Password, msg);
    }
    if mode == Mode::Signup {
        if fields.confirm_password != fields.password {
            errors.insert(Field::ConfirmPassword, PASSWORDS_DO_NOT_MATCH);
        }
        if !fields.email.is_empty() && !is_valid_email(&fields.email) {
            errors.insert(Field::Email, EMAIL_INVALID);
        }
    }

    errors
}

fn check_username(raw: &str) -> Result<(), &'static str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(USERNAME_REQUIRED);
    }
    if utf16_len(trimmed) < MIN_USERNAME_LEN {
        return Err(USERNAME_TOO_SHORT);
    }
    if !raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(USERNAME_INVALID_CHARS);
    }
    Ok(())
}

fn check_password(raw: &str) -> Result<(), &'static str> {
    if raw.is_empty() {
        return Err(PASSWORD_REQUIRED);
    }
    if utf16_len(raw) < MIN_PASSWORD_LEN {
        return Err(PASSWORD_TOO_SHORT);
    }
    Ok(())
}

/// Length in UTF-16 code units, the unit browser form inputs report.
fn utf16_len(raw: &str) -> usize {
    raw.encode_utf16().count()
}

/// `local@domain.tld` shape: no whitespace, exactly one `@`, non-empty local
/// part, and a `.` in the domain with text on both sides of it.
#[must_use]
pub fn is_valid_email(raw: &str) -> bool {
    if raw.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = raw.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod validate_test;
