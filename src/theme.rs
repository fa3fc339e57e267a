//! Static presentation config handed to whatever renders the form.
//!
//! DESIGN
//! ======
//! The controller exposes only semantic state (mode, fields, errors,
//! loading). Colours and copy live here so a renderer maps that state to
//! visuals without the core knowing about styling.

use crate::state::form::Mode;

/// 24-bit colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parse `#rrggbb`.
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self(channel(0)?, channel(2)?, channel(4)?))
    }

    /// ANSI truecolor foreground escape.
    #[must_use]
    pub fn ansi_fg(self) -> String {
        format!("\x1b[38;2;{};{};{}m", self.0, self.1, self.2)
    }
}

pub const ANSI_RESET: &str = "\x1b[0m";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Theme {
    pub accent: &'static str,
    pub accent_hover: &'static str,
    pub disabled: &'static str,
    pub error: &'static str,
    pub error_banner_bg: &'static str,
    pub border: &'static str,
    pub text: &'static str,
    pub muted: &'static str,
    pub background: &'static str,
}

pub const DEFAULT_THEME: Theme = Theme {
    accent: "#48bb78",
    accent_hover: "#38a169",
    disabled: "#a0aec0",
    error: "#e53e3e",
    error_banner_bg: "#fed7d7",
    border: "#e2e8f0",
    text: "#2d3748",
    muted: "#718096",
    background: "#f7fafc",
};

impl Default for Theme {
    fn default() -> Self {
        DEFAULT_THEME
    }
}

impl Theme {
    /// Border colour for an input, red when it is marked invalid.
    #[must_use]
    pub fn input_border(&self, invalid: bool) -> &'static str {
        if invalid { self.error } else { self.border }
    }

    /// Submit control colour; greyed out while a request is in flight.
    #[must_use]
    pub fn submit_background(&self, loading: bool) -> &'static str {
        if loading { self.disabled } else { self.accent }
    }
}

pub const APP_TITLE: &str = "NutriFit";

#[must_use]
pub fn heading(mode: Mode) -> &'static str {
    match mode {
        Mode::Login => "Welcome back!",
        Mode::Signup => "Join NutriFit",
    }
}

#[must_use]
pub fn submit_label(mode: Mode, loading: bool) -> &'static str {
    match (loading, mode) {
        (true, _) => "Please wait...",
        (false, Mode::Login) => "Sign In",
        (false, Mode::Signup) => "Create Account",
    }
}

#[must_use]
pub fn toggle_label(mode: Mode) -> &'static str {
    match mode {
        Mode::Login => "Create a new account",
        Mode::Signup => "Sign in",
    }
}

#[cfg(test)]
#[path = "theme_test.rs"]
mod theme_test;
