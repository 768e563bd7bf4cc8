//! Local validation of login form input.
//!
//! Everything here is pure: no network, no storage. A login attempt only
//! reaches the server once `validate` returns `ValidationResult::Valid`.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Email shape accepted by the login form. ASCII letters only, matched
/// case-insensitively, anchored at both ends.
const EMAIL_PATTERN: &str = r"(?i-u)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$";

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_REGEX.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("EMAIL_PATTERN is a valid regex"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub enum ValidationResult {
    Valid,
    EmptyFields,
    MalformedEmail,
}

/// Why a login attempt was rejected before reaching the network.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter both your email and password.")]
    EmptyFields,

    #[error("That is not a valid email address. Please check it and try again.")]
    MalformedEmail,
}

impl ValidationResult {
    pub fn is_valid(self) -> bool {
        self == ValidationResult::Valid
    }

    pub fn error(self) -> Option<ValidationError> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::EmptyFields => Some(ValidationError::EmptyFields),
            ValidationResult::MalformedEmail => Some(ValidationError::MalformedEmail),
        }
    }
}

impl ValidationError {
    /// Title for the notice shown alongside the message
    pub fn title(&self) -> &'static str {
        "Login failed"
    }

    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

pub fn is_email_valid(email: &str) -> bool {
    email_regex().is_match(email)
}

/// Validate login form input. Empty fields are reported before a malformed
/// email, so an empty email is always `EmptyFields`.
pub fn validate(email: &str, password: &str) -> ValidationResult {
    if email.is_empty() || password.is_empty() {
        ValidationResult::EmptyFields
    } else if !is_email_valid(email) {
        ValidationResult::MalformedEmail
    } else {
        ValidationResult::Valid
    }
}

/// Whether the submit button should be shown as enabled
pub fn is_login_enabled(email: &str, password: &str) -> bool {
    validate(email, password).is_valid()
}
