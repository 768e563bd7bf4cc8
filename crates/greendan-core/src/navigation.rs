//! Named navigation destinations requested by the core.
//!
//! The core only decides when to navigate and what to carry; the
//! presentation layer owns the navigation stack.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "route", content = "params")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub enum Route {
    /// Authenticated landing screen, carrying the session token forward
    Home { token: String },
    #[serde(rename = "TermsScreen")]
    TermsScreen,
    #[serde(rename = "Pw_find")]
    PasswordFind,
}

impl Route {
    /// Destination name as registered with the navigator
    pub fn name(&self) -> &'static str {
        match self {
            Route::Home { .. } => "Home",
            Route::TermsScreen => "TermsScreen",
            Route::PasswordFind => "Pw_find",
        }
    }
}

/// Links shown under the login button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecondaryAction {
    SignUp,
    FindPassword,
}

impl SecondaryAction {
    pub const ALL: [SecondaryAction; 2] = [SecondaryAction::SignUp, SecondaryAction::FindPassword];

    pub fn title(&self) -> &'static str {
        match self {
            SecondaryAction::SignUp => "Sign up",
            SecondaryAction::FindPassword => "Find password",
        }
    }

    pub fn route(&self) -> Route {
        match self {
            // Sign-up starts by accepting the terms
            SecondaryAction::SignUp => Route::TermsScreen,
            SecondaryAction::FindPassword => Route::PasswordFind,
        }
    }
}
