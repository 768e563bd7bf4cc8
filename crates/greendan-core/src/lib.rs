//! Core library for the GreenDan mobile client.
//!
//! This crate holds the parts of the client with real state and failure
//! semantics, independent of any rendering layer:
//!
//! - `auth`: credential validation, the login state machine and session
//!   token persistence
//! - `api`: the HTTP login exchange
//! - `version`: the advisory installed-vs-published version check
//! - `bookmarks`: the shared item store that keeps list and detail views
//!   in agreement about bookmark flags
//! - `screen`: the login screen controller tying the above together
//!
//! Presentation layers consume outcome values (`LoginOutcome`,
//! `ValidationResult`, `Route`) and decide how to display them.

pub mod api;
pub mod auth;
pub mod bookmarks;
pub mod config;
pub mod diagnostics;
pub mod models;
pub mod navigation;
pub mod screen;
pub mod version;

pub use api::{ApiClient, ApiError, LoginTransport};
pub use auth::{
    AuthSession, AuthState, Credentials, LoginOutcome, SessionTokenStore, StorageError,
    ValidationError, ValidationResult,
};
pub use bookmarks::{BookmarkStore, BookmarkUpdate, DetailView};
pub use config::Config;
pub use diagnostics::{Diagnostic, Diagnostics, TracingDiagnostics};
pub use models::Item;
pub use navigation::Route;
pub use screen::LoginScreen;
pub use version::{VersionGate, VersionInfo};
