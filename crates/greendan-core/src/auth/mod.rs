//! Authentication module for login and session persistence.
//!
//! This module provides:
//! - `validate`: local credential checks, no I/O
//! - `SessionTokenStore`: the persisted session token behind a `TokenBackend`
//!   (OS keychain, JSON file, or memory)
//! - `AuthSession`: the login state machine

pub mod backend;
pub mod credentials;
pub mod flow;
pub mod session;
pub mod validator;

pub use backend::{FileBackend, KeyringBackend, MemoryBackend, TokenBackend};
pub use credentials::Credentials;
pub use flow::{AuthSession, AuthState, LoginOutcome};
pub use session::{Session, SessionTokenStore, StorageError, TOKEN_KEY};
pub use validator::{is_email_valid, is_login_enabled, validate, ValidationError, ValidationResult};
