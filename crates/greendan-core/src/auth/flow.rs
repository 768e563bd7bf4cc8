//! Login state machine.
//!
//! ```text
//! Idle -> Validating -> Rejected -> Idle
//!                    -> Authenticating -> Authenticated
//!                                      -> Failed -> Idle
//! ```
//!
//! Only one attempt may be in flight. A submit that arrives while another is
//! running is answered with `LoginOutcome::Busy` and touches nothing.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tracing::debug;

use crate::api::{ApiError, LoginTransport};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::navigation::Route;

use super::credentials::Credentials;
use super::session::{SessionTokenStore, StorageError};
use super::validator::{validate, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Idle,
    Validating,
    Authenticating,
    Authenticated,
    Rejected(ValidationError),
    Failed,
}

/// Result of one submit, for the presentation layer to display.
#[derive(Debug)]
pub enum LoginOutcome {
    /// Token persisted; navigate to `navigate`
    Authenticated { navigate: Route },
    /// Input failed local validation, nothing was sent
    Rejected(ValidationError),
    /// The exchange failed; nothing was persisted
    Failed(ApiError),
    /// Another attempt is already in flight
    Busy,
    /// The screen detached before the response arrived
    Discarded,
}

impl LoginOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, LoginOutcome::Authenticated { .. })
    }

    pub fn route(&self) -> Option<&Route> {
        match self {
            LoginOutcome::Authenticated { navigate } => Some(navigate),
            _ => None,
        }
    }

    /// Notice to show the user, if any
    pub fn user_message(&self) -> Option<String> {
        match self {
            LoginOutcome::Authenticated { .. } => Some("Login successful.".to_string()),
            LoginOutcome::Rejected(reason) => Some(reason.user_message()),
            LoginOutcome::Failed(e) => Some(e.user_message()),
            LoginOutcome::Busy | LoginOutcome::Discarded => None,
        }
    }
}

/// Clears the in-flight flag when the attempt ends, including when the
/// submit future is dropped mid-flight.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct AuthSession {
    transport: Arc<dyn LoginTransport>,
    store: Arc<SessionTokenStore>,
    diagnostics: Arc<dyn Diagnostics>,
    /// Token attached to the next login request
    current_token: Mutex<Option<String>>,
    in_flight: AtomicBool,
    /// Bumped on detach; responses from an older generation are dropped
    generation: AtomicU64,
    state: watch::Sender<AuthState>,
}

impl AuthSession {
    pub fn new(
        transport: Arc<dyn LoginTransport>,
        store: Arc<SessionTokenStore>,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Self {
        let (state, _) = watch::channel(AuthState::Idle);
        Self {
            transport,
            store,
            diagnostics,
            current_token: Mutex::new(None),
            in_flight: AtomicBool::new(false),
            generation: AtomicU64::new(0),
            state,
        }
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Watch every state transition
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn current_token(&self) -> Option<String> {
        self.current_token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn store(&self) -> &SessionTokenStore {
        &self.store
    }

    fn set_token(&self, token: Option<String>) {
        *self.current_token.lock().unwrap_or_else(PoisonError::into_inner) = token;
    }

    fn transition(&self, next: AuthState) {
        debug!(state = ?next, "Auth state transition");
        self.state.send_replace(next);
    }

    fn storage_failed(&self, operation: &'static str, e: &StorageError) {
        self.diagnostics.report(Diagnostic::TokenStoreFailed {
            operation,
            message: e.to_string(),
        });
    }

    /// Load a token persisted by a previous run so it is attached to the
    /// next login request.
    pub fn restore(&self) -> Result<Option<String>, StorageError> {
        match self.store.load() {
            Ok(Some(token)) => {
                self.set_token(Some(token.clone()));
                Ok(Some(token))
            }
            Ok(None) => {
                self.diagnostics.report(Diagnostic::NoStoredToken);
                Ok(None)
            }
            Err(e) => {
                self.storage_failed("load", &e);
                Err(e)
            }
        }
    }

    /// Run one login attempt.
    ///
    /// Validation and remote failures come back as `Ok` outcomes. Only a
    /// failure to persist the issued token is an `Err`.
    pub async fn submit(&self, credentials: Credentials) -> Result<LoginOutcome, StorageError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            self.diagnostics.report(Diagnostic::LoginIgnored);
            return Ok(LoginOutcome::Busy);
        }
        let _in_flight = InFlight(&self.in_flight);
        let generation = self.generation.load(Ordering::Acquire);

        self.transition(AuthState::Validating);
        if let Some(reason) = validate(&credentials.email, &credentials.password).error() {
            self.diagnostics.report(Diagnostic::LoginRejectedLocally {
                reason: format!("{:?}", reason),
            });
            self.transition(AuthState::Rejected(reason));
            self.transition(AuthState::Idle);
            return Ok(LoginOutcome::Rejected(reason));
        }

        self.transition(AuthState::Authenticating);
        let bearer = self.current_token();
        let result = self.transport.login(&credentials, bearer.as_deref()).await;

        if self.generation.load(Ordering::Acquire) != generation {
            self.diagnostics.report(Diagnostic::StaleResponseDiscarded);
            self.transition(AuthState::Idle);
            return Ok(LoginOutcome::Discarded);
        }

        match result {
            Ok(token) => {
                if let Err(e) = self.store.save(&token) {
                    self.storage_failed("save", &e);
                    self.transition(AuthState::Failed);
                    self.transition(AuthState::Idle);
                    return Err(e);
                }
                self.set_token(Some(token.clone()));
                self.diagnostics.report(Diagnostic::LoginSucceeded);
                self.transition(AuthState::Authenticated);
                Ok(LoginOutcome::Authenticated {
                    navigate: Route::Home { token },
                })
            }
            Err(e) => {
                let diagnostic = match &e {
                    ApiError::Rejected { status, detail } => Diagnostic::LoginRejected {
                        status: *status,
                        detail: detail.clone(),
                    },
                    other => Diagnostic::LoginFailed {
                        message: other.to_string(),
                    },
                };
                self.diagnostics.report(diagnostic);
                self.transition(AuthState::Failed);
                self.transition(AuthState::Idle);
                Ok(LoginOutcome::Failed(e))
            }
        }
    }

    /// Forget the session locally and in storage
    pub fn logout(&self) -> Result<(), StorageError> {
        if let Err(e) = self.store.clear() {
            self.storage_failed("clear", &e);
            return Err(e);
        }
        self.set_token(None);
        self.transition(AuthState::Idle);
        self.diagnostics.report(Diagnostic::LoggedOut);
        Ok(())
    }

    /// The owning screen went away. Any response still in flight is
    /// discarded when it resolves.
    pub fn detach(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }
}
