//! Diagnostic reporting for the login flow and the version check.
//!
//! Components report what happened through the `Diagnostics` trait instead
//! of logging inline at each failure branch. `TracingDiagnostics` turns
//! reports into `tracing` events; `RecordingDiagnostics` keeps them for
//! inspection.

use std::sync::{Mutex, PoisonError};

use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// No token was persisted from a previous run
    NoStoredToken,
    /// A token store operation failed
    TokenStoreFailed { operation: &'static str, message: String },
    /// A submit arrived while another attempt was in flight
    LoginIgnored,
    LoginRejectedLocally { reason: String },
    LoginSucceeded,
    /// Server answered with a non-success status
    LoginRejected { status: u16, detail: Option<String> },
    LoginFailed { message: String },
    /// A response arrived after its screen went away
    StaleResponseDiscarded,
    LoggedOut,
    VersionLookupFailed { message: String },
    /// The distribution channel has no listing for the app
    VersionUnlisted,
    VersionChecked {
        installed: String,
        latest: Option<String>,
        current: bool,
    },
}

pub trait Diagnostics: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Emits every report as a structured `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        match diagnostic {
            Diagnostic::NoStoredToken => debug!("No stored session token"),
            Diagnostic::TokenStoreFailed { operation, message } => {
                error!(operation, error = %message, "Session token storage failed")
            }
            Diagnostic::LoginIgnored => debug!("Login already in flight, ignoring submit"),
            Diagnostic::LoginRejectedLocally { reason } => {
                info!(reason = %reason, "Login input rejected")
            }
            Diagnostic::LoginSucceeded => info!("Login successful"),
            Diagnostic::LoginRejected { status, detail } => {
                error!(status, detail = detail.as_deref().unwrap_or(""), "Login request rejected")
            }
            Diagnostic::LoginFailed { message } => error!(error = %message, "Login request failed"),
            Diagnostic::StaleResponseDiscarded => debug!("Discarding response for detached screen"),
            Diagnostic::LoggedOut => info!("Logged out"),
            Diagnostic::VersionLookupFailed { message } => {
                warn!(error = %message, "Latest version lookup failed")
            }
            Diagnostic::VersionUnlisted => warn!("App is not listed on the distribution channel"),
            Diagnostic::VersionChecked {
                installed,
                latest,
                current,
            } => {
                if current {
                    info!(installed = %installed, "Running the latest version");
                } else {
                    info!(
                        installed = %installed,
                        latest = latest.as_deref().unwrap_or("unknown"),
                        "Running version not confirmed current"
                    );
                }
            }
        }
    }
}

/// Keeps every report in order of arrival.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    reports: Mutex<Vec<Diagnostic>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<Diagnostic> {
        self.reports.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn contains(&self, diagnostic: &Diagnostic) -> bool {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(diagnostic)
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(diagnostic);
    }
}
