//! Login screen controller.
//!
//! Owns the form input and wires the screen's events to the core: mount
//! runs the session restore and the version check side by side, submit runs
//! the login flow, unmount detaches any in-flight login.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::auth::{is_login_enabled, AuthSession, Credentials, LoginOutcome, StorageError};
use crate::navigation::{Route, SecondaryAction};
use crate::version::{VersionGate, VersionInfo};

/// What the screen learned while mounting.
#[derive(Debug)]
pub struct MountReport {
    /// A token from a previous run was found
    pub has_session: bool,
    /// Reading the stored token failed
    pub storage_error: Option<StorageError>,
    pub version: VersionInfo,
}

#[derive(Default)]
struct LoginForm {
    email: String,
    password: String,
}

pub struct LoginScreen {
    auth: Arc<AuthSession>,
    gate: Arc<VersionGate>,
    form: Mutex<LoginForm>,
    version: Mutex<VersionInfo>,
    /// Bumped on unmount; version results from an older generation are dropped
    generation: AtomicU64,
}

impl LoginScreen {
    pub fn new(auth: Arc<AuthSession>, gate: Arc<VersionGate>) -> Self {
        let version = VersionInfo::new(gate.installed());
        Self {
            auth,
            gate,
            form: Mutex::new(LoginForm::default()),
            version: Mutex::new(version),
            generation: AtomicU64::new(0),
        }
    }

    pub fn auth(&self) -> &AuthSession {
        &self.auth
    }

    /// Restore the stored session and check the published version. The two
    /// run concurrently and neither waits on the other.
    pub async fn mount(&self) -> MountReport {
        let restore = async { self.auth.restore() };
        let (restored, version) = futures::join!(restore, self.refresh_version());

        let (has_session, storage_error) = match restored {
            Ok(token) => (token.is_some(), None),
            Err(e) => (false, Some(e)),
        };
        debug!(has_session, "Login screen mounted");

        MountReport {
            has_session,
            storage_error,
            version,
        }
    }

    /// Run the version check and remember its result for display. A result
    /// that arrives after `unmount` is dropped and the shown version is
    /// returned unchanged.
    pub async fn refresh_version(&self) -> VersionInfo {
        let generation = self.generation.load(Ordering::Acquire);
        let info = self.gate.lookup().await;

        let mut shown = self.version.lock().unwrap_or_else(PoisonError::into_inner);
        if self.generation.load(Ordering::Acquire) != generation {
            debug!(latest = ?info.latest, "Version result arrived after unmount, dropped");
            return shown.clone();
        }
        self.gate.record(&info);
        *shown = info.clone();
        info
    }

    pub fn version(&self) -> VersionInfo {
        self.version.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Lines shown at the bottom of the screen
    pub fn version_lines(&self) -> [String; 2] {
        let version = self.version();
        [
            format!("Current version: {}", version.installed),
            format!("Latest version: {}", version.latest_display()),
        ]
    }

    pub fn set_email(&self, email: impl Into<String>) {
        self.form.lock().unwrap_or_else(PoisonError::into_inner).email = email.into();
    }

    pub fn set_password(&self, password: impl Into<String>) {
        self.form.lock().unwrap_or_else(PoisonError::into_inner).password = password.into();
    }

    pub fn is_login_enabled(&self) -> bool {
        let form = self.form.lock().unwrap_or_else(PoisonError::into_inner);
        is_login_enabled(&form.email, &form.password)
    }

    /// Submit the form. The password is cleared after a successful login.
    pub async fn submit(&self) -> Result<LoginOutcome, StorageError> {
        let credentials = {
            let form = self.form.lock().unwrap_or_else(PoisonError::into_inner);
            Credentials::new(form.email.clone(), form.password.clone())
        };

        let outcome = self.auth.submit(credentials).await?;
        if outcome.is_authenticated() {
            self.form.lock().unwrap_or_else(PoisonError::into_inner).password.clear();
        }
        Ok(outcome)
    }

    pub fn secondary_action(&self, action: SecondaryAction) -> Route {
        action.route()
    }

    /// The screen is going away; late login and version responses are dropped
    pub fn unmount(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.auth.detach();
    }
}
