//! Advisory app version check.
//!
//! `VersionGate` compares the installed version with the latest version
//! published on the platform's store. Lookup failures are reported through
//! `Diagnostics` and degrade to an unknown latest version; they never reach
//! the user and never block login.

pub mod provider;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::diagnostics::{Diagnostic, Diagnostics};

pub use provider::{AppStoreProvider, PlayStoreProvider, VersionProvider};

/// Placeholder shown while the latest version is unknown
const UNKNOWN_VERSION: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct VersionInfo {
    pub installed: String,
    /// `None` until the lookup resolves, and after it fails
    pub latest: Option<String>,
}

impl VersionInfo {
    pub fn new(installed: impl Into<String>) -> Self {
        Self {
            installed: installed.into(),
            latest: None,
        }
    }

    /// Current only when the latest version is known and equal
    pub fn is_current(&self) -> bool {
        self.latest.as_deref() == Some(self.installed.as_str())
    }

    /// A different version is known to be published
    pub fn update_available(&self) -> bool {
        matches!(&self.latest, Some(latest) if *latest != self.installed)
    }

    pub fn latest_display(&self) -> &str {
        self.latest.as_deref().unwrap_or(UNKNOWN_VERSION)
    }
}

/// Which store the app is distributed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Android,
    Ios,
}

impl Platform {
    /// Platform of the running build
    pub fn current() -> Self {
        if cfg!(target_os = "ios") {
            Platform::Ios
        } else {
            Platform::Android
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "android" | "playstore" | "play" => Some(Platform::Android),
            "ios" | "appstore" | "app" => Some(Platform::Ios),
            _ => None,
        }
    }
}

pub struct VersionGate {
    installed: String,
    listing_id: String,
    provider: Arc<dyn VersionProvider>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl VersionGate {
    pub fn new(
        installed: impl Into<String>,
        listing_id: impl Into<String>,
        provider: Arc<dyn VersionProvider>,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Self {
        Self {
            installed: installed.into(),
            listing_id: listing_id.into(),
            provider,
            diagnostics,
        }
    }

    pub fn installed(&self) -> &str {
        &self.installed
    }

    /// Look up the latest published version and report the result. Never
    /// fails.
    pub async fn check(&self) -> VersionInfo {
        let info = self.lookup().await;
        self.record(&info);
        info
    }

    /// Query the store without reporting the outcome of the comparison
    pub async fn lookup(&self) -> VersionInfo {
        let mut info = VersionInfo::new(self.installed.clone());

        match self.provider.latest_version(&self.listing_id).await {
            Ok(Some(latest)) => info.latest = Some(latest),
            Ok(None) => self.diagnostics.report(Diagnostic::VersionUnlisted),
            Err(e) => self.diagnostics.report(Diagnostic::VersionLookupFailed {
                message: format!("{} lookup: {}", self.provider.name(), e),
            }),
        }
        info
    }

    pub fn record(&self, info: &VersionInfo) {
        self.diagnostics.report(Diagnostic::VersionChecked {
            installed: info.installed.clone(),
            latest: info.latest.clone(),
            current: info.is_current(),
        });
    }
}
