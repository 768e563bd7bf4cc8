//! Store lookups for the latest published version.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::api::ApiError;

const PLAY_STORE_BASE_URL: &str = "https://play.google.com/store/apps/details";
const APP_STORE_LOOKUP_URL: &str = "https://itunes.apple.com/lookup";

/// Older store page layout: "Current Version ... <span>1.2.3</span>"
const PLAY_LEGACY_PATTERN: &str = r"Current Version.+?>([\d.-]+)</span>";
/// Current layout embeds the version in a script data blob: [[["1.2.3"]]
const PLAY_DATA_PATTERN: &str = r#"\[\[\["([\d.-]+?)"\]\]"#;

static PLAY_PATTERNS: OnceLock<[Regex; 2]> = OnceLock::new();

fn play_patterns() -> &'static [Regex; 2] {
    PLAY_PATTERNS.get_or_init(|| {
        [
            Regex::new(PLAY_LEGACY_PATTERN).expect("PLAY_LEGACY_PATTERN is a valid regex"),
            Regex::new(PLAY_DATA_PATTERN).expect("PLAY_DATA_PATTERN is a valid regex"),
        ]
    })
}

/// Read-only source of the latest published version.
#[async_trait]
pub trait VersionProvider: Send + Sync {
    /// `Ok(None)` when the app has no listing
    async fn latest_version(&self, listing_id: &str) -> Result<Option<String>, ApiError>;

    fn name(&self) -> &'static str;
}

/// Scrapes the Google Play details page.
pub struct PlayStoreProvider {
    client: Client,
    base_url: String,
    language: String,
}

impl PlayStoreProvider {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: PLAY_STORE_BASE_URL.to_string(),
            language: "en".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Extract the version string from a Play Store details page
pub fn parse_play_store_version(html: &str) -> Option<String> {
    play_patterns()
        .iter()
        .find_map(|re| re.captures(html))
        .map(|caps| caps[1].trim().to_string())
}

#[async_trait]
impl VersionProvider for PlayStoreProvider {
    async fn latest_version(&self, listing_id: &str) -> Result<Option<String>, ApiError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("id", listing_id), ("hl", self.language.as_str())])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }

        let html = response.text().await?;
        let version = parse_play_store_version(&html);
        if version.is_none() {
            debug!(listing_id, "No version marker found on store page");
            return Err(ApiError::InvalidResponse(
                "store page has no version marker".to_string(),
            ));
        }
        Ok(version)
    }

    fn name(&self) -> &'static str {
        "playStore"
    }
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    results: Vec<LookupResult>,
}

#[derive(Debug, Deserialize)]
struct LookupResult {
    version: Option<String>,
}

/// Queries the App Store lookup API by bundle id.
pub struct AppStoreProvider {
    client: Client,
    lookup_url: String,
    country: String,
}

impl AppStoreProvider {
    pub fn new(client: Client, country: impl Into<String>) -> Self {
        Self {
            client,
            lookup_url: APP_STORE_LOOKUP_URL.to_string(),
            country: country.into(),
        }
    }

    pub fn with_lookup_url(mut self, lookup_url: impl Into<String>) -> Self {
        self.lookup_url = lookup_url.into();
        self
    }
}

/// Extract the version from an App Store lookup response body
pub fn parse_app_store_version(body: &str) -> Result<Option<String>, ApiError> {
    let lookup: LookupResponse = serde_json::from_str(body)
        .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse lookup response: {}", e)))?;
    Ok(lookup.results.into_iter().find_map(|r| r.version))
}

#[async_trait]
impl VersionProvider for AppStoreProvider {
    async fn latest_version(&self, listing_id: &str) -> Result<Option<String>, ApiError> {
        let response = self
            .client
            .get(&self.lookup_url)
            .query(&[("bundleId", listing_id), ("country", self.country.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }

        let body = response.text().await?;
        parse_app_store_version(&body)
    }

    fn name(&self) -> &'static str {
        "appStore"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_play_store_data_layout() {
        let html = r#"<script>AF_initDataCallback({data:[null,[[["1.2.0"]],[[[33]]]]]});</script>"#;
        assert_eq!(parse_play_store_version(html).as_deref(), Some("1.2.0"));
    }

    #[test]
    fn test_parse_play_store_legacy_layout() {
        let html = r#"<div>Current Version</div><span class="htlgb"><div><span class="htlgb">0.0.9</span></div></span>"#;
        assert_eq!(parse_play_store_version(html).as_deref(), Some("0.0.9"));
    }

    #[test]
    fn test_parse_play_store_without_marker() {
        assert_eq!(parse_play_store_version("<html>Varies with device</html>"), None);
    }

    #[test]
    fn test_parse_app_store_lookup() {
        let body = r#"{"resultCount":1,"results":[{"version":"1.2.0","trackViewUrl":"https://apps.apple.com/app/id1"}]}"#;
        assert_eq!(parse_app_store_version(body).unwrap().as_deref(), Some("1.2.0"));

        let empty = r#"{"resultCount":0,"results":[]}"#;
        assert_eq!(parse_app_store_version(empty).unwrap(), None);

        assert!(matches!(
            parse_app_store_version("<html>"),
            Err(ApiError::InvalidResponse(_))
        ));
    }
}
