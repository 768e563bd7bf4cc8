//! HTTP client for the GreenDan account server.
//!
//! The only call the client core makes is the login exchange:
//! `POST <auth-base-url>/login/` with a JSON body and a bearer header.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::auth::Credentials;

use super::ApiError;

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// The remote half of a login attempt.
#[async_trait]
pub trait LoginTransport: Send + Sync {
    /// Exchange credentials for a session token. `bearer` is whatever token
    /// the client currently holds, if any.
    async fn login(&self, credentials: &Credentials, bearer: Option<&str>) -> Result<String, ApiError>;
}

/// Token field names the account server may use
#[derive(Debug, Deserialize)]
struct LoginResponse {
    key: Option<String>,
    token: Option<String>,
    access: Option<String>,
}

impl LoginResponse {
    fn into_token(self) -> Option<String> {
        self.key.or(self.token).or(self.access).filter(|t| !t.is_empty())
    }
}

/// API client for the account server.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    auth_base_url: String,
}

impl ApiClient {
    pub fn new(auth_base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self::with_client(client, auth_base_url))
    }

    /// Create a client sharing an existing connection pool
    pub fn with_client(client: Client, auth_base_url: impl Into<String>) -> Self {
        Self {
            client,
            auth_base_url: auth_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Underlying HTTP client, for other services that want the same pool
    pub fn http(&self) -> &Client {
        &self.client
    }

    pub fn login_url(&self) -> String {
        format!("{}/login/", self.auth_base_url)
    }

    /// The bearer header is always sent, empty when no token is held
    fn auth_headers(bearer: Option<&str>) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", bearer.unwrap_or_default()))?,
        );
        Ok(headers)
    }

    /// Check for the success status, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status() == StatusCode::OK {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status.as_u16(), &body))
        }
    }
}

#[async_trait]
impl LoginTransport for ApiClient {
    async fn login(&self, credentials: &Credentials, bearer: Option<&str>) -> Result<String, ApiError> {
        let url = self.login_url();
        debug!(url = %url, has_bearer = bearer.is_some(), "Sending login request");

        let response = self
            .client
            .post(&url)
            .headers(Self::auth_headers(bearer)?)
            .json(credentials)
            .send()
            .await?;

        let response = Self::check_response(response).await?;

        let body: LoginResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse login response: {}", e)))?;

        body.into_token().ok_or_else(|| {
            warn!("Login response did not contain a token");
            ApiError::InvalidResponse("Login response did not contain a token".to_string())
        })
    }
}
