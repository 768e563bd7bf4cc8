use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Server answered with something other than 200
    #[error("Request rejected with status {status}")]
    Rejected { status: u16, detail: Option<String> },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    /// Build a rejection from a non-success response. Only JSON bodies are
    /// kept as diagnostic text.
    pub fn from_status(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .map(|json| Self::truncate_body(&json.to_string()));
        ApiError::Rejected { status, detail }
    }

    /// Diagnostic text returned by the server, if any
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Rejected { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }

    /// Message suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Rejected { detail: Some(detail), .. } => format!("Login failed: {}", detail),
            ApiError::Rejected { status: 400 | 401 | 403, .. } => {
                "Invalid email or password".to_string()
            }
            ApiError::Rejected { status, .. } => format!("Login failed (status {})", status),
            ApiError::Network(e) if e.is_timeout() => {
                "Connection timed out. Please try again.".to_string()
            }
            ApiError::Network(_) => {
                "Unable to connect to server. Check your internet connection.".to_string()
            }
            ApiError::InvalidResponse(_) | ApiError::InvalidHeader(_) => {
                "Login failed. Please try again.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_keeps_json_detail() {
        let err = ApiError::from_status(400, r#"{"non_field_errors":["Unable to log in"]}"#);
        assert!(matches!(err, ApiError::Rejected { status: 400, .. }));
        assert_eq!(err.detail(), Some(r#"{"non_field_errors":["Unable to log in"]}"#));
        assert!(err.user_message().contains("Unable to log in"));
    }

    #[test]
    fn test_from_status_drops_non_json_body() {
        let err = ApiError::from_status(502, "<html>Bad Gateway</html>");
        assert_eq!(err.detail(), None);
        assert_eq!(err.user_message(), "Login failed (status 502)");
        assert!(!err.is_transport());
    }

    #[test]
    fn test_unauthorized_without_detail() {
        let err = ApiError::from_status(401, "");
        assert_eq!(err.user_message(), "Invalid email or password");
    }

    #[test]
    fn test_truncate_body_respects_char_boundaries() {
        let body = "가".repeat(400);
        let truncated = ApiError::truncate_body(&body);
        assert!(truncated.contains("truncated, 1200 total bytes"));
        assert!(ApiError::truncate_body("short").eq("short"));
    }
}
