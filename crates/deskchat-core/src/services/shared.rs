//! Plumbing shared across the backend HTTP clients.

use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;

/// Standard User-Agent header for deskchat API requests.
pub const USER_AGENT: &str = concat!("deskchat/", env!("CARGO_PKG_VERSION"));

/// Default base URL for a locally running backend.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Resolves the backend base URL with precedence: env > config > default.
///
/// # Errors
/// Returns an error if the resolved value is not a well-formed URL.
pub fn resolve_base_url(config_base_url: Option<&str>, env_var: &str) -> Result<String> {
    if let Ok(env_url) = std::env::var(env_var) {
        let trimmed = env_url.trim();
        if !trimmed.is_empty() {
            validate_url(trimmed)?;
            return Ok(trimmed.trim_end_matches('/').to_string());
        }
    }

    if let Some(config_url) = config_base_url {
        let trimmed = config_url.trim();
        if !trimmed.is_empty() {
            validate_url(trimmed)?;
            return Ok(trimmed.trim_end_matches('/').to_string());
        }
    }

    Ok(DEFAULT_BASE_URL.to_string())
}

fn validate_url(url: &str) -> Result<()> {
    url::Url::parse(url).with_context(|| format!("Invalid backend base URL: {url}"))?;
    Ok(())
}

/// Builds the shared reqwest client with the standard timeout and User-Agent.
pub(crate) fn build_http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_default()
}

/// Categories of service errors for consistent handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    /// HTTP status error (4xx, 5xx) without a backend-provided detail
    HttpStatus,
    /// Connection timeout or request timeout
    Timeout,
    /// Failed to parse the response body
    Parse,
    /// Failure the backend explained via its `detail` field
    ApiError,
    /// Rejected client-side before any request was made
    InvalidInput,
}

impl fmt::Display for ServiceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceErrorKind::HttpStatus => write!(f, "http_status"),
            ServiceErrorKind::Timeout => write!(f, "timeout"),
            ServiceErrorKind::Parse => write!(f, "parse"),
            ServiceErrorKind::ApiError => write!(f, "api_error"),
            ServiceErrorKind::InvalidInput => write!(f, "invalid_input"),
        }
    }
}

/// Structured error from a backend client with kind and details.
#[derive(Debug, Clone)]
pub struct ServiceError {
    /// Error category
    pub kind: ServiceErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    /// Optional additional details (e.g., raw error body)
    pub details: Option<String>,
}

impl ServiceError {
    pub fn new(kind: ServiceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Timeout, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Parse, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::InvalidInput, message)
    }

    /// Creates an error from a non-success response.
    ///
    /// The backend reports failures as `{"detail": "..."}`; when that field
    /// is present the error is classified `ApiError` and carries the detail
    /// as its message, so callers can surface the backend's own wording.
    pub fn from_response(status: u16, body: &str) -> Self {
        if let Ok(json) = serde_json::from_str::<Value>(body)
            && let Some(detail) = json.get("detail").and_then(Value::as_str)
        {
            return Self {
                kind: ServiceErrorKind::ApiError,
                message: detail.to_string(),
                details: Some(body.to_string()),
            };
        }
        Self {
            kind: ServiceErrorKind::HttpStatus,
            message: format!("HTTP {status}"),
            details: (!body.is_empty()).then(|| body.to_string()),
        }
    }

    /// Returns the backend-provided failure detail, if the backend gave one.
    pub fn backend_detail(&self) -> Option<&str> {
        (self.kind == ServiceErrorKind::ApiError).then_some(self.message.as_str())
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ServiceError {}

/// Result type for service operations.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

pub(crate) fn classify_reqwest_error(e: &reqwest::Error) -> ServiceError {
    if e.is_timeout() {
        ServiceError::timeout(format!("Request timed out: {e}"))
    } else if e.is_connect() {
        ServiceError::timeout(format!("Connection failed: {e}"))
    } else if e.is_request() {
        ServiceError::new(ServiceErrorKind::HttpStatus, format!("Request error: {e}"))
    } else {
        ServiceError::new(ServiceErrorKind::HttpStatus, format!("Network error: {e}"))
    }
}

/// Checks the response status and decodes a JSON body.
///
/// # Errors
/// Returns a `ServiceError` for non-success statuses (extracting the
/// backend's `detail` when present) and for undecodable bodies.
pub(crate) async fn decode_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> ServiceResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ServiceError::from_response(status.as_u16(), &body));
    }

    let body = response
        .text()
        .await
        .map_err(|e| ServiceError::parse(format!("Failed to read response body: {e}")))?;
    serde_json::from_str(&body)
        .map_err(|e| ServiceError::parse(format!("Failed to decode response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_response_extracts_backend_detail() {
        let err = ServiceError::from_response(404, r#"{"detail": "Agent 'billing' not found"}"#);
        assert_eq!(err.kind, ServiceErrorKind::ApiError);
        assert_eq!(err.message, "Agent 'billing' not found");
        assert_eq!(err.backend_detail(), Some("Agent 'billing' not found"));
        assert!(err.details.is_some());
    }

    #[test]
    fn test_from_response_without_detail_is_plain_status() {
        let err = ServiceError::from_response(502, "Bad Gateway");
        assert_eq!(err.kind, ServiceErrorKind::HttpStatus);
        assert_eq!(err.message, "HTTP 502");
        assert!(err.backend_detail().is_none());
        assert_eq!(err.details.as_deref(), Some("Bad Gateway"));
    }

    #[test]
    fn test_from_response_empty_body_has_no_details() {
        let err = ServiceError::from_response(500, "");
        assert_eq!(err.kind, ServiceErrorKind::HttpStatus);
        assert!(err.details.is_none());
    }

    #[test]
    fn test_resolve_base_url_prefers_config_and_strips_slash() {
        // Env var intentionally unset in tests; config wins over default.
        let url = resolve_base_url(
            Some("http://support.example.com/"),
            "DESKCHAT_TEST_UNSET_BASE_URL",
        )
        .unwrap();
        assert_eq!(url, "http://support.example.com");
    }

    #[test]
    fn test_resolve_base_url_defaults_when_unset() {
        let url = resolve_base_url(None, "DESKCHAT_TEST_UNSET_BASE_URL").unwrap();
        assert_eq!(url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_resolve_base_url_rejects_garbage() {
        assert!(resolve_base_url(Some("not a url"), "DESKCHAT_TEST_UNSET_BASE_URL").is_err());
    }
}
