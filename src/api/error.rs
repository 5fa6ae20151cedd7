//! API error types for the admin client.

use thiserror::Error;

/// Errors that can occur when talking to the admin API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The session token was rejected.
    #[error("Authentication failed: your session token was rejected")]
    Unauthorized,

    /// The token is valid but lacks the admin role.
    #[error("Permission denied: administrator role required")]
    Forbidden,

    /// Resource not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Rate limited by the API.
    #[error("Rate limited: please wait before retrying")]
    RateLimited,

    /// Server-side failure.
    #[error("Server error: {0}")]
    ServerError(String),

    /// Network or HTTP error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Invalid base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Keyring error when storing/retrieving the session.
    #[error("Keyring error: {0}")]
    Keyring(String),

    /// Response body could not be decoded.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// An update was attempted on a city without an id.
    #[error("City has no id; only persisted cities can be updated")]
    MissingId,

    /// The record changed on the server in a conflicting way.
    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Create an error from an HTTP status code.
    pub fn from_status(status: reqwest::StatusCode, context: &str) -> Self {
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden,
            404 => ApiError::NotFound(context.to_string()),
            409 => ApiError::Conflict(context.to_string()),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(format!("HTTP {}: {}", status, context)),
            _ => ApiError::ServerError(format!("Unexpected HTTP {}: {}", status, context)),
        }
    }

    /// Whether a request failing with this error is worth repeating.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ApiError::RateLimited | ApiError::ServerError(_) | ApiError::Network(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_error_from_status_401() {
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, "test");
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[test]
    fn test_error_from_status_403() {
        let err = ApiError::from_status(StatusCode::FORBIDDEN, "test");
        assert!(matches!(err, ApiError::Forbidden));
    }

    #[test]
    fn test_error_from_status_404() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, "city 7");
        match err {
            ApiError::NotFound(msg) => assert_eq!(msg, "city 7"),
            _ => panic!("Expected NotFound error"),
        }
    }

    #[test]
    fn test_error_from_status_409() {
        let err = ApiError::from_status(StatusCode::CONFLICT, "duplicate iata code");
        assert!(matches!(err, ApiError::Conflict(ref m) if m == "duplicate iata code"));
    }

    #[test]
    fn test_error_from_status_unexpected() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, "bad body");
        match err {
            ApiError::ServerError(msg) => assert!(msg.contains("Unexpected HTTP 400")),
            _ => panic!("Expected ServerError"),
        }
    }

    #[test]
    fn test_transient_errors() {
        assert!(ApiError::RateLimited.is_transient());
        assert!(ApiError::ServerError("boom".to_string()).is_transient());
        assert!(!ApiError::Unauthorized.is_transient());
        assert!(!ApiError::MissingId.is_transient());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            ApiError::NotFound("city 7".to_string()).to_string(),
            "Resource not found: city 7"
        );
        assert_eq!(
            ApiError::Forbidden.to_string(),
            "Permission denied: administrator role required"
        );
    }
}
