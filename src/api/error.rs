//! Error types for the movilizaciones backend client.
//!
//! Uses `thiserror` so each variant carries its own `Display` text. The
//! variants line up with how callers recover: network problems fall back to
//! an empty view, auth problems send the user back to log in, malformed
//! bodies are reported but never crash a view.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend rejected the session token (HTTP 401/403).
    #[error("session rejected by backend (status {status})")]
    Auth { status: u16 },

    /// Any other non-success status.
    #[error("API error (status {status}): {message}")]
    Status { status: u16, message: String },

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The body did not have a shape we understand.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Underlying connection failure (DNS, refused connection, TLS).
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_decode() {
            ApiError::Malformed(e.to_string())
        } else {
            ApiError::Network(e)
        }
    }
}

impl ApiError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => ApiError::Auth { status },
            _ => ApiError::Status { status, message },
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Auth { .. })
    }

    /// Failures a view survives by showing an empty record set.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ApiError::Network(_) | ApiError::Timeout | ApiError::Malformed(_) | ApiError::Status { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_statuses_are_classified() {
        assert!(ApiError::from_status(401, String::new()).is_auth());
        assert!(ApiError::from_status(403, String::new()).is_auth());
        assert!(!ApiError::from_status(500, String::new()).is_auth());
    }

    #[test]
    fn status_display() {
        let err = ApiError::from_status(500, "Internal".into());
        assert_eq!(err.to_string(), "API error (status 500): Internal");
    }

    #[test]
    fn auth_is_not_recoverable() {
        assert!(!ApiError::Auth { status: 401 }.is_recoverable());
        assert!(ApiError::Timeout.is_recoverable());
        assert!(ApiError::Malformed("x".into()).is_recoverable());
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ApiError>();
    }
}
