use thiserror::Error;

use crate::api::ApiError;
use crate::movilizacion::Estado;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(String),

    /// Rejected locally, before any request was sent.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Cannot move a request from {from} to {to}")]
    InvalidTransition { from: Estado, to: Estado },

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Coarse error classes the CLI turns into messages and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Connection problems and timeouts.
    Network,
    /// The session is missing, expired or not allowed (401/403).
    Auth,
    /// The backend answered with something we could not read.
    Malformed,
    /// Bad user input or a disallowed lifecycle step.
    Validation,
    /// Everything else.
    Internal,
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorClass::Network => write!(f, "Network"),
            ErrorClass::Auth => write!(f, "Auth"),
            ErrorClass::Malformed => write!(f, "Malformed"),
            ErrorClass::Validation => write!(f, "Validation"),
            ErrorClass::Internal => write!(f, "Internal"),
        }
    }
}

impl AppError {
    pub fn class(&self) -> ErrorClass {
        match self {
            AppError::Validation(_) | AppError::InvalidTransition { .. } => ErrorClass::Validation,
            AppError::Api(ApiError::Auth { .. }) => ErrorClass::Auth,
            AppError::Api(ApiError::Network(_) | ApiError::Timeout) => ErrorClass::Network,
            AppError::Api(ApiError::Malformed(_)) | AppError::Json(_) => ErrorClass::Malformed,
            AppError::Api(ApiError::Status { .. }) => ErrorClass::Network,
            AppError::Config(_) | AppError::Io(_) | AppError::Toml(_) => ErrorClass::Internal,
        }
    }

    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> i32 {
        match self.class() {
            ErrorClass::Validation => 2,
            ErrorClass::Auth => 3,
            ErrorClass::Network | ErrorClass::Malformed => 4,
            ErrorClass::Internal => 1,
        }
    }
}
