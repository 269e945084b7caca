use std::fmt;

use crate::schema::FieldErrors;

#[derive(Debug)]
pub enum AppError {
    /// Record rejected before submission; never reaches the network
    Validation(FieldErrors),
    /// Login exchange refused by the server
    AuthRejected { status: u16, body: String },
    /// Non-2xx response from any other call
    RequestFailed { status: u16, body: String },
    /// Persisted session could not be decoded
    MalformedSession(String),
    /// Transport-level failure (no status code)
    Network(String),
    Serialization(serde_json::Error),
    Storage(String),
    Configuration(String),
}

impl AppError {
    /// Stable classification code for callers that present errors
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::AuthRejected { .. } => "AUTH_REJECTED",
            AppError::RequestFailed { .. } => "REQUEST_FAILED",
            AppError::MalformedSession(_) => "MALFORMED_SESSION",
            AppError::Network(_) => "NETWORK_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }

    /// HTTP status carried by the error, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::AuthRejected { status, .. } | AppError::RequestFailed { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(errors) => {
                write!(f, "Validation error: {} field(s) rejected", errors.len())
            }
            AppError::AuthRejected { status, body } => {
                write!(f, "Authentication rejected ({}): {}", status, body)
            }
            AppError::RequestFailed { status, body } => {
                write!(f, "Request failed ({}): {}", status, body)
            }
            AppError::MalformedSession(e) => write!(f, "Malformed session: {}", e),
            AppError::Network(e) => write!(f, "Network error: {}", e),
            AppError::Serialization(e) => write!(f, "Serialization error: {}", e),
            AppError::Storage(e) => write!(f, "Storage error: {}", e),
            AppError::Configuration(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for AppError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        AppError::Storage(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
