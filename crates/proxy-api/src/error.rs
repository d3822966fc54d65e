//! Error types for administration API operations.
//!
//! Errors are categorized so the CLI can give appropriate feedback. Nothing
//! in this crate retries; the category only drives the advice shown.

use std::fmt;

/// Result type alias for API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of API errors for user feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Network-related errors (server unreachable, connection reset).
    Network,
    /// Credentials rejected or token expired.
    Authentication,
    /// Host or endpoint not found.
    NotFound,
    /// Request understood but rejected (validation failure).
    Rejected,
    /// Response body could not be parsed.
    Format,
    /// Other/unknown errors.
    Other,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Network connectivity issue",
            Self::Authentication => "Authentication failed",
            Self::NotFound => "Resource not found",
            Self::Rejected => "Request rejected by the server",
            Self::Format => "Unexpected response format",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network => "Check that the host URL is reachable and try again",
            Self::Authentication => "Verify the admin email and password",
            Self::NotFound => "Check the host URL; it should point at the admin port (e.g. :81)",
            Self::Rejected => "Inspect the host in the admin UI for invalid settings",
            Self::Format => "The server may be running an unsupported version",
            Self::Other => "Check the error details for more information",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur talking to the administration API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed or returned a non-success status.
    #[error("HTTP request failed: {message}")]
    HttpError {
        /// Error message.
        message: String,
        /// HTTP status code if available.
        status: Option<u16>,
    },

    /// The token endpoint rejected the credentials.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Invalid response from API.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),

    /// Invalid base URL.
    #[error("invalid host URL '{0}': expected http:// or https://")]
    InvalidUrl(String),
}

impl Error {
    /// Create an HTTP error.
    pub fn http(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::HttpError {
            message: message.into(),
            status,
        }
    }

    /// HTTP status code, if the error came from a response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::HttpError { status, .. } => *status,
            _ => None,
        }
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::HttpError { status, .. } => match status {
                None => ErrorCategory::Network,
                Some(401 | 403) => ErrorCategory::Authentication,
                Some(404) => ErrorCategory::NotFound,
                Some(400..=499) => ErrorCategory::Rejected,
                Some(500..=599) => ErrorCategory::Network,
                Some(_) => ErrorCategory::Other,
            },
            Error::Authentication(_) => ErrorCategory::Authentication,
            Error::InvalidResponse(_) => ErrorCategory::Format,
            Error::InvalidUrl(_) => ErrorCategory::Other,
        }
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::HttpError {
                message: format!("HTTP {}", code),
                status: Some(code),
            },
            other => Self::HttpError {
                message: other.to_string(),
                status: None,
            },
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}
