//! Core types for the administration API.
//!
//! This module contains the credential and token types used by every
//! backend. Host records themselves live in the `reconcile` crate since the
//! engine owns their interpretation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Admin login credentials.
///
/// The secret is never printed by the `Debug` implementation.
///
/// # Example
///
/// ```
/// use proxy_api::Credentials;
///
/// let creds = Credentials::new("admin@example.com", "changeme");
/// assert_eq!(creds.identity, "admin@example.com");
/// assert!(!format!("{:?}", creds).contains("changeme"));
/// ```
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    /// Login identity (the admin email).
    pub identity: String,
    /// Login secret (the admin password).
    pub secret: String,
}

impl Credentials {
    /// Create credentials from an identity and secret.
    pub fn new(identity: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identity", &self.identity)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Opaque bearer token returned by the token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    /// Wrap a raw token string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Value for the `Authorization` header.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

/// Body of a successful `POST /api/tokens`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// The bearer token.
    pub token: String,
}

/// Error body returned by the API on failure.
///
/// The server answers `{"error": {"code": 400, "message": "..."}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// The error details.
    pub error: ApiErrorDetail,
}

/// Details inside an [`ApiErrorBody`].
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    /// Human-readable message.
    pub message: String,
}
