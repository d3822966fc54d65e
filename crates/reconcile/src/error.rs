//! Error types for reconciliation

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the engine's input validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Operator answer outside the accepted token set
    #[error("invalid answer '{0}': expected y, n or a")]
    InvalidResponse(String),

    /// Empty exemption substring, which would exempt every host
    #[error("exemption substrings must not be empty")]
    EmptyExemption,

    /// More than one run mode selected
    #[error("run modes are mutually exclusive: {0}")]
    ConflictingModes(String),
}
