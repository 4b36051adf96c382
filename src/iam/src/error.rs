//! Error types for policy compilation

use thiserror::Error;

/// Errors raised while compiling a policy document.
///
/// All failures are compile-time failures: a successfully compiled document
/// can always be evaluated.
#[derive(Debug, Error)]
pub enum IamError {
    /// Effect field is neither "Allow" nor "Deny"
    #[error("Invalid effect: {0}")]
    InvalidEffect(String),

    /// A pattern is empty after sanitization, or a literal adjacent to a
    /// wildcard falls outside the allowed charset
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// A statement is missing its Action or Resource field
    #[error("Malformed statement: {0}")]
    MalformedStatement(String),
}

/// Result type for policy operations
pub type Result<T> = std::result::Result<T, IamError>;
