//! Authentication errors
//!
//! `AuthFailure` is consumed inside the authenticator; callers only ever see
//! `Option<Principal>`.

use thiserror::Error;

/// Why a token did not authenticate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("signature verification failed")]
    BadSignature,

    #[error("token expired")]
    Expired,

    #[error("issuer mismatch: expected '{expected}', found {found:?}")]
    IssuerMismatch {
        expected: String,
        found: Option<String>,
    },

    #[error("subject missing or empty")]
    MissingSubject,
}

/// Invalid authenticator settings
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthConfigError {
    #[error("JWT secret must be at least {min} bytes, got {actual}")]
    SecretTooShort { min: usize, actual: usize },
}

/// Token issuance failures
#[derive(Error, Debug)]
pub enum IssueError {
    #[error("subject cannot be empty")]
    EmptySubject,

    #[error("JWT encoding failed: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),
}
