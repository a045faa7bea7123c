//! Authentication and authorization logic.
//!
//! Provides the token codec and signer, password hashing, role resolution
//! and the datastore contract that `learnhub_api` builds its routes on.

pub mod codec;
pub mod digest;
pub mod jwt;
pub mod memory;
pub mod password;
pub mod queries;
pub mod roles;
pub mod store;

use thiserror::Error;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The signing secret is missing or empty.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Malformed base64url or JSON input.
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// A hashing primitive could not be initialised.
    #[error("Crypto unavailable: {0}")]
    CryptoUnavailable(String),

    /// Signature mismatch or expiry. Never surfaced to callers of `verify_token`.
    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Invalid credentials")]
    CredentialError,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
