//! Authentication and authorization logic.
//!
//! Provides password hashing and JWT issuance/verification shared by the
//! HTTP layer and the bootstrap sequence.

pub mod jwt;
pub mod password;

use thiserror::Error;

/// Authentication errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Token missing")]
    TokenMissing,

    #[error("Token invalid")]
    TokenInvalid,

    #[error("Token expired")]
    TokenExpired,

    #[error("Authentication failed")]
    AuthFailed,

    #[error("User not found")]
    UserNotFound,

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Hashing error: {0}")]
    Hashing(String),
}
