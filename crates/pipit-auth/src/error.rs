//! Authentication error types.

use pipit_core::error::PipitError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("missing bearer credential")]
    MissingCredentials,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for PipitError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::MissingCredentials
            | AuthError::TokenExpired
            | AuthError::TokenInvalid(_) => PipitError::AuthenticationFailed {
                reason: err.to_string(),
            },
            AuthError::PasswordTooShort { .. } => PipitError::Validation {
                message: err.to_string(),
            },
            AuthError::Crypto(msg) => PipitError::Crypto(msg),
        }
    }
}
