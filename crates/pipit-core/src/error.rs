//! Error types for the Pipit system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipitError {
    #[error("Identity not found: {subject}")]
    IdentityNotFound { subject: String },

    #[error("Post not found: {id}")]
    PostNotFound { id: i64 },

    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    #[error("Invalid pagination: {reason}")]
    InvalidPagination { reason: String },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type PipitResult<T> = Result<T, PipitError>;
