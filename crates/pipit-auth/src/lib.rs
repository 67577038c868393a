//! Pipit Auth: Password verification, JWT issuance/validation, and
//! account registration.

pub mod config;
pub mod error;
pub mod service;
pub mod token;

pub use config::{AuthConfig, TokenKeys};
pub use error::AuthError;
pub use service::{AuthService, LoginInput, LoginOutput, RegisterInput};
pub use token::{AccessTokenClaims, ValidatedClaims};
