//! JWT access token issuance and verification.
//!
//! Tokens are EdDSA (Ed25519) signed. The `sub` claim carries the user
//! UUID that the identity resolver maps back to a stored user; `scope`
//! lists the user's role names at issue time.

use chrono::Utc;
use jsonwebtoken::{Algorithm, Header, Validation};
use pipit_core::models::user::User;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// JWT claims embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject: user ID (UUID string).
    pub sub: String,
    /// Space-separated role names, e.g. `"ADMIN"`.
    pub scope: String,
    pub iss: String,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Unique token ID (UUID string).
    pub jti: String,
}

/// Issue a signed access token for a user.
pub fn issue_access_token(user: &User, config: &AuthConfig) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();
    let claims = AccessTokenClaims {
        sub: user.id.to_string(),
        scope: user.roles.to_scope(),
        iss: config.issuer.clone(),
        iat: now,
        exp: now + config.access_token_lifetime_secs as i64,
        jti: Uuid::new_v4().to_string(),
    };

    let header = Header::new(Algorithm::EdDSA);
    jsonwebtoken::encode(&header, &claims, &config.keys.encoding)
        .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
}

/// Decode and verify an EdDSA JWT access token.
pub fn decode_access_token(
    token: &str,
    config: &AuthConfig,
) -> Result<AccessTokenClaims, AuthError> {
    let mut validation = Validation::new(Algorithm::EdDSA);
    validation.set_issuer(&[&config.issuer]);
    validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);

    jsonwebtoken::decode::<AccessTokenClaims>(token, &config.keys.decoding, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid(e.to_string()),
        })
}

/// Claims that passed signature, issuer and expiry checks.
#[derive(Debug, Clone)]
pub struct ValidatedClaims(pub AccessTokenClaims);

impl ValidatedClaims {
    /// The subject asserted by the credential.
    pub fn subject(&self) -> &str {
        &self.0.sub
    }
}

/// Validate a JWT access token (signature, expiry, issuer) and return
/// the verified claims. Stateless; no database lookup is performed.
pub fn validate_access_token(
    token: &str,
    config: &AuthConfig,
) -> Result<ValidatedClaims, AuthError> {
    decode_access_token(token, config).map(ValidatedClaims)
}

/// Verify an `Authorization` header value of the form `Bearer <jwt>` and
/// return the subject it asserts.
pub fn bearer_subject(authorization: &str, config: &AuthConfig) -> Result<String, AuthError> {
    let authorization = authorization.trim();
    let token = authorization
        .split_once(' ')
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingCredentials)?;

    validate_access_token(token, config).map(|claims| claims.0.sub)
}
