//! Account and token settings.
//!
//! Keys are parsed once when the configuration is built, so a bad PEM
//! fails at startup rather than on the first login.

use std::fmt;

use jsonwebtoken::{DecodingKey, EncodingKey};
use pipit_core::password::PasswordHashing;

use crate::error::AuthError;

pub const DEFAULT_ISSUER: &str = "pipit";
pub const DEFAULT_ACCESS_TOKEN_LIFETIME_SECS: u64 = 300;
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 8;

/// Ed25519 key pair that signs and verifies access tokens.
#[derive(Clone)]
pub struct TokenKeys {
    pub(crate) encoding: EncodingKey,
    pub(crate) decoding: DecodingKey,
}

impl TokenKeys {
    pub fn from_ed_pem(private_pem: &str, public_pem: &str) -> Result<Self, AuthError> {
        let encoding = EncodingKey::from_ed_pem(private_pem.as_bytes())
            .map_err(|e| AuthError::Crypto(format!("bad private key: {e}")))?;
        let decoding = DecodingKey::from_ed_pem(public_pem.as_bytes())
            .map_err(|e| AuthError::Crypto(format!("bad public key: {e}")))?;
        Ok(Self { encoding, decoding })
    }
}

impl fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenKeys").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub keys: TokenKeys,
    /// `iss` claim written and required on every token.
    pub issuer: String,
    pub access_token_lifetime_secs: u64,
    /// Must carry the same pepper as the user repository.
    pub passwords: PasswordHashing,
    pub min_password_length: usize,
}

impl AuthConfig {
    /// Default issuer, lifetime and password rules around `keys`.
    pub fn new(keys: TokenKeys) -> Self {
        Self {
            keys,
            issuer: DEFAULT_ISSUER.into(),
            access_token_lifetime_secs: DEFAULT_ACCESS_TOKEN_LIFETIME_SECS,
            passwords: PasswordHashing::default(),
            min_password_length: DEFAULT_MIN_PASSWORD_LENGTH,
        }
    }
}
