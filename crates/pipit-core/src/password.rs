//! Argon2id password hashing, shared by account storage and login.
//!
//! Every stored hash uses m=19456 KiB, t=2, p=1 in PHC string form. The
//! optional pepper is fed to Argon2 as its secret input, so it is never
//! part of the stored string and a hash made with one pepper does not
//! verify under another.

use std::fmt;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHasher, PasswordVerifier, Version};

use crate::error::{PipitError, PipitResult};

const MEMORY_KIB: u32 = 19_456;
const ITERATIONS: u32 = 2;
const LANES: u32 = 1;

#[derive(Clone, Default)]
pub struct PasswordHashing {
    pepper: Option<Vec<u8>>,
}

impl fmt::Debug for PasswordHashing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHashing")
            .field("peppered", &self.pepper.is_some())
            .finish()
    }
}

impl PasswordHashing {
    pub fn new(pepper: Option<String>) -> Self {
        Self {
            pepper: pepper.map(String::into_bytes),
        }
    }

    fn engine(&self) -> PipitResult<Argon2<'_>> {
        let params = Params::new(MEMORY_KIB, ITERATIONS, LANES, None).map_err(crypto)?;
        match &self.pepper {
            Some(secret) => {
                Argon2::new_with_secret(secret, Algorithm::Argon2id, Version::V0x13, params)
                    .map_err(crypto)
            }
            None => Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params)),
        }
    }

    /// Hash with a fresh random salt.
    pub fn hash(&self, password: &str) -> PipitResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.engine()?
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(crypto)
    }

    /// `Ok(false)` on mismatch; `Crypto` if `stored` is not a PHC string.
    pub fn verify(&self, password: &str, stored: &str) -> PipitResult<bool> {
        let parsed = PasswordHash::new(stored)
            .map_err(|e| PipitError::Crypto(format!("invalid hash format: {e}")))?;

        match self.engine()?.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(crypto(e)),
        }
    }
}

fn crypto(err: impl fmt::Display) -> PipitError {
    PipitError::Crypto(err.to_string())
}
