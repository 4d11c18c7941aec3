use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;

use crate::errors::{Error, Result};

/// Turns passwords into stored credentials and checks them back
pub trait PasswordHasher {
    /// Hash `password` with a fresh salt
    fn hash(&self, password: &str) -> Result<String>;

    /// `Ok(true)` if `password` matches `hash`, `Ok(false)` if it does not.
    /// Errors only when `hash` cannot be parsed.
    fn verify(&self, password: &str, hash: &str) -> Result<bool>;
}

/// Argon2id hasher producing PHC strings
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Argon2Hasher {
            params: Params::default(),
        }
    }

    /// Hasher with the smallest cost Argon2 accepts. Only good for tests.
    pub fn insecure_fast() -> Self {
        Argon2Hasher {
            params: Params::new(Params::MIN_M_COST, Params::MIN_T_COST, Params::MIN_P_COST, None)
                .unwrap_or_default(),
        }
    }

    fn argon2(&self) -> Argon2<'_> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String> {
        let mut salt_bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut salt_bytes);
        let salt =
            SaltString::encode_b64(&salt_bytes).map_err(|e| Error::PasswordHash(e.to_string()))?;

        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| Error::PasswordHash(e.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(hash).map_err(|e| Error::PasswordHash(e.to_string()))?;

        // Cost parameters come from the PHC string, not from self
        Ok(self
            .argon2()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}
