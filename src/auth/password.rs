use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use std::sync::Arc;
use tracing::error;

use crate::{auth::error::HashError, config::HashConfig};

/// Argon2id hasher with a configurable work factor.
///
/// Verification reads the parameters embedded in the stored PHC string, so
/// hashes created under an older work factor keep verifying.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    // hash of a fixed password under the current params, verified against
    // when there is no stored hash so both login rejections cost the same
    dummy_hash: Arc<str>,
}

impl PasswordHasher {
    pub fn new(cfg: HashConfig) -> Result<Self, HashError> {
        let params = Params::new(cfg.memory_kib, cfg.iterations, cfg.parallelism, None)
            .map_err(|e| HashError::Hashing(e.to_string()))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let salt = SaltString::generate(&mut OsRng);
        let dummy_hash = argon2
            .hash_password(b"keyward-dummy-password", &salt)
            .map_err(|e| HashError::Hashing(e.to_string()))?
            .to_string();
        Ok(Self {
            argon2,
            dummy_hash: dummy_hash.into(),
        })
    }

    pub fn hash(&self, plain: &str) -> Result<String, HashError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                HashError::Hashing(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }

    /// Constant-time check of `plain` against a stored PHC hash.
    pub fn verify(&self, plain: &str, hash: &str) -> Result<bool, HashError> {
        let parsed = PasswordHash::new(hash).map_err(|e| {
            error!(error = %e, "argon2 parse hash error");
            HashError::MalformedHash(e.to_string())
        })?;
        Ok(self
            .argon2
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok())
    }

    /// Runs a full verification against the dummy hash and discards the
    /// outcome.
    pub fn verify_dummy(&self, plain: &str) {
        let _ = self.verify(plain, &self.dummy_hash);
    }
}
