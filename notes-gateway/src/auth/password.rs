//! Argon2id credential digests.
//!
//! New digests are always Argon2id. Stores carried over from the older
//! deployment hold bcrypt digests (`$2a$`, `$2b$`, `$2y$`), which still verify.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::error::{ApiError, ApiResult};

/// Hashes and checks passwords off the async worker threads.
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    params: Params,
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl CredentialHasher {
    /// Custom cost; tests use the minimum to stay fast.
    pub fn with_cost(memory_kib: u32, iterations: u32) -> Result<Self, argon2::Error> {
        Ok(Self {
            params: Params::new(memory_kib, iterations, 1, None)?,
        })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Produce a salted PHC-format digest of `password`.
    pub async fn hash(&self, password: String) -> ApiResult<String> {
        let argon2 = self.argon2();
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon2
                .hash_password(password.as_bytes(), &salt)
                .map(|digest| digest.to_string())
                .map_err(ApiError::internal)
        })
        .await
        .map_err(ApiError::internal)?
    }

    /// Check `password` against a stored digest. Unparsable digests never match.
    pub async fn verify(&self, password: String, digest: String) -> bool {
        let argon2 = self.argon2();
        let outcome = tokio::task::spawn_blocking(move || {
            if is_bcrypt(&digest) {
                return bcrypt::verify(&password, &digest).unwrap_or(false);
            }
            let Ok(parsed) = PasswordHash::new(&digest) else {
                return false;
            };
            argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .await;

        match outcome {
            Ok(matched) => matched,
            Err(e) => {
                tracing::error!("Password verification task failed: {}", e);
                false
            }
        }
    }
}

fn is_bcrypt(digest: &str) -> bool {
    ["$2a$", "$2b$", "$2y$"]
        .iter()
        .any(|prefix| digest.starts_with(prefix))
}
