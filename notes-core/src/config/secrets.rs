//! Secrets configuration loaded from environment variables only.
//!
//! The token signing key must never be written to the settings file, so it
//! is read from the environment (or a development `.env` file).

use std::env;

/// Secrets loaded exclusively from environment variables.
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    /// Session token signing key (env: JWT_SECRET)
    pub jwt_secret: Option<String>,
}

impl Secrets {
    /// Load secrets from environment variables.
    ///
    /// This function also loads .env file if present (for development),
    /// but production should rely on actual environment variables.
    pub fn from_env() -> Self {
        // Load .env file if present (development convenience)
        let _ = dotenvy::dotenv();

        Self::from_env_inner()
    }

    /// Internal method to load from environment without loading .env
    pub(crate) fn from_env_inner() -> Self {
        Self {
            jwt_secret: non_empty_var("JWT_SECRET"),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ENV_MUTEX;

    #[test]
    fn test_jwt_secret_from_env() {
        let _lock = ENV_MUTEX.lock().unwrap();
        // SAFETY: test-scoped env mutation.
        unsafe { env::set_var("JWT_SECRET", "s3cret") }

        let secrets = Secrets::from_env_inner();
        assert_eq!(secrets.jwt_secret, Some("s3cret".to_string()));

        // SAFETY: test-scoped env mutation cleanup.
        unsafe { env::remove_var("JWT_SECRET") }
    }

    #[test]
    fn test_empty_jwt_secret_is_absent() {
        let _lock = ENV_MUTEX.lock().unwrap();
        // SAFETY: test-scoped env mutation.
        unsafe { env::set_var("JWT_SECRET", "   ") }

        let secrets = Secrets::from_env_inner();
        assert!(secrets.jwt_secret.is_none());

        // SAFETY: test-scoped env mutation cleanup.
        unsafe { env::remove_var("JWT_SECRET") }
        assert!(Secrets::from_env_inner().jwt_secret.is_none());
    }
}
