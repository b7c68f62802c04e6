//! Configuration management for the notes organizer.
//!
//! This module separates secrets (from environment variables) from
//! settings (from a TOML file).
//!
//! # Configuration Sources
//!
//! ## Secrets (Environment Variables)
//! - `JWT_SECRET` - session token signing key
//!
//! ## Settings (TOML File)
//! Located at `~/.config/notes-organizer/config.toml`:
//! ```toml
//! [gateway]
//! host = "127.0.0.1"
//! port = 3001
//!
//! [storage]
//! data_file = "data/store.json"
//!
//! [logging]
//! level = "info"
//! ```

mod secrets;
mod settings;

use std::path::PathBuf;

pub use secrets::Secrets;
pub use settings::{GatewaySettings, LoggingSettings, Settings, SettingsError, StorageSettings};

/// Combined configuration containing both secrets and settings.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Secrets loaded from environment variables
    pub secrets: Secrets,
    /// Settings loaded from TOML configuration file
    pub settings: Settings,
}

/// Errors that can occur when loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// This loads:
    /// 1. Secrets from environment variables (and `.env`)
    /// 2. Settings from the TOML file (creating defaults if needed)
    /// 3. `PORT` / `NOTES_DATA_FILE` overrides on top of the file
    pub fn load() -> Result<Self, ConfigError> {
        let secrets = Secrets::from_env();
        let mut settings = Settings::load()?;
        settings.apply_env_overrides();

        Ok(Self { secrets, settings })
    }

    /// Get the HTTP bind address.
    pub fn bind_addr(&self) -> String {
        self.settings.bind_addr()
    }

    /// Get the token signing key (if configured).
    pub fn jwt_secret(&self) -> Option<&str> {
        self.secrets.jwt_secret.as_deref()
    }

    /// Get the store file path.
    pub fn data_file(&self) -> PathBuf {
        PathBuf::from(&self.settings.storage.data_file)
    }
}

// Serializes tests that touch process environment variables
#[cfg(test)]
pub(crate) static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
