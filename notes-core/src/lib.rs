pub mod config;

// Config re-exports
pub use config::{
    Config,
    ConfigError,
    GatewaySettings,
    LoggingSettings,
    Secrets,
    Settings,
    SettingsError,
    StorageSettings,
};
