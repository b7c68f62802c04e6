use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use notes_gateway::server;
use notes_gateway::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Configuration first so the log level can come from the settings file
    let config = notes_core::Config::load()?;

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.settings.logging.level.as_str().into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Configuration loaded (environment: {}, store: {})",
        config.settings.gateway.environment,
        config.data_file().display()
    );

    let state = Arc::new(AppState::from_config(&config));
    info!("Notes store ready");

    server::run(state, &config.bind_addr()).await?;

    info!("Shutdown complete");
    Ok(())
}
