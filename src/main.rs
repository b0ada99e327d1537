//! # Chat Core
//!
//! Server entry point. Initializes:
//! - Tracing/logging subsystem
//! - Configuration loading
//! - The configured storage backend
//! - HTTP server

use anyhow::Result;
use tracing::info;

use chat_core::config::Settings;
use chat_core::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for structured logging
    chat_core::telemetry::init_tracing();

    info!("Starting Chat Core...");

    // Load configuration from environment and config files
    let settings = Settings::load()?;
    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        environment = %settings.environment,
        storage = ?settings.storage.backend,
        "Configuration loaded"
    );

    let application = Application::build(settings).await?;

    info!("Server ready to accept connections");
    application.run_until_stopped().await?;

    Ok(())
}
