use anyhow::{Context, Result};
use network_service::app_log;
use network_service::{start_web_server, ConfigManager};
use std::fs::OpenOptions;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE: &str = "/tmp/network-service.log";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging first
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true) // Clear file on startup
        .open(LOG_FILE)
        .with_context(|| format!("Failed to open log file {}", LOG_FILE))?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_writer(file)
                .with_current_span(false)
                .with_span_list(false),
        )
        .with(fmt::layer().with_target(false))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,rocket::server=off,sqlx=warn")),
        )
        .init();

    let config = ConfigManager::load()?;

    app_log!(info, "Starting network service");
    app_log!(info, "Environment: {}", config.environment_name);
    app_log!(info, "Database: {}", config.environment.database_path.display());

    start_web_server(config).await
}
