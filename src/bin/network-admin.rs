use anyhow::Result;
use clap::Parser;
use network_service::admin_cli::{handle_admin_command, AdminCli};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_target(false)
        .without_time()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    handle_admin_command(AdminCli::parse()).await
}
