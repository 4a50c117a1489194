use anyhow::Context;
use postit_server::{Config, serve};
use postit_std::SystemEnv;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load(&SystemEnv).context("failed to load configuration")?;
    tracing::debug!(?config, "Configuration loaded");

    serve(config).await.context("postit server failed")?;

    Ok(())
}
