//! Incident manager service binary.
//!
//! Standalone HTTP service receiving Slack slash commands and interactions.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use incident::Coordinator;
use integrations::{collaborators, config::Config, server};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive("incident_manager=info".parse()?)
                .add_directive("integrations=info".parse()?)
                .add_directive("incident=info".parse()?),
        )
        .init();

    info!("Starting incident manager...");

    let config = Config::from_env().context("Invalid configuration")?;
    info!(
        slack_org = %config.slack_org,
        channel_prefix = %config.channel_prefix,
        notify_channels = config.notify_channel_ids.len(),
        "Configuration loaded"
    );

    let collaborators =
        collaborators(&config).context("Failed to create platform clients")?;
    let coordinator = Coordinator::new(config.workflow_settings(), collaborators);

    let port = config.port;
    let state = server::AppState {
        config: Arc::new(config),
        coordinator: Arc::new(coordinator),
    };

    let app = server::build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(port, "Incident manager listening");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
