use clap::Parser;
use client::MarathonClient;
use common::MarathonApi;
use daemon::{config, server, ServiceRegistry};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the JSON service configuration
    #[arg(long)]
    config: PathBuf,

    /// Address for the status server
    #[arg(long, default_value = "127.0.0.1:3030")]
    listen: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    // Invalid configuration is fatal; no watcher starts.
    let configs = config::load(&cli.config)?;
    tracing::info!(path = %cli.config.display(), services = configs.len(), "loaded configuration");

    let cancel = CancellationToken::new();
    let (registry, watchers) = ServiceRegistry::start(
        configs,
        |config| {
            let client = MarathonClient::new(
                &config.host,
                config.user.clone(),
                config.pass.clone(),
                config.request_timeout,
            )?;
            Ok(Arc::new(client) as Arc<dyn MarathonApi>)
        },
        &cancel,
    )?;

    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("shutdown requested"),
            Err(e) => {
                tracing::warn!(error = %e, "cannot listen for ctrl-c; running until killed");
                return;
            }
        }
        shutdown.cancel();
    });

    let app = server::router(Arc::new(registry));
    let listener = tokio::net::TcpListener::bind(cli.listen).await?;
    tracing::info!(addr = %cli.listen, "status server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.clone().cancelled_owned())
        .await?;

    cancel.cancel();
    for watcher in watchers {
        if let Err(e) = watcher.await {
            tracing::warn!(error = %e, "watcher task ended abnormally");
        }
    }
    Ok(())
}
