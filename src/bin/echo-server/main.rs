// Echo server - serves echo.EchoService and grpc.health.v1.Health over gRPC

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use echo_mesh::logging;
use echo_mesh::{EchoHandler, IdentityResolver, Listener, ServerConfig, SERVER_VERSION};

#[derive(Parser, Debug)]
#[command(name = "echo-server")]
#[command(version = SERVER_VERSION)]
#[command(about = "gRPC Echo server with health checking", long_about = None)]
struct Cli {
    /// Path to config file (json, json5, yaml or toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listening port (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Serve over TLS using the configured certificate and key
    #[arg(long)]
    tls: bool,

    /// Server certificate path
    #[arg(long)]
    cert: Option<String>,

    /// Server private key path
    #[arg(long)]
    key: Option<String>,
}

impl Cli {
    fn apply(&self, config: &mut ServerConfig) {
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if self.tls {
            config.listener.encrypted = true;
        }
        if let Some(ref cert) = self.cert {
            config.listener.cert_path = cert.clone();
        }
        if let Some(ref key) = self.key {
            config.listener.key_path = key.clone();
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ServerConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    logging::init(&config.log);

    tracing::info!("Echo Server Version {}", SERVER_VERSION);
    tracing::info!(
        "Starting on port: {}, ssl: {}",
        config.listener.port,
        config.listener.encrypted
    );

    let listener = Listener::bind(&config.listener)
        .await
        .context("Failed to listen")?;
    let echo = EchoHandler::new(IdentityResolver::new(config.identity.clone()));

    listener
        .serve(echo, shutdown_signal())
        .await
        .context("Failed to start server")?;

    Ok(())
}
