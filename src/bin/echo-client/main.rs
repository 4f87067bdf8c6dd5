// Echo client - HTTP gateway forwarding ?name=... to the Echo service

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use echo_mesh::logging;
use echo_mesh::{ClientConfig, Gateway, TransportChannel};

#[derive(Parser, Debug)]
#[command(name = "echo-client")]
#[command(version)]
#[command(about = "HTTP gateway in front of the gRPC Echo service", long_about = None)]
struct Cli {
    /// Path to config file (json, json5, yaml or toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Echo server address (overrides ECHO_HOST)
    #[arg(short, long)]
    target: Option<String>,

    /// HTTP port (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Connect to the server over TLS
    #[arg(long)]
    tls: bool,

    /// Trust anchor (CA certificate) used to verify the server
    #[arg(long)]
    ca: Option<String>,
}

impl Cli {
    fn apply(&self, config: &mut ClientConfig) {
        if let Some(ref target) = self.target {
            config.channel.target = target.clone();
        }
        if let Some(port) = self.port {
            config.gateway.port = port;
        }
        if self.tls {
            config.channel.encrypted = true;
        }
        if let Some(ref ca) = self.ca {
            config.channel.trust_anchor = Some(ca.clone());
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

    let mut config = ClientConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    logging::init(&config.log);

    tracing::info!("Echo Client {}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Echo Client connecting to {}", config.channel.target);

    let channel = TransportChannel::open(&config.channel)
        .await
        .context("Failed to connect to the server")?;
    let gateway = Gateway::new(&channel, &config.gateway);

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to listen on {}", addr))?;
    tracing::info!("Listening to port: {}", config.gateway.port);

    gateway
        .serve(listener, shutdown_signal())
        .await
        .context("HTTP server failed")?;

    Ok(())
}
