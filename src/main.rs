mod config;
mod error;
mod executor;
mod http;
mod request;
mod server;
mod tools;

use std::sync::Arc;

use clap::Parser;
use rmcp::{transport::stdio, ServiceExt};
use tracing_subscriber::EnvFilter;

use config::{Config, Transport};
use executor::TracingSink;
use http::AppState;
use server::HostToolsServer;
use tools::ProcessEnvironment;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log))?;
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_env_filter(filter)
        .init();

    let sink = Arc::new(TracingSink);
    let env = Arc::new(ProcessEnvironment);

    match config.transport {
        Transport::Stdio => {
            tracing::info!("serving MCP tools on stdio");
            let server = HostToolsServer::new(sink, env);
            server.serve(stdio()).await?.waiting().await?;
        }
        Transport::Http => {
            let listener = tokio::net::TcpListener::bind(config.bind).await?;
            tracing::info!(addr = %listener.local_addr()?, "listening");
            let app = http::router(AppState::new(sink, env));
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
