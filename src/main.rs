//! Toolgate gateway - main entry point.
//!
//! Builds the API client, capability table, and dispatcher once, then runs
//! the selected transport binding.

use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::sync::Arc;

use toolgate::backend::http::{build_capability_table, ApiClient};
use toolgate::dispatch::Dispatcher;
use toolgate::transport::{stdio, SseServer};
use toolgate::types::{ApiConfig, SseConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TransportMode {
    /// Single co-located peer over stdin/stdout.
    Stdio,
    /// Multiple network peers over HTTP event streams.
    Sse,
}

#[derive(Debug, Parser)]
#[command(name = "toolgate", version, about = "MCP gateway for an external resource API")]
struct Cli {
    /// Transport binding to serve.
    #[arg(long, value_enum, default_value_t = TransportMode::Stdio)]
    transport: TransportMode,

    /// Bearer token for the backend API.
    #[arg(long, env = "TOOLGATE_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Backend API base URL override.
    #[arg(long, env = "TOOLGATE_API_HOST")]
    api_host: Option<String>,

    /// Listen address for the SSE transport.
    #[arg(long, env = "TOOLGATE_LISTEN", default_value = "127.0.0.1:8808")]
    listen: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Configuration problems exit here, before any transport binding opens.
    let cli = Cli::parse();

    toolgate::observability::init_tracing();

    let mut api_config = ApiConfig {
        api_key: cli.api_key,
        ..Default::default()
    };
    if let Some(host) = cli.api_host {
        api_config.base_url = host;
    }

    let client = Arc::new(ApiClient::new(&api_config)?);
    let table = build_capability_table(client);
    let dispatcher = Arc::new(Dispatcher::new(table));

    tracing::info!(
        tools = dispatcher.descriptors().len(),
        "gateway initialized"
    );

    match cli.transport {
        TransportMode::Stdio => {
            stdio::serve(dispatcher).await?;
        }
        TransportMode::Sse => {
            let server = Arc::new(SseServer::new(dispatcher, cli.listen, SseConfig::default()));

            // Ctrl-C requests graceful shutdown.
            let shutdown_handle = server.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("shutdown signal received");
                    shutdown_handle.shutdown();
                }
            });

            server.serve().await?;
        }
    }

    Ok(())
}
