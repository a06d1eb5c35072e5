/// MCP Server Entry Point
///
/// Reads configuration from the environment (see `core::config`), builds the
/// tool registry, and starts the selected transports.

mod core;
mod tools;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::core::config::{ServerConfig, TransportMode};
use crate::core::dispatcher::{Dispatcher, ServerInfo};
use crate::core::server;
use crate::tools::save_conversation::ArchiveClient;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Logs go to stderr; stdout is reserved for the STDIO transport
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let archive = ArchiveClient::new(&config.archive_base_url).map_err(std::io::Error::other)?;
    let dispatcher = Dispatcher::new(
        ServerInfo {
            name: config.name.clone(),
            version: config.version.clone(),
        },
        tools::register_all(archive),
    );

    match config.transport {
        TransportMode::Stdio => server::run_server_stdio(dispatcher).await,
        TransportMode::Http => server::run_server_http(&config, dispatcher).await,
        TransportMode::Both => {
            // STDIO runs in the background; the HTTP server owns the process lifetime
            let stdio_dispatcher = dispatcher.clone();
            let stdio_handle = tokio::spawn(async move {
                if let Err(e) = server::run_server_stdio(stdio_dispatcher).await {
                    error!("STDIO server error: {}", e);
                }
                info!("STDIO transport closed");
            });

            let http_result = server::run_server_http(&config, dispatcher).await;
            stdio_handle.abort();
            http_result
        }
    }
}
