#![deny(warnings)]
#![deny(clippy::unwrap_used)]

use std::sync::Arc;

use dotenv::dotenv;
use poem_mcpserver::McpServer;
use tracing::info;

use slurm_mcp::mcp::{ClusterConfig, ConnectionManager, SlurmTools};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    // Logging goes to stderr: stdout carries the MCP framing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("info".parse().expect("valid directive")),
        )
        .init();

    let config = Arc::new(ClusterConfig::from_env()?);
    info!(
        "Starting SLURM MCP server for {}@{}:{}",
        config.username, config.host, config.port
    );

    let manager = Arc::new(ConnectionManager::new(config));
    poem_mcpserver::stdio::stdio(McpServer::new().tools(SlurmTools::new(manager))).await?;

    Ok(())
}
