use anyhow::Result;
use clap::Parser;

#[path = "../api/mod.rs"]
mod api;
#[path = "../shared/mod.rs"]
mod shared;

use shared::config::ServerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::parse();

    // Initialize service logging
    let _ = shared::logging::init_service_logging(&config.log_dir, "codedrop_api");

    // Run the API server
    api::rest::api::run_rest_server(config).await
}
