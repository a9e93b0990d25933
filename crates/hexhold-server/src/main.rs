//! Hexhold Multiplayer Server
//!
//! Authoritative game server relaying state mutations to every peer.

use tracing::info;

use hexhold_server::{GameServer, ServerConfig};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("hexhold_server=info")
        .init();

    let config = ServerConfig::default();

    let server = match GameServer::bind(&config).await {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", config.bind_address, e);
            std::process::exit(1);
        }
    };

    info!("Hexhold Server v{}", env!("CARGO_PKG_VERSION"));
    info!("Listening on {}", config.bind_address);

    server.run().await;
}
