//! Marquee Server - standalone entry point
//!
//! Thin wrapper around `marquee-api` to provide a runnable binary for
//! deployments without modifying the library crate.

use anyhow::Result;
use marquee_api::{MarqueeServer, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    marquee_api::server::init_tracing();

    tracing::info!("starting marquee server");

    // Some platforms hand out the listen port as $PORT
    if let Ok(port) = std::env::var("PORT") {
        if std::env::var("MARQUEE_PORT").is_err() {
            std::env::set_var("MARQUEE_PORT", port);
        }
    }

    let config = ServerConfig::from_env();

    let server = MarqueeServer::new(config).await.map_err(|e| {
        tracing::error!("failed to initialize server: {}", e);
        e
    })?;

    server.run().await.map_err(|e| {
        tracing::error!("server error: {}", e);
        e
    })?;

    Ok(())
}
