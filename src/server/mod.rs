//! HTTP server for wilder
//!
//! Loads the dataset once at startup (a load failure is fatal to boot) and
//! serves the REST API plus the static front-end.

pub mod routes;
pub mod state;

use crate::config::Config;
use crate::error::Result;
use crate::session::Session;
use routes::create_router;
use state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Start the HTTP server
///
/// # Arguments
/// * `config` - Server configuration
///
/// # Returns
/// Never returns unless the server shuts down
pub async fn run(config: Config) -> Result<()> {
    let addr = config.server_addr();
    run_on(&addr, config).await
}

/// Start the HTTP server with a specific address
///
/// Useful for tests or when you want to override config
pub async fn run_on(addr: &str, config: Config) -> Result<()> {
    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| crate::error::Error::Server(format!("Invalid server address: {}", e)))?;

    // Dataset fetch failure is fatal to boot and surfaced to the user
    let session = Session::from_config(&config)?;
    info!(
        region = %session.region.name,
        species = session.species.len(),
        "session ready"
    );

    let state = Arc::new(AppState::new(config, session));
    let app = create_router(state);

    info!("Starting server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| crate::error::Error::Server(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| crate::error::Error::Server(format!("Server error: {}", e)))?;

    Ok(())
}
