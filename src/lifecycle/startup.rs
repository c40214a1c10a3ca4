//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize metrics once the runtime is up
//! - Bind the listener (fatal on failure)
//! - Wire signals to shutdown and run the server
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when ready)

use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::net::ListenerError;
use crate::observability::metrics;

/// Run the server with a validated configuration until a shutdown signal.
pub async fn run(config: ServerConfig) -> Result<(), ListenerError> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(config.listener.socket_address())
        .await
        .map_err(ListenerError::Bind)?;
    let addr = listener.local_addr().map_err(ListenerError::Bind)?;
    tracing::info!(address = %addr, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let _signals = signals::spawn_signal_handler(shutdown);

    HttpServer::new(config).run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
