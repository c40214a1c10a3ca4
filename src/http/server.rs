//! HTTP server accept loop.
//!
//! # Responsibilities
//! - Own the admission controller and handler context
//! - Accept connections through the bounded listener
//! - Spawn one task per connection
//! - Stop accepting on shutdown
//!
//! # Design Decisions
//! - The loop is the only place that acquires global slots
//! - Shutdown closes the listening socket but does not wait for or cancel
//!   connection tasks already running

use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::Instrument;

use crate::admission::AdmissionController;
use crate::config::ServerConfig;
use crate::http::handler::{handle_connection, HandlerContext};
use crate::net::{ConnectionInfo, Listener, ListenerError};

/// Static file server with connection admission control.
pub struct HttpServer {
    context: Arc<HandlerContext>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServerConfig) -> Self {
        let admission = AdmissionController::new(&config.limits);
        let context = Arc::new(HandlerContext::from_config(&config, admission));
        Self { context }
    }

    /// Handle on the shared admission state.
    pub fn admission(&self) -> &AdmissionController {
        &self.context.admission
    }

    /// Run the accept loop until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ListenerError> {
        let listener = Listener::from_tcp(listener, self.context.admission.clone())?;
        let addr = listener.local_addr().map_err(ListenerError::Bind)?;
        tracing::info!(
            address = %addr,
            document_root = %self.context.files.root().display(),
            "HTTP server starting"
        );

        loop {
            let accepted = tokio::select! {
                accepted = listener.accept() => accepted,
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown requested, no longer accepting connections");
                    break;
                }
            };

            match accepted {
                Ok((stream, peer, slot)) => {
                    let info = ConnectionInfo::new(peer);
                    let context = Arc::clone(&self.context);
                    let span = info.span();
                    tokio::spawn(
                        async move {
                            let outcome = handle_connection(stream, &context, slot).await;
                            tracing::trace!(
                                outcome = outcome.as_str(),
                                elapsed_ms = info.accepted_at.elapsed().as_millis() as u64,
                                "Connection closed"
                            );
                        }
                        .instrument(span),
                    );
                }
                Err(ListenerError::Accept(e)) => {
                    tracing::warn!(error = %e, "Failed to accept connection");
                }
                Err(e) => return Err(e),
            }
        }

        drop(listener);
        tracing::info!(
            in_flight = self.context.admission.active_connections(),
            "HTTP server stopped"
        );
        Ok(())
    }
}
