//! TCP listener implementation with backpressure.
//!
//! # Responsibilities
//! - Accept incoming TCP connections
//! - Take a global admission slot for each accepted connection
//!
//! # Design Decisions
//! - Accept first, then wait for a slot: while the pool is exhausted the
//!   loop stops calling accept and new peers queue in the OS backlog
//! - Slot acquisition waits; it never rejects

use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};

use crate::admission::{AdmissionController, AdmissionError, GlobalSlot};

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("Failed to bind: {0}")]
    Bind(#[source] std::io::Error),

    #[error("Failed to accept: {0}")]
    Accept(#[source] std::io::Error),

    #[error(transparent)]
    Admission(#[from] AdmissionError),
}

/// A TCP listener whose accepted connections each hold a global slot.
pub struct Listener {
    inner: TcpListener,
    admission: AdmissionController,
}

impl Listener {
    /// Wrap an already bound listener.
    pub fn from_tcp(listener: TcpListener, admission: AdmissionController) -> Result<Self, ListenerError> {
        let local_addr = listener.local_addr().map_err(ListenerError::Bind)?;

        tracing::info!(
            address = %local_addr,
            max_total = admission.max_total(),
            max_per_client = admission.max_per_client(),
            "Listener bound"
        );

        Ok(Self {
            inner: listener,
            admission,
        })
    }

    /// Accept a connection, then wait for a global slot.
    ///
    /// The returned slot must live as long as the connection.
    pub async fn accept(&self) -> Result<(TcpStream, SocketAddr, GlobalSlot), ListenerError> {
        let (stream, addr) = self.inner.accept().await.map_err(ListenerError::Accept)?;

        if self.admission.available_slots() == 0 {
            tracing::debug!(peer_addr = %addr, "Global capacity exhausted, waiting for a slot");
        }
        let slot = self.admission.acquire_global_slot().await?;

        tracing::debug!(
            peer_addr = %addr,
            available_slots = self.admission.available_slots(),
            "Connection accepted"
        );

        Ok((stream, addr, slot))
    }

    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.inner.local_addr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LimitsConfig;
    use std::time::Duration;

    #[tokio::test]
    async fn accept_waits_for_free_slot() {
        let admission = AdmissionController::new(&LimitsConfig {
            max_per_client: 1,
            max_total: 1,
        });
        let tcp = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let listener = Listener::from_tcp(tcp, admission.clone()).unwrap();
        let addr = listener.local_addr().unwrap();

        let _c1 = TcpStream::connect(addr).await.unwrap();
        let (_s1, _, slot) = listener.accept().await.unwrap();
        assert_eq!(admission.available_slots(), 0);

        let _c2 = TcpStream::connect(addr).await.unwrap();
        let blocked = tokio::time::timeout(Duration::from_millis(100), listener.accept()).await;
        assert!(blocked.is_err(), "accept must wait while capacity is exhausted");

        // The timed-out accept took c2 off the backlog and dropped it.
        drop(slot);
        let _c3 = TcpStream::connect(addr).await.unwrap();
        let second = tokio::time::timeout(Duration::from_secs(2), listener.accept()).await;
        assert!(second.expect("slot freed").is_ok());
    }
}
