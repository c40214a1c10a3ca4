//! Stop signal for the accept loop.
//!
//! Only `HttpServer::run` listens. Handlers already spawned are not told;
//! they finish their single request and release their slots on their own.

use tokio::sync::broadcast;

/// Cloneable trigger shared by the signal task and tests.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Receiver to hand to `HttpServer::run`.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Stop accepting. Calling it with nobody subscribed does nothing.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Accept loops that have not exited yet.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
