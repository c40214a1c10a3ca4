//! Per-connection bookkeeping attached when the listener hands over a socket.
//!
//! Every log line a handler emits sits inside the `connection` span built
//! here, so a 429 or a dropped request can be traced back to one peer.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

static NEXT_CONNECTION: AtomicU64 = AtomicU64::new(1);

/// Sequence number of an accepted socket, shown as `conn-N` in logs.
///
/// Unrelated to the `session_id` cookie: one client session usually spans
/// many connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new() -> Self {
        Self(NEXT_CONNECTION.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Captured after the global slot is granted, so `accepted_at` marks the
/// start of service rather than the TCP handshake.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionInfo {
    pub id: ConnectionId,
    pub peer: SocketAddr,
    pub accepted_at: Instant,
}

impl ConnectionInfo {
    pub fn new(peer: SocketAddr) -> Self {
        Self {
            id: ConnectionId::new(),
            peer,
            accepted_at: Instant::now(),
        }
    }

    /// Span the handler task is instrumented with.
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!("connection", id = %self.id, peer = %self.peer)
    }
}
