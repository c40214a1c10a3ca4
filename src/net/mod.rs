//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept, then take a global slot)
//!     → connection.rs (ID + span for tracing)
//!     → Hand off to the HTTP connection handler
//! ```
//!
//! # Design Decisions
//! - Bounded admission prevents resource exhaustion
//! - No read timeouts: a silent peer keeps its slot until it disconnects

pub mod connection;
pub mod listener;

pub use connection::{ConnectionId, ConnectionInfo};
pub use listener::{Listener, ListenerError};
