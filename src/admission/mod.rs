//! Admission control subsystem.
//!
//! # Data Flow
//! ```text
//! Listener accepts a TCP connection
//!     → slots.rs (take a global slot, waiting if none are free)
//!     → spawn connection task
//!     → clients.rs (check + increment the client's count, or reject)
//!     → serve / reject
//!     → drop ClientPermit (client count -1)
//!     → drop GlobalSlot (slot back to the pool)
//! ```
//!
//! # Design Decisions
//! - Global limit applies backpressure: acquisition waits, never rejects
//! - Per-client limit rejects immediately with 429
//! - Both resources are RAII guards so release cannot be skipped
//! - The client table is private; only atomic admit/release is exposed

pub mod clients;
pub mod slots;

use std::sync::Arc;

pub use clients::{AdmissionDecision, ClientKey, ClientPermit, ClientTable};
pub use slots::{AdmissionError, GlobalSlot, GlobalSlotPool};

use crate::config::LimitsConfig;

/// Shared coordination object owning both connection limits.
///
/// Cheap to clone; clones share the same pool and table.
#[derive(Debug, Clone)]
pub struct AdmissionController {
    slots: GlobalSlotPool,
    clients: Arc<ClientTable>,
}

impl AdmissionController {
    pub fn new(limits: &LimitsConfig) -> Self {
        Self {
            slots: GlobalSlotPool::new(limits.max_total),
            clients: Arc::new(ClientTable::new(limits.max_per_client)),
        }
    }

    /// Take one global slot, waiting as long as necessary.
    pub async fn acquire_global_slot(&self) -> Result<GlobalSlot, AdmissionError> {
        self.slots.acquire().await
    }

    /// Atomically check and increment the count for `key`.
    pub fn try_admit_client(&self, key: &ClientKey) -> AdmissionDecision {
        self.clients.try_admit(key)
    }

    /// Connections currently holding a global slot.
    pub fn active_connections(&self) -> usize {
        self.slots.in_use()
    }

    pub fn available_slots(&self) -> usize {
        self.slots.available()
    }

    /// Active connections attributed to `key`.
    pub fn client_connections(&self, key: &ClientKey) -> usize {
        self.clients.active(key)
    }

    pub fn tracked_clients(&self) -> usize {
        self.clients.tracked_clients()
    }

    pub fn max_total(&self) -> usize {
        self.slots.capacity()
    }

    pub fn max_per_client(&self) -> usize {
        self.clients.max_per_client()
    }
}
