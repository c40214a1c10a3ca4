//! Global connection slots.
//!
//! # Responsibilities
//! - Bound the number of simultaneously admitted connections
//! - Block (never fail) when capacity is exhausted
//! - Return the slot to the pool on every exit path
//!
//! # Design Decisions
//! - Backed by a Tokio semaphore, so acquire/release need no extra lock
//! - A slot is an RAII guard: dropping it is the release

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::observability::metrics;

/// Errors raised by the admission subsystem.
#[derive(Debug, Error)]
pub enum AdmissionError {
    /// The slot pool was closed while waiting for capacity.
    #[error("global slot pool is closed")]
    Closed,
}

/// A counting pool of `max_total` connection slots.
#[derive(Debug, Clone)]
pub struct GlobalSlotPool {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl GlobalSlotPool {
    /// Create a pool with `capacity` slots, all free.
    pub fn new(capacity: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Wait until a slot is free and take it.
    ///
    /// Waiters are served in FIFO order by the underlying semaphore.
    pub async fn acquire(&self) -> Result<GlobalSlot, AdmissionError> {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| AdmissionError::Closed)?;

        metrics::set_active_connections(self.in_use());

        Ok(GlobalSlot {
            permit: Some(permit),
            pool: self.clone(),
        })
    }

    /// Number of free slots.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Number of slots currently held.
    pub fn in_use(&self) -> usize {
        self.capacity.saturating_sub(self.available())
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// One unit of global capacity, held for a connection's lifetime.
///
/// The slot goes back to the pool when this guard is dropped, including
/// during unwinding of a panicking connection task.
#[derive(Debug)]
#[must_use = "dropping a GlobalSlot releases it immediately"]
pub struct GlobalSlot {
    permit: Option<OwnedSemaphorePermit>,
    pool: GlobalSlotPool,
}

impl GlobalSlot {
    /// Give the slot back to the pool.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for GlobalSlot {
    fn drop(&mut self) {
        drop(self.permit.take());
        metrics::set_active_connections(self.pool.in_use());
    }
}
