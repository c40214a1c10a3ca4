//! Per-client active connection accounting.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::observability::metrics;

/// Opaque identifier that groups connections belonging to one client.
///
/// Comes from the `session_id` cookie or is minted for a new client.
/// It is not authenticated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientKey(String);

impl ClientKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of checking a client against its connection limit.
#[derive(Debug)]
#[must_use = "an admitted client is released when the permit is dropped"]
pub enum AdmissionDecision {
    /// Count was incremented; the permit decrements it on drop.
    Admitted(ClientPermit),
    /// The client is at its limit. Nothing was changed.
    Rejected { active: usize },
}

impl AdmissionDecision {
    pub fn is_admitted(&self) -> bool {
        matches!(self, AdmissionDecision::Admitted(_))
    }
}

/// Table of active connection counts keyed by client.
///
/// A single mutex guards the whole map so that check and increment in
/// [`ClientTable::try_admit`] happen as one step. Entries stay in the map at
/// zero once a client has gone quiet; nothing expires them.
#[derive(Debug)]
pub struct ClientTable {
    counts: Mutex<HashMap<ClientKey, usize>>,
    max_per_client: usize,
}

impl ClientTable {
    pub fn new(max_per_client: usize) -> Self {
        Self {
            counts: Mutex::new(HashMap::new()),
            max_per_client,
        }
    }

    /// Admit `key` if it holds fewer than `max_per_client` connections.
    pub fn try_admit(self: &Arc<Self>, key: &ClientKey) -> AdmissionDecision {
        let (decision, tracked) = {
            let mut counts = self.lock();
            let tracked_before = counts.len();
            let count = counts.entry(key.clone()).or_insert(0);

            let decision = if *count < self.max_per_client {
                *count += 1;
                AdmissionDecision::Admitted(ClientPermit {
                    table: Arc::clone(self),
                    key: key.clone(),
                })
            } else {
                AdmissionDecision::Rejected { active: *count }
            };

            let tracked = counts.len();
            (decision, (tracked != tracked_before).then_some(tracked))
        };

        if let Some(tracked) = tracked {
            metrics::set_tracked_clients(tracked);
        }
        decision
    }

    /// Current active count for `key` (zero if unknown).
    pub fn active(&self, key: &ClientKey) -> usize {
        self.lock().get(key).copied().unwrap_or(0)
    }

    /// Number of keys the table has ever seen.
    pub fn tracked_clients(&self) -> usize {
        self.lock().len()
    }

    pub fn max_per_client(&self) -> usize {
        self.max_per_client
    }

    fn release(&self, key: &ClientKey) {
        let mut counts = self.lock();
        match counts.get_mut(key) {
            Some(count) if *count > 0 => *count -= 1,
            Some(_) => {
                tracing::error!(client = %key, "Client released with zero active connections");
            }
            None => {
                tracing::error!(client = %key, "Released client missing from table");
            }
        }
    }

    // The map is never left half-updated, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, HashMap<ClientKey, usize>> {
        self.counts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Proof that a client was admitted. Dropping it releases the client.
#[derive(Debug)]
pub struct ClientPermit {
    table: Arc<ClientTable>,
    key: ClientKey,
}

impl Drop for ClientPermit {
    fn drop(&mut self) {
        self.table.release(&self.key);
    }
}
