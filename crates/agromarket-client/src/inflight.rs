//! Per-target in-flight mutation registry.
//!
//! [`InFlightRegistry`] allows at most one unresolved mutation per UI target.
//! A second mutation for a busy target is refused up front instead of being
//! queued, so its optimistic change is never applied and it can never roll
//! back over the newer state of the first.

use std::fmt;
use std::time::Instant;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::request::MutationId;

/// Identity of a logical UI target, e.g. `cart-item:42` or `follow:7`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetKey(String);

impl TargetKey {
    pub fn new(key: impl Into<String>) -> Self {
        TargetKey(key.into())
    }

    /// Builds `<kind>:<id>`.
    pub fn scoped(kind: &str, id: impl fmt::Display) -> Self {
        TargetKey(format!("{}:{}", kind, id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bookkeeping for a target that has a mutation in flight.
#[derive(Debug, Clone)]
pub struct InFlightEntry {
    pub mutation_id: MutationId,
    pub started_at: Instant,
}

/// Registry of targets with an unresolved mutation.
#[derive(Debug, Default)]
pub struct InFlightRegistry {
    targets: DashMap<TargetKey, InFlightEntry>,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `target` for `mutation_id`.
    ///
    /// Returns the holder's entry when the target is already claimed. The
    /// claim is released when the returned [`InFlightClaim`] is dropped.
    pub fn try_claim(
        &self,
        target: &TargetKey,
        mutation_id: MutationId,
    ) -> Result<InFlightClaim<'_>, InFlightEntry> {
        match self.targets.entry(target.clone()) {
            Entry::Occupied(held) => Err(held.get().clone()),
            Entry::Vacant(slot) => {
                slot.insert(InFlightEntry {
                    mutation_id,
                    started_at: Instant::now(),
                });
                Ok(InFlightClaim {
                    registry: self,
                    target: target.clone(),
                    mutation_id,
                })
            }
        }
    }

    pub fn is_busy(&self, target: &TargetKey) -> bool {
        self.targets.contains_key(target)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    fn release(&self, target: &TargetKey, mutation_id: MutationId) {
        self.targets
            .remove_if(target, |_, entry| entry.mutation_id == mutation_id);
    }
}

/// Exclusive claim on a target. Released on drop.
#[derive(Debug)]
pub struct InFlightClaim<'a> {
    registry: &'a InFlightRegistry,
    target: TargetKey,
    mutation_id: MutationId,
}

impl InFlightClaim<'_> {
    pub fn target(&self) -> &TargetKey {
        &self.target
    }
}

impl Drop for InFlightClaim<'_> {
    fn drop(&mut self) {
        self.registry.release(&self.target, self.mutation_id);
    }
}
