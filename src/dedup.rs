//! Bounded record of recently processed event identities.

use std::collections::{HashSet, VecDeque};

use crate::types::EventId;

/// Default ceiling on remembered identities.
pub const DEFAULT_CAPACITY: usize = 50_000;

/// Fixed-capacity set of recently seen [`EventId`]s.
///
/// Insertion order is tracked so that reaching capacity evicts the
/// oldest identity rather than dropping the whole set; a duplicate
/// delivery is therefore only reprocessed once its original falls out
/// of the retention window, never because of a wholesale reset.
///
/// Mutated only by the single stream consumer, so no synchronization.
#[derive(Debug)]
pub struct SeenCache {
    capacity: usize,
    order: VecDeque<EventId>,
    seen: HashSet<EventId>,
}

impl SeenCache {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "SeenCache capacity must be non-zero");
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            seen: HashSet::with_capacity(capacity),
        }
    }

    pub fn contains(&self, id: &EventId) -> bool {
        self.seen.contains(id)
    }

    /// Record an identity, evicting the oldest one at capacity.
    ///
    /// Returns `false` if the identity was already present (nothing is
    /// evicted in that case).
    pub fn insert(&mut self, id: EventId) -> bool {
        if !self.seen.insert(id) {
            return false;
        }
        if self.order.len() == self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }
        self.order.push_back(id);
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for SeenCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
