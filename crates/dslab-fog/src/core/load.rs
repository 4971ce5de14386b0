//! Per-slot load accounting used for soft load balancing.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::slot::SlotId;

/// Number of tasks routed to each slot during the current run.
///
/// Counters are owned by a single policy instance and must be reset at the start of every run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LoadCounters {
    counts: BTreeMap<SlotId, u64>,
}

impl LoadCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of tasks routed to the slot so far.
    pub fn get(&self, slot_id: SlotId) -> u64 {
        self.counts.get(&slot_id).copied().unwrap_or(0)
    }

    /// Records one more task routed to the slot.
    pub fn increment(&mut self, slot_id: SlotId) {
        *self.counts.entry(slot_id).or_insert(0) += 1;
    }

    /// Total number of routed tasks.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Iterates over slots with non-zero load in slot ID order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, u64)> + '_ {
        self.counts.iter().map(|(slot, count)| (*slot, *count))
    }

    pub fn reset(&mut self) {
        self.counts.clear();
    }
}
