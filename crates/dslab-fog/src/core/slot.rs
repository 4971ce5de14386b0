//! Execution slots and the slot catalog.

use serde::{Deserialize, Serialize};

use crate::core::tier::Tier;

pub type SlotId = u32;

/// Resource demand of an execution slot (what has to be reserved on a host).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlotDemand {
    pub cores: u32,
    /// Compute rate per core in MIPS.
    pub compute_rate: f64,
    /// Memory in MB.
    pub memory: u64,
    pub bandwidth: u64,
    /// Storage in MB.
    pub storage: u64,
}

impl SlotDemand {
    /// Compute rate required from a host, i.e. per-core rate multiplied by the number of cores.
    pub fn total_compute_rate(&self) -> f64 {
        self.compute_rate * self.cores as f64
    }
}

/// Abstract execution context (historically a VM) bound to a single host while active.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceSlot {
    pub id: SlotId,
    pub tier: Tier,
    pub demand: SlotDemand,
    /// Declared energy figure of the slot used by energy-aware placement.
    pub energy: f64,
}

impl ResourceSlot {
    pub fn compute_rate(&self) -> f64 {
        self.demand.compute_rate
    }
}

/// Static list of execution slots available during a scenario run.
///
/// Slot IDs are assigned densely in insertion order, so lookups by ID are plain indexing.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SlotCatalog {
    slots: Vec<ResourceSlot>,
}

impl SlotCatalog {
    /// Creates empty catalog.
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Adds slot of the given tier and returns its ID.
    pub fn add_slot(&mut self, tier: Tier, demand: SlotDemand, energy: f64) -> SlotId {
        let id = self.slots.len() as SlotId;
        self.slots.push(ResourceSlot {
            id,
            tier,
            demand,
            energy,
        });
        id
    }

    /// Adds `count` identical slots and returns their IDs.
    pub fn add_slots(&mut self, tier: Tier, demand: SlotDemand, energy: f64, count: u32) -> Vec<SlotId> {
        (0..count)
            .map(|_| self.add_slot(tier, demand.clone(), energy))
            .collect()
    }

    pub fn get(&self, id: SlotId) -> Option<&ResourceSlot> {
        self.slots.get(id as usize)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterates over all slots in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &ResourceSlot> {
        self.slots.iter()
    }

    /// Iterates over slots of the given tier in catalog order.
    pub fn by_tier(&self, tier: Tier) -> impl Iterator<Item = &ResourceSlot> {
        self.slots.iter().filter(move |slot| slot.tier == tier)
    }

    /// Returns the number of slots of the given tier.
    pub fn tier_size(&self, tier: Tier) -> usize {
        self.by_tier(tier).count()
    }

    /// Returns `index`-th slot (modulo tier size) of the given tier.
    pub fn nth_of_tier(&self, tier: Tier, index: usize) -> Option<&ResourceSlot> {
        let size = self.tier_size(tier);
        if size == 0 {
            return None;
        }
        self.by_tier(tier).nth(index % size)
    }

    /// Round-robin over the full catalog, ignoring tiers.
    ///
    /// This is the fallback for tasks which no policy could place.
    pub fn global_round_robin(&self, position: usize) -> Option<SlotId> {
        if self.slots.is_empty() {
            return None;
        }
        Some(self.slots[position % self.slots.len()].id)
    }
}
