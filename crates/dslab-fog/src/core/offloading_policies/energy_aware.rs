//! Energy-aware offloading.

use crate::core::errors::PlacementError;
use crate::core::load::LoadCounters;
use crate::core::offloading_policies::common::{eligible_slots, TieBreak};
use crate::core::offloading_policy::OffloadingPolicy;
use crate::core::slot::{ResourceSlot, SlotCatalog, SlotId};
use crate::core::task::Task;
use crate::core::tier::LatencyModel;

const ENERGY_WEIGHT: f64 = 0.4;
const NETWORK_WEIGHT: f64 = 0.3;
const LOAD_WEIGHT: f64 = 0.3;

/// Picks the slot with the minimum energy impact among the slots allowed by task affinity.
///
/// Energy impact is a weighted sum of the slot's declared energy figure, the round trip latency between the task
/// origin and the slot's tier, and the number of tasks already routed to the slot.
pub struct EnergyAware {
    tie_break: TieBreak,
    load: LoadCounters,
}

impl EnergyAware {
    pub fn new(tie_break: TieBreak) -> Self {
        Self {
            tie_break,
            load: LoadCounters::new(),
        }
    }

    /// Returns energy impact of running the task on the slot given the current load.
    pub fn energy_impact(&self, task: &Task, slot: &ResourceSlot, latency: &dyn LatencyModel) -> f64 {
        ENERGY_WEIGHT * slot.energy
            + NETWORK_WEIGHT * latency.round_trip(task.origin, slot.tier)
            + LOAD_WEIGHT * self.load.get(slot.id) as f64
    }
}

impl Default for EnergyAware {
    fn default() -> Self {
        Self::new(TieBreak::FirstInCatalog)
    }
}

impl OffloadingPolicy for EnergyAware {
    fn name(&self) -> &str {
        "EnergyAware"
    }

    fn select_slot(
        &mut self,
        task: &Task,
        catalog: &SlotCatalog,
        latency: &dyn LatencyModel,
    ) -> Result<SlotId, PlacementError> {
        let scored: Vec<(SlotId, f64)> = eligible_slots(task, catalog)
            .map(|slot| (slot.id, self.energy_impact(task, slot, latency)))
            .collect();
        let slot = self.tie_break.pick_min(scored).ok_or(PlacementError::NoEligibleSlot {
            task_id: task.id,
            tier: task.affinity,
        })?;
        self.load.increment(slot);
        Ok(slot)
    }

    fn load(&self) -> &LoadCounters {
        &self.load
    }

    fn reset(&mut self) {
        self.tie_break.reset();
        self.load.reset();
    }
}
