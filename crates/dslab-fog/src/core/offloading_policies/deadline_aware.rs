//! Deadline-aware offloading.

use crate::core::errors::PlacementError;
use crate::core::load::LoadCounters;
use crate::core::offloading_policies::common::{eligible_slots, TieBreak};
use crate::core::offloading_policy::OffloadingPolicy;
use crate::core::slot::{ResourceSlot, SlotCatalog, SlotId};
use crate::core::task::Task;
use crate::core::tier::LatencyModel;

/// Slowdown added by every task already routed to a slot.
const LOAD_PENALTY: f64 = 0.1;

/// Picks the fastest slot among those that meet the task deadline.
///
/// Estimated completion time is computation time plus round trip latency, inflated by the slot's current load.
/// If no slot allowed by task affinity meets the deadline, the fastest slot of the same filtered set is used.
pub struct DeadlineAware {
    tie_break: TieBreak,
    load: LoadCounters,
}

impl DeadlineAware {
    pub fn new(tie_break: TieBreak) -> Self {
        Self {
            tie_break,
            load: LoadCounters::new(),
        }
    }

    /// Returns estimated completion time (ms) of the task on the slot given the current load.
    pub fn estimate(&self, task: &Task, slot: &ResourceSlot, latency: &dyn LatencyModel) -> f64 {
        let computation = if slot.compute_rate() > 0. {
            task.compute_demand.max(0.) / slot.compute_rate() * 1000.
        } else {
            f64::INFINITY
        };
        let transmission = latency.round_trip(task.origin, slot.tier);
        (computation + transmission) * (1. + LOAD_PENALTY * self.load.get(slot.id) as f64)
    }
}

impl Default for DeadlineAware {
    fn default() -> Self {
        Self::new(TieBreak::FirstInCatalog)
    }
}

impl OffloadingPolicy for DeadlineAware {
    fn name(&self) -> &str {
        "DeadlineAware"
    }

    fn select_slot(
        &mut self,
        task: &Task,
        catalog: &SlotCatalog,
        latency: &dyn LatencyModel,
    ) -> Result<SlotId, PlacementError> {
        let deadline = task.effective_deadline();
        let estimates: Vec<(SlotId, f64)> = eligible_slots(task, catalog)
            .map(|slot| (slot.id, self.estimate(task, slot, latency)))
            .collect();

        let meeting_deadline: Vec<(SlotId, f64)> = estimates
            .iter()
            .copied()
            .filter(|(_, estimate)| *estimate < deadline)
            .collect();
        let candidates = if meeting_deadline.is_empty() {
            estimates
        } else {
            meeting_deadline
        };

        let slot = self.tie_break.pick_min(candidates).ok_or(PlacementError::NoEligibleSlot {
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
