//! Round robin baseline.

use crate::core::errors::PlacementError;
use crate::core::load::LoadCounters;
use crate::core::offloading_policy::OffloadingPolicy;
use crate::core::slot::{SlotCatalog, SlotId};
use crate::core::task::Task;
use crate::core::tier::{LatencyModel, Tier};

/// Share of each window of the task stream sent to the elastic tier.
const ELASTIC_SHARE: f64 = 0.2;
/// Share of each window of the task stream sent to the mid tier. The rest goes to the constrained tier.
const MID_TIER_SHARE: f64 = 0.5;

/// Splits the task stream between tiers by submission position and round-robins inside each tier.
///
/// Within every window of `window` consecutive tasks the first 20% go to the elastic tier, the next 50% to the
/// mid tier and the remaining 30% to the constrained tier.
pub struct RoundRobin {
    window: usize,
    position: usize,
    cursors: [usize; 3],
    load: LoadCounters,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::with_window(10)
    }

    pub fn with_window(window: usize) -> Self {
        Self {
            window: window.max(1),
            position: 0,
            cursors: [0; 3],
            load: LoadCounters::new(),
        }
    }

    /// Tier assigned to the given position of the task stream.
    pub fn tier_for_position(&self, position: usize) -> Tier {
        let offset = position % self.window;
        let elastic_end = (self.window as f64 * ELASTIC_SHARE).round() as usize;
        let mid_tier_end = (self.window as f64 * (ELASTIC_SHARE + MID_TIER_SHARE)).round() as usize;
        if offset < elastic_end {
            Tier::Elastic
        } else if offset < mid_tier_end {
            Tier::MidTier
        } else {
            Tier::Constrained
        }
    }

    fn cursor(&mut self, tier: Tier) -> &mut usize {
        match tier {
            Tier::Elastic => &mut self.cursors[0],
            Tier::MidTier => &mut self.cursors[1],
            Tier::Constrained => &mut self.cursors[2],
        }
    }
}

impl Default for RoundRobin {
    fn default() -> Self {
        Self::new()
    }
}

impl OffloadingPolicy for RoundRobin {
    fn name(&self) -> &str {
        "RoundRobin"
    }

    fn select_slot(
        &mut self,
        task: &Task,
        catalog: &SlotCatalog,
        _latency: &dyn LatencyModel,
    ) -> Result<SlotId, PlacementError> {
        let tier = self.tier_for_position(self.position);
        self.position += 1;

        let index = *self.cursor(tier);
        let slot = catalog
            .nth_of_tier(tier, index)
            .ok_or(PlacementError::NoEligibleSlot {
                task_id: task.id,
                tier: Some(tier),
            })?
            .id;
        *self.cursor(tier) += 1;
        self.load.increment(slot);
        Ok(slot)
    }

    fn load(&self) -> &LoadCounters {
        &self.load
    }

    fn reset(&mut self) {
        self.position = 0;
        self.cursors = [0; 3];
        self.load.reset();
    }
}
