//! Multi-classifier energy-efficient task offloading (MCEETO).

use std::collections::HashMap;

use crate::core::classifier::{classify, TaskCategory, LARGE_DATA_THRESHOLD};
use crate::core::errors::PlacementError;
use crate::core::load::LoadCounters;
use crate::core::offloading_policy::OffloadingPolicy;
use crate::core::slot::{SlotCatalog, SlotId};
use crate::core::task::Task;
use crate::core::tier::{LatencyModel, Tier};

/// Energy consumed per MI in the elastic tier (J/MI).
pub const CLOUD_ENERGY_COEFF: f64 = 0.0005;
/// Energy consumed per MI in the mid tier (J/MI).
pub const FOG_ENERGY_COEFF: f64 = 0.0003;
/// Energy of moving a byte from a constrained device to the mid tier (J/byte).
pub const IOT_TO_FOG_TRANS_ENERGY: f64 = 0.00001;
/// Energy of moving a byte from the mid tier to the elastic tier (J/byte).
pub const FOG_TO_CLOUD_TRANS_ENERGY: f64 = 0.00002;

/// Classifies each task and routes its category to a tier, then round-robins by task ID inside the tier.
///
/// Compute-heavy tasks with large data are sent to the tier with the lower estimated energy, counting both
/// computation and transmission. Decisions are cached per task ID for the lifetime of a run.
pub struct MultiClassifier {
    decisions: HashMap<u64, SlotId>,
    classifications: u64,
    load: LoadCounters,
}

impl MultiClassifier {
    pub fn new() -> Self {
        Self {
            decisions: HashMap::new(),
            classifications: 0,
            load: LoadCounters::new(),
        }
    }

    /// Number of classifications performed in the current run (cached decisions are not counted).
    pub fn classifications(&self) -> u64 {
        self.classifications
    }

    /// Returns cached decision for the task.
    pub fn decision(&self, task_id: u64) -> Option<SlotId> {
        self.decisions.get(&task_id).copied()
    }

    /// Tier preferred for the task category.
    pub fn target_tier(category: TaskCategory, compute_demand: f64, data_size: f64) -> Tier {
        match category {
            TaskCategory::HighComputeLowData => Tier::Elastic,
            TaskCategory::HighComputeHighData => {
                let cloud_energy = compute_demand * CLOUD_ENERGY_COEFF
                    + data_size * (IOT_TO_FOG_TRANS_ENERGY + FOG_TO_CLOUD_TRANS_ENERGY);
                let fog_energy = compute_demand * FOG_ENERGY_COEFF + data_size * IOT_TO_FOG_TRANS_ENERGY;
                if cloud_energy <= fog_energy {
                    Tier::Elastic
                } else {
                    Tier::MidTier
                }
            }
            TaskCategory::MediumComputeMediumData | TaskCategory::MediumComputeHighData => Tier::MidTier,
            TaskCategory::LowComputeLowData => Tier::Constrained,
            TaskCategory::LowComputeHighData => {
                // moving very large data costs more than computing locally
                if data_size > LARGE_DATA_THRESHOLD {
                    Tier::Constrained
                } else {
                    Tier::MidTier
                }
            }
        }
    }
}

impl Default for MultiClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl OffloadingPolicy for MultiClassifier {
    fn name(&self) -> &str {
        "MultiClassifier"
    }

    fn select_slot(
        &mut self,
        task: &Task,
        catalog: &SlotCatalog,
        _latency: &dyn LatencyModel,
    ) -> Result<SlotId, PlacementError> {
        if let Some(slot) = self.decision(task.id) {
            return Ok(slot);
        }

        let compute_demand = task.compute_demand.max(0.);
        let data_size = task.data_size() as f64;
        let category = classify(compute_demand, data_size);
        self.classifications += 1;

        let tier = Self::target_tier(category, compute_demand, data_size);
        let tier_size = catalog.tier_size(tier) as u64;
        let slot = match tier_size {
            0 => None,
            size => catalog.nth_of_tier(tier, (task.id % size) as usize),
        }
        .ok_or(PlacementError::NoEligibleSlot {
            task_id: task.id,
            tier: Some(tier),
        })?
        .id;

        self.decisions.insert(task.id, slot);
        self.load.increment(slot);
        Ok(slot)
    }

    fn load(&self) -> &LoadCounters {
        &self.load
    }

    fn reset(&mut self) {
        self.decisions.clear();
        self.classifications = 0;
        self.load.reset();
    }
}
