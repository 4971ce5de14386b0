//! Offloadable task.

use serde::{Deserialize, Serialize};

use crate::core::tier::Tier;

/// Represents a task produced by a device and submitted for offloading.
///
/// Task is characterized by its computational demand (in MI), input and output data sizes (in bytes),
/// optional deadline (in ms), optional tier affinity and the tier of the device which produced it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub compute_demand: f64,
    pub data_in: u64,
    pub data_out: u64,
    #[serde(default)]
    pub deadline: Option<f64>,
    #[serde(default)]
    pub affinity: Option<Tier>,
    #[serde(default = "default_origin")]
    pub origin: Tier,
}

fn default_origin() -> Tier {
    Tier::Constrained
}

impl Task {
    /// Creates unconstrained task originating from the constrained tier.
    pub fn new(id: u64, compute_demand: f64, data_in: u64, data_out: u64) -> Self {
        Self {
            id,
            compute_demand,
            data_in,
            data_out,
            deadline: None,
            affinity: None,
            origin: default_origin(),
        }
    }

    pub fn with_deadline(mut self, deadline: f64) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_affinity(mut self, affinity: Tier) -> Self {
        self.affinity = Some(affinity);
        self
    }

    pub fn with_origin(mut self, origin: Tier) -> Self {
        self.origin = origin;
        self
    }

    /// Total amount of data moved for the task (input plus output), saturating at `u64::MAX`.
    pub fn data_size(&self) -> u64 {
        self.data_in.saturating_add(self.data_out)
    }

    /// Returns the deadline used for placement decisions.
    ///
    /// Explicit task deadline takes precedence, otherwise the deadline of the affinity tier is used.
    /// Unconstrained tasks get the most relaxed deadline.
    pub fn effective_deadline(&self) -> f64 {
        self.deadline
            .unwrap_or_else(|| self.affinity.unwrap_or(Tier::Elastic).default_deadline())
    }

    /// Checks whether the task may run on the given tier.
    pub fn accepts(&self, tier: Tier) -> bool {
        self.affinity.map_or(true, |affinity| affinity == tier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_size_saturates() {
        assert_eq!(Task::new(0, 1., 2, 3).data_size(), 5);
        assert_eq!(Task::new(0, 1., u64::MAX, 1).data_size(), u64::MAX);
        assert_eq!(Task::new(0, 1., u64::MAX, u64::MAX).data_size(), u64::MAX);
    }

    #[test]
    fn deadline_and_affinity() {
        let task = Task::new(0, 1., 2, 3);
        assert_eq!(task.effective_deadline(), 10000.);
        assert!(task.accepts(Tier::Constrained) && task.accepts(Tier::Elastic));

        let task = task.with_affinity(Tier::MidTier);
        assert_eq!(task.effective_deadline(), 5000.);
        assert!(!task.accepts(Tier::Elastic));
        assert_eq!(task.with_deadline(700.).effective_deadline(), 700.);
    }
}
