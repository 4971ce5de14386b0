//! Results of a scenario run.

use std::fs::File;

use indexmap::IndexMap;
use serde::Serialize;

use crate::core::allocator::AllocationFailure;
use crate::core::classifier::TaskCategory;
use crate::core::host::HostId;
use crate::core::load::LoadCounters;
use crate::core::slot::{SlotDemand, SlotId};
use crate::core::tier::Tier;

/// Placement of a single submitted task.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TaskPlacement {
    pub task_id: u64,
    pub category: TaskCategory,
    pub slot_id: SlotId,
    pub tier: Tier,
    pub host_id: HostId,
    /// Whether the slot was chosen by the global round robin fallback instead of the policy.
    pub fallback: bool,
    /// Estimated computation time in ms.
    pub execution_ms: f64,
    /// Estimated network time in ms: round trip from the task origin plus data transfer.
    pub transmission_ms: f64,
    /// Estimated computation energy in joules.
    pub energy: f64,
}

/// Task which could not be executed.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TaskFailure {
    pub task_id: u64,
    pub slot_id: Option<SlotId>,
    pub reason: String,
}

/// Host selected for a slot at the beginning of the run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SlotBinding {
    pub slot_id: SlotId,
    pub tier: Tier,
    pub host_id: Option<HostId>,
    /// Reduced demand the slot was bound with after the configured demand fit no host.
    pub resized: Option<SlotDemand>,
}

#[derive(Serialize)]
struct TaskRow {
    task_id: u64,
    status: &'static str,
    category: String,
    slot_id: Option<SlotId>,
    tier: String,
    host_id: Option<HostId>,
    fallback: bool,
    execution_ms: f64,
    transmission_ms: f64,
    energy: f64,
}

/// Contains placements and statistics collected from a scenario run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RunReport {
    pub policy: String,
    pub submitted: usize,
    pub placements: Vec<TaskPlacement>,
    pub failed_tasks: Vec<TaskFailure>,
    pub slot_bindings: Vec<SlotBinding>,
    pub allocation_failures: Vec<AllocationFailure>,
    pub load: LoadCounters,
}

impl RunReport {
    /// Percentage of submitted tasks which were placed on a bound slot.
    pub fn success_rate(&self) -> f64 {
        if self.submitted == 0 {
            return 0.;
        }
        self.placements.len() as f64 / self.submitted as f64 * 100.
    }

    /// Number of placed tasks per tier, from elastic to constrained.
    pub fn tier_distribution(&self) -> IndexMap<Tier, usize> {
        let mut distribution: IndexMap<Tier, usize> = Tier::ALL.iter().map(|tier| (*tier, 0)).collect();
        for placement in &self.placements {
            *distribution.entry(placement.tier).or_insert(0) += 1;
        }
        distribution
    }

    pub fn fallback_count(&self) -> usize {
        self.placements.iter().filter(|p| p.fallback).count()
    }

    pub fn average_execution_ms(&self) -> f64 {
        self.average(|p| p.execution_ms)
    }

    pub fn average_transmission_ms(&self) -> f64 {
        self.average(|p| p.transmission_ms)
    }

    /// Minimum estimated execution time, zero if nothing was placed.
    pub fn min_execution_ms(&self) -> f64 {
        self.placements
            .iter()
            .map(|p| p.execution_ms)
            .reduce(f64::min)
            .unwrap_or(0.)
    }

    pub fn max_execution_ms(&self) -> f64 {
        self.placements
            .iter()
            .map(|p| p.execution_ms)
            .reduce(f64::max)
            .unwrap_or(0.)
    }

    /// Estimated computation energy per tier, from elastic to constrained.
    pub fn tier_energy(&self) -> IndexMap<Tier, f64> {
        let mut energy: IndexMap<Tier, f64> = Tier::ALL.iter().map(|tier| (*tier, 0.)).collect();
        for placement in &self.placements {
            *energy.entry(placement.tier).or_insert(0.) += placement.energy;
        }
        energy
    }

    pub fn total_energy(&self) -> f64 {
        self.placements.iter().map(|p| p.energy).sum()
    }

    fn average<F: Fn(&TaskPlacement) -> f64>(&self, value: F) -> f64 {
        if self.placements.is_empty() {
            return 0.;
        }
        self.placements.iter().map(value).sum::<f64>() / self.placements.len() as f64
    }

    /// Flat summary used in experiment results.
    pub fn summary(&self) -> IndexMap<String, String> {
        let mut summary = IndexMap::new();
        summary.insert("policy".to_string(), self.policy.clone());
        summary.insert("submitted".to_string(), self.submitted.to_string());
        summary.insert("placed".to_string(), self.placements.len().to_string());
        summary.insert("failed".to_string(), self.failed_tasks.len().to_string());
        summary.insert("success_rate".to_string(), format!("{:.2}", self.success_rate()));
        summary.insert("fallbacks".to_string(), self.fallback_count().to_string());
        summary.insert(
            "unbound_slots".to_string(),
            self.slot_bindings
                .iter()
                .filter(|b| b.host_id.is_none())
                .count()
                .to_string(),
        );
        for (tier, count) in self.tier_distribution() {
            summary.insert(format!("tasks_{}", tier), count.to_string());
        }
        summary.insert(
            "avg_execution_ms".to_string(),
            format!("{:.2}", self.average_execution_ms()),
        );
        summary.insert(
            "min_execution_ms".to_string(),
            format!("{:.2}", self.min_execution_ms()),
        );
        summary.insert(
            "max_execution_ms".to_string(),
            format!("{:.2}", self.max_execution_ms()),
        );
        summary.insert(
            "avg_transmission_ms".to_string(),
            format!("{:.2}", self.average_transmission_ms()),
        );
        for (tier, energy) in self.tier_energy() {
            summary.insert(format!("energy_{}", tier), format!("{:.2}", energy));
        }
        summary.insert("total_energy".to_string(), format!("{:.2}", self.total_energy()));
        summary
    }

    /// Saves one row per submitted task (placed or failed) to CSV file.
    pub fn save_csv(&self, path: &str) -> Result<(), std::io::Error> {
        let file = File::create(path)?;
        let mut wtr = csv::Writer::from_writer(file);
        for p in &self.placements {
            wtr.serialize(TaskRow {
                task_id: p.task_id,
                status: "placed",
                category: p.category.to_string(),
                slot_id: Some(p.slot_id),
                tier: p.tier.to_string(),
                host_id: Some(p.host_id),
                fallback: p.fallback,
                execution_ms: p.execution_ms,
                transmission_ms: p.transmission_ms,
                energy: p.energy,
            })?;
        }
        for f in &self.failed_tasks {
            wtr.serialize(TaskRow {
                task_id: f.task_id,
                status: "failed",
                category: String::new(),
                slot_id: f.slot_id,
                tier: String::new(),
                host_id: None,
                fallback: false,
                execution_ms: 0.,
                transmission_ms: 0.,
                energy: 0.,
            })?;
        }
        wtr.flush()?;
        Ok(())
    }
}
