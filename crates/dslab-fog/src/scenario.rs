//! Scenario driver which binds slots to hosts and routes a batch of tasks through an offloading policy.

use std::collections::HashMap;

use log::{debug, info, warn};

use crate::core::allocator::TieredAllocator;
use crate::core::classifier::classify;
use crate::core::config::ScenarioConfig;
use crate::core::errors::{AllocationError, ConfigError, PlacementError, RunError};
use crate::core::host::HostId;
use crate::core::offloading_policy::{policy_resolver, OffloadingPolicy};
use crate::core::slot::{ResourceSlot, SlotCatalog, SlotId};
use crate::core::task::Task;
use crate::core::tier::{LatencyModel, Tier, TierLatency};
use crate::report::{RunReport, SlotBinding, TaskFailure, TaskPlacement};

pub struct FogScenario {
    config: ScenarioConfig,
    catalog: SlotCatalog,
    allocators: Vec<TieredAllocator>,
    latency: TierLatency,
    policy: Box<dyn OffloadingPolicy>,
    placements: HashMap<u64, usize>,
    report: RunReport,
}

impl FogScenario {
    pub fn new(config: ScenarioConfig, policy: Box<dyn OffloadingPolicy>) -> Self {
        let catalog = config.build_catalog();
        let hosts = config.build_hosts();
        let allocators = if config.shared_host_pool {
            vec![TieredAllocator::shared("shared-pool", hosts)]
        } else {
            Tier::ALL
                .iter()
                .map(|tier| {
                    let tier_hosts = hosts.iter().filter(|h| h.tier == *tier).cloned().collect();
                    TieredAllocator::new(&format!("{}-pool", tier), *tier, tier_hosts)
                })
                .collect()
        };
        let latency = config.latency.clone();
        Self {
            config,
            catalog,
            allocators,
            latency,
            policy,
            placements: HashMap::new(),
            report: RunReport::default(),
        }
    }

    /// Creates scenario with a policy resolved from its config string.
    pub fn from_policy_str(config: ScenarioConfig, policy: &str) -> Result<Self, ConfigError> {
        let policy = policy_resolver(policy)?;
        Ok(Self::new(config, policy))
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    pub fn catalog(&self) -> &SlotCatalog {
        &self.catalog
    }

    pub fn allocators(&self) -> &[TieredAllocator] {
        &self.allocators
    }

    pub fn policy(&self) -> &dyn OffloadingPolicy {
        self.policy.as_ref()
    }

    /// Report of the last run.
    pub fn report(&self) -> &RunReport {
        &self.report
    }

    /// Clears policy state, host bindings and results of the previous run.
    pub fn reset(&mut self) {
        self.policy.reset();
        for allocator in self.allocators.iter_mut() {
            allocator.reset();
        }
        self.placements.clear();
        self.report = RunReport::default();
    }

    /// Runs the scenario for tasks in submission order and returns its report.
    pub fn run(&mut self, tasks: &[Task]) -> RunReport {
        self.reset();
        self.report.policy = self.policy.name().to_string();
        self.report.submitted = tasks.len();
        info!(
            "Running policy {} on {} slots with {} tasks",
            self.report.policy,
            self.catalog.len(),
            tasks.len()
        );

        self.bind_slots();
        for (position, task) in tasks.iter().enumerate() {
            self.place_task(position, task);
        }
        self.report.load = self.policy.load().clone();

        info!(
            "Policy {} placed {}/{} tasks ({} fallbacks, {} failed)",
            self.report.policy,
            self.report.placements.len(),
            self.report.submitted,
            self.report.fallback_count(),
            self.report.failed_tasks.len()
        );
        self.report.clone()
    }

    /// Placement of a task from the last run.
    ///
    /// Tasks which were submitted but could not be placed are reported as [`RunError::TaskFailed`].
    pub fn placement_of(&self, task_id: u64) -> Result<&TaskPlacement, RunError> {
        if let Some(idx) = self.placements.get(&task_id) {
            return Ok(&self.report.placements[*idx]);
        }
        match self.report.failed_tasks.iter().find(|f| f.task_id == task_id) {
            Some(failure) => Err(RunError::TaskFailed {
                task_id,
                reason: failure.reason.clone(),
            }),
            None => Err(RunError::UnknownTask(task_id)),
        }
    }

    /// Host bound to the slot in the current run.
    pub fn host_of(&self, slot_id: SlotId) -> Option<HostId> {
        self.allocators.iter().find_map(|a| a.lookup(slot_id))
    }

    fn allocator_idx(&self, tier: Tier) -> Option<usize> {
        self.allocators.iter().position(|a| a.serves(tier))
    }

    fn bind_slots(&mut self) {
        let slots: Vec<ResourceSlot> = self.catalog.iter().cloned().collect();
        for slot in slots {
            let binding = self.bind_slot(&slot);
            self.report.slot_bindings.push(binding);
        }
    }

    fn bind_slot(&mut self, slot: &ResourceSlot) -> SlotBinding {
        let mut binding = SlotBinding {
            slot_id: slot.id,
            tier: slot.tier,
            host_id: None,
            resized: None,
        };
        let allocator_idx = match self.allocator_idx(slot.tier) {
            Some(idx) => idx,
            None => {
                warn!("No allocator serves tier {} of slot {}", slot.tier, slot.id);
                return binding;
            }
        };
        let allocator = &mut self.allocators[allocator_idx];
        match allocator.bind(slot) {
            Ok(host_id) => {
                debug!("Slot {} ({}) bound to host {}", slot.id, slot.tier, host_id);
                binding.host_id = Some(host_id);
            }
            Err(AllocationError::Exhausted(failure)) => {
                warn!("{}", failure);
                let fitted = if self.config.shrink_on_failure {
                    failure.fitting_demand(&slot.demand)
                } else {
                    None
                };
                if let Some(demand) = fitted {
                    let mut resized = slot.clone();
                    resized.demand = demand.clone();
                    match allocator.bind(&resized) {
                        Ok(host_id) => {
                            info!(
                                "Slot {} ({}) bound to host {} with reduced demand {:?}",
                                slot.id, slot.tier, host_id, demand
                            );
                            binding.host_id = Some(host_id);
                            binding.resized = Some(demand);
                            return binding;
                        }
                        Err(e) => warn!("Retry of slot {} failed: {}", slot.id, e),
                    }
                }
                self.report.allocation_failures.push(failure);
            }
            Err(e) => warn!("Can't bind slot {}: {}", slot.id, e),
        }
        binding
    }

    fn place_task(&mut self, position: usize, task: &Task) {
        let (slot_id, fallback) = match self.policy.select_slot(task, &self.catalog, &self.latency) {
            Ok(slot_id) => (slot_id, false),
            Err(PlacementError::NoEligibleSlot { .. }) => match self.catalog.global_round_robin(position) {
                Some(slot_id) => {
                    debug!(
                        "Policy {} found no eligible slot for task {}, falling back to slot {}",
                        self.report.policy, task.id, slot_id
                    );
                    (slot_id, true)
                }
                None => {
                    self.fail_task(task.id, None, "slot catalog is empty".to_string());
                    return;
                }
            },
        };
        let slot = match self.catalog.get(slot_id) {
            Some(slot) => slot.clone(),
            None => {
                self.fail_task(task.id, Some(slot_id), format!("slot {} is not in the catalog", slot_id));
                return;
            }
        };
        let host_id = match self.host_of(slot_id) {
            Some(host_id) => host_id,
            None => {
                self.fail_task(task.id, Some(slot_id), format!("slot {} is not bound to a host", slot_id));
                return;
            }
        };

        let rate = self
            .report
            .slot_bindings
            .get(slot_id as usize)
            .and_then(|b| b.resized.as_ref())
            .map(|d| d.compute_rate)
            .unwrap_or_else(|| slot.compute_rate());
        let execution_ms = if rate > 0. {
            task.compute_demand / rate * 1000.
        } else {
            f64::INFINITY
        };
        let transmission_ms = self.latency.round_trip(task.origin, slot.tier) + task.data_size() as f64 / 1000.;

        debug!(
            "Task {} placed on slot {} ({}) at host {}",
            task.id, slot_id, slot.tier, host_id
        );
        self.placements.insert(task.id, self.report.placements.len());
        self.report.placements.push(TaskPlacement {
            task_id: task.id,
            category: classify(task.compute_demand, task.data_size() as f64),
            slot_id,
            tier: slot.tier,
            host_id,
            fallback,
            execution_ms,
            transmission_ms,
            energy: task.compute_demand.max(0.) * slot.tier.energy_per_mi(),
        });
    }

    fn fail_task(&mut self, task_id: u64, slot_id: Option<SlotId>, reason: String) {
        warn!("Task {} failed: {}", task_id, reason);
        self.report.failed_tasks.push(TaskFailure {
            task_id,
            slot_id,
            reason,
        });
    }
}
