//! Scenario configuration.

use serde::{Deserialize, Serialize};

use crate::core::errors::ConfigError;
use crate::core::host::HostDescriptor;
use crate::core::slot::{SlotCatalog, SlotDemand};
use crate::core::task::Task;
use crate::core::tier::{Tier, TierLatency};

/// Holds raw scenario config parsed from YAML file.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
struct RawScenarioConfig {
    pub seed: Option<u64>,
    pub shared_host_pool: Option<bool>,
    pub shrink_on_failure: Option<bool>,
    pub latency: Option<TierLatency>,
    pub slots: Option<Vec<SlotConfig>>,
    pub hosts: Option<Vec<HostConfig>>,
    pub tasks: Option<TasksConfig>,
    pub policies: Option<Vec<String>>,
}

/// Holds configuration of a single slot or a set of identical slots.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct SlotConfig {
    pub tier: Tier,
    /// Number of cores, 1 by default.
    pub cores: Option<u32>,
    /// Compute rate per core in MIPS.
    pub compute_rate: f64,
    /// Memory in MB.
    pub memory: u64,
    pub bandwidth: u64,
    /// Storage in MB.
    pub storage: u64,
    /// Declared energy figure used by energy-aware placement.
    pub energy: f64,
    /// Number of such slots.
    pub count: Option<u32>,
}

/// Holds configuration of a single physical host or a set of identical hosts.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct HostConfig {
    /// Host name.
    /// Should be set if count = 1.
    pub name: Option<String>,
    /// Host name prefix.
    /// Full name is produced by appending host instance number to the prefix.
    /// Should be set if count > 1.
    pub name_prefix: Option<String>,
    pub tier: Tier,
    pub cores: u32,
    /// Compute rate of a single core in MIPS.
    pub compute_rate_per_core: f64,
    /// Memory in MB.
    pub memory: u64,
    pub bandwidth: u64,
    /// Storage in MB.
    pub storage: u64,
    /// Number of such hosts.
    pub count: Option<u32>,
}

/// Describes the submitted tasks: either an explicit list or a random workload.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct TasksConfig {
    /// Number of generated tasks.
    pub count: Option<u32>,
    /// Range of computational demand in MI.
    pub compute: Option<(f64, f64)>,
    /// Range of input data size in bytes.
    pub data_in: Option<(u64, u64)>,
    /// Range of output data size in bytes.
    pub data_out: Option<(u64, u64)>,
    /// Affinity assigned to all generated tasks.
    pub affinity: Option<Tier>,
    /// Deadline in ms assigned to all generated tasks.
    pub deadline: Option<f64>,
    /// Explicit tasks, used instead of the generator when set.
    pub list: Option<Vec<Task>>,
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            count: Some(10),
            compute: Some((10000., 50000.)),
            data_in: Some((500, 2000)),
            data_out: Some((300, 1300)),
            affinity: None,
            deadline: None,
            list: None,
        }
    }
}

/// Represents scenario configuration.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct ScenarioConfig {
    /// Seed of task generation.
    pub seed: u64,
    /// Whether all tiers allocate from a single host pool instead of a pool per tier.
    pub shared_host_pool: bool,
    /// Whether a slot which fits no host is retried once with a demand reduced to the first examined host.
    pub shrink_on_failure: bool,
    /// Latencies between tiers.
    pub latency: TierLatency,
    /// Configurations of execution slots, in catalog order.
    pub slots: Vec<SlotConfig>,
    /// Configurations of physical hosts, in scan order.
    pub hosts: Vec<HostConfig>,
    /// Submitted tasks.
    pub tasks: TasksConfig,
    /// Offloading policies, one run per policy.
    pub policies: Vec<String>,
}

impl ScenarioConfig {
    /// Creates scenario config by reading parameter values from YAML file
    /// (uses default values if some parameters are absent).
    pub fn from_file(file_name: &str) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(file_name).map_err(|source| ConfigError::Io {
            path: file_name.to_string(),
            source,
        })?;
        Self::from_yaml(&yaml)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let raw: RawScenarioConfig = serde_yaml::from_str(yaml)?;
        let default = Self::default();
        let config = Self {
            seed: raw.seed.unwrap_or(default.seed),
            shared_host_pool: raw.shared_host_pool.unwrap_or(default.shared_host_pool),
            shrink_on_failure: raw.shrink_on_failure.unwrap_or(default.shrink_on_failure),
            latency: raw.latency.unwrap_or(default.latency),
            slots: raw.slots.unwrap_or(default.slots),
            hosts: raw.hosts.unwrap_or(default.hosts),
            tasks: raw.tasks.unwrap_or(default.tasks),
            policies: raw.policies.unwrap_or(default.policies),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for host in &self.hosts {
            let count = host.count.unwrap_or(1);
            if count == 1 && host.name.is_none() && host.name_prefix.is_none() {
                return Err(ConfigError::Invalid(
                    "host with count = 1 should have name or name_prefix".to_string(),
                ));
            }
            if count > 1 && host.name_prefix.is_none() {
                return Err(ConfigError::Invalid(format!(
                    "hosts with count = {} should have name_prefix",
                    count
                )));
            }
        }
        if let Some((from, to)) = self.tasks.compute {
            if !from.is_finite() || !to.is_finite() {
                return Err(ConfigError::Invalid(format!("non-finite compute range {}..{}", from, to)));
            }
            check_range("compute", from, to)?;
        }
        if let Some((from, to)) = self.tasks.data_in {
            check_range("data_in", from, to)?;
        }
        if let Some((from, to)) = self.tasks.data_out {
            check_range("data_out", from, to)?;
        }
        Ok(())
    }

    /// Builds the slot catalog. Slot IDs follow the order of slot configs.
    pub fn build_catalog(&self) -> SlotCatalog {
        let mut catalog = SlotCatalog::new();
        for slot in &self.slots {
            let demand = SlotDemand {
                cores: slot.cores.unwrap_or(1),
                compute_rate: slot.compute_rate,
                memory: slot.memory,
                bandwidth: slot.bandwidth,
                storage: slot.storage,
            };
            catalog.add_slots(slot.tier, demand, slot.energy, slot.count.unwrap_or(1));
        }
        catalog
    }

    /// Builds host descriptors with IDs assigned in config order.
    pub fn build_hosts(&self) -> Vec<HostDescriptor> {
        let mut hosts = Vec::new();
        for host in &self.hosts {
            let count = host.count.unwrap_or(1);
            for i in 0..count {
                let name = match (&host.name, &host.name_prefix) {
                    (Some(name), _) if count == 1 => name.clone(),
                    (_, Some(prefix)) => format!("{}{}", prefix, i),
                    (Some(name), None) => format!("{}{}", name, i),
                    (None, None) => format!("{}-{}", host.tier, i),
                };
                hosts.push(HostDescriptor {
                    id: hosts.len() as u32,
                    name,
                    tier: host.tier,
                    cores: host.cores,
                    compute_rate_per_core: host.compute_rate_per_core,
                    memory: host.memory,
                    bandwidth: host.bandwidth,
                    storage: host.storage,
                });
            }
        }
        hosts
    }
}

fn check_range<T: PartialOrd + std::fmt::Display>(name: &str, from: T, to: T) -> Result<(), ConfigError> {
    if from > to {
        return Err(ConfigError::Invalid(format!("empty {} range {}..{}", name, from, to)));
    }
    Ok(())
}

impl Default for ScenarioConfig {
    /// Three-tier scenario with 2 elastic, 5 mid tier and 10 constrained slots of equal size,
    /// and host pools sized like a small cloud datacenter, a fog layer and a set of IoT devices.
    fn default() -> Self {
        let slot = |tier: Tier, energy: f64, count: u32| SlotConfig {
            tier,
            cores: Some(1),
            compute_rate: 50.,
            memory: 128,
            bandwidth: 100,
            storage: 500,
            energy,
            count: Some(count),
        };
        Self {
            seed: 123,
            shared_host_pool: false,
            shrink_on_failure: false,
            latency: TierLatency::default(),
            slots: vec![slot(Tier::Elastic, 5., 2), slot(Tier::MidTier, 3., 5), slot(Tier::Constrained, 1., 10)],
            hosts: vec![
                HostConfig {
                    name: Some("cloud-0".to_string()),
                    name_prefix: None,
                    tier: Tier::Elastic,
                    cores: 4,
                    compute_rate_per_core: 10000.,
                    memory: 16384,
                    bandwidth: 10000,
                    storage: 1000000,
                    count: None,
                },
                HostConfig {
                    name: Some("cloud-1".to_string()),
                    name_prefix: None,
                    tier: Tier::Elastic,
                    cores: 8,
                    compute_rate_per_core: 8000.,
                    memory: 32768,
                    bandwidth: 10000,
                    storage: 2000000,
                    count: None,
                },
                HostConfig {
                    name: None,
                    name_prefix: Some("fog-".to_string()),
                    tier: Tier::MidTier,
                    cores: 2,
                    compute_rate_per_core: 2000.,
                    memory: 8192,
                    bandwidth: 1000,
                    storage: 500000,
                    count: Some(5),
                },
                HostConfig {
                    name: None,
                    name_prefix: Some("iot-".to_string()),
                    tier: Tier::Constrained,
                    cores: 1,
                    compute_rate_per_core: 1000.,
                    memory: 2048,
                    bandwidth: 1000,
                    storage: 1000000,
                    count: Some(10),
                },
            ],
            tasks: TasksConfig::default(),
            policies: vec![
                "RoundRobin".to_string(),
                "EnergyAware".to_string(),
                "DeadlineAware".to_string(),
                "MultiClassifier".to_string(),
            ],
        }
    }
}
