//! Physical hosts and the pool of their free resources.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::slot::SlotDemand;
use crate::core::tier::Tier;

pub type HostId = u32;

/// Static characteristics of a physical host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HostDescriptor {
    pub id: HostId,
    pub name: String,
    pub tier: Tier,
    pub cores: u32,
    /// Compute rate of a single core in MIPS.
    pub compute_rate_per_core: f64,
    /// Memory in MB.
    pub memory: u64,
    pub bandwidth: u64,
    /// Storage in MB.
    pub storage: u64,
}

impl HostDescriptor {
    pub fn total_compute_rate(&self) -> f64 {
        self.compute_rate_per_core * self.cores as f64
    }
}

/// Resource dimension checked when placing a slot on a host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Cores,
    Compute,
    Memory,
    Bandwidth,
    Storage,
}

/// Single unsatisfied resource dimension of a host.
///
/// Integer dimensions are reported as exact integral values.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Shortfall {
    pub dimension: Dimension,
    pub required: f64,
    pub available: f64,
}

/// Host characteristics together with the currently free resources.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HostState {
    pub descriptor: HostDescriptor,
    pub free_cores: u32,
    pub free_memory: u64,
    pub free_bandwidth: u64,
    pub free_storage: u64,
}

impl HostState {
    pub fn new(descriptor: HostDescriptor) -> Self {
        Self {
            free_cores: descriptor.cores,
            free_memory: descriptor.memory,
            free_bandwidth: descriptor.bandwidth,
            free_storage: descriptor.storage,
            descriptor,
        }
    }

    pub fn id(&self) -> HostId {
        self.descriptor.id
    }

    /// Returns all dimensions in which the host can not satisfy the demand (empty if the demand fits).
    pub fn shortfalls(&self, demand: &SlotDemand) -> Vec<Shortfall> {
        let mut result = Vec::new();
        if self.free_cores < demand.cores {
            result.push(Shortfall {
                dimension: Dimension::Cores,
                required: demand.cores as f64,
                available: self.free_cores as f64,
            });
        }
        if self.descriptor.total_compute_rate() < demand.total_compute_rate() {
            result.push(Shortfall {
                dimension: Dimension::Compute,
                required: demand.total_compute_rate(),
                available: self.descriptor.total_compute_rate(),
            });
        }
        if self.free_memory < demand.memory {
            result.push(Shortfall {
                dimension: Dimension::Memory,
                required: demand.memory as f64,
                available: self.free_memory as f64,
            });
        }
        if self.free_bandwidth < demand.bandwidth {
            result.push(Shortfall {
                dimension: Dimension::Bandwidth,
                required: demand.bandwidth as f64,
                available: self.free_bandwidth as f64,
            });
        }
        if self.free_storage < demand.storage {
            result.push(Shortfall {
                dimension: Dimension::Storage,
                required: demand.storage as f64,
                available: self.free_storage as f64,
            });
        }
        result
    }

    fn take(&mut self, demand: &SlotDemand) {
        self.free_cores -= demand.cores;
        self.free_memory -= demand.memory;
        self.free_bandwidth -= demand.bandwidth;
        self.free_storage -= demand.storage;
    }

    fn give_back(&mut self, demand: &SlotDemand) {
        self.free_cores += demand.cores;
        self.free_memory += demand.memory;
        self.free_bandwidth += demand.bandwidth;
        self.free_storage += demand.storage;
    }

    /// Returns the core allocation rate (ratio of allocated to total cores).
    pub fn cores_load(&self) -> f64 {
        if self.descriptor.cores == 0 {
            return 0.;
        }
        1. - self.free_cores as f64 / self.descriptor.cores as f64
    }

    /// Returns the memory allocation rate (ratio of allocated to total memory).
    pub fn memory_load(&self) -> f64 {
        if self.descriptor.memory == 0 {
            return 0.;
        }
        1. - self.free_memory as f64 / self.descriptor.memory as f64
    }
}

/// Ordered collection of hosts with their free resources.
///
/// Hosts are scanned in insertion order.
#[derive(Clone, Debug, Default)]
pub struct HostPool {
    hosts: Vec<HostState>,
    index: HashMap<HostId, usize>,
}

impl HostPool {
    /// Creates empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_hosts(hosts: Vec<HostDescriptor>) -> Self {
        let mut pool = Self::new();
        for host in hosts {
            pool.add_host(host);
        }
        pool
    }

    /// Adds host to the end of the scan order. Host IDs must be unique within a pool.
    pub fn add_host(&mut self, descriptor: HostDescriptor) {
        self.index.insert(descriptor.id, self.hosts.len());
        self.hosts.push(HostState::new(descriptor));
    }

    pub fn get(&self, host_id: HostId) -> Option<&HostState> {
        self.index.get(&host_id).map(|&i| &self.hosts[i])
    }

    /// Iterates over hosts in scan order.
    pub fn iter(&self) -> impl Iterator<Item = &HostState> {
        self.hosts.iter()
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub(crate) fn position(&self, host_id: HostId) -> Option<usize> {
        self.index.get(&host_id).copied()
    }

    pub(crate) fn state(&self, position: usize) -> &HostState {
        &self.hosts[position]
    }

    pub(crate) fn take(&mut self, position: usize, demand: &SlotDemand) {
        self.hosts[position].take(demand);
    }

    pub(crate) fn give_back(&mut self, position: usize, demand: &SlotDemand) {
        self.hosts[position].give_back(demand);
    }
}
