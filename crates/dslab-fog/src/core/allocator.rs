//! Tiered allocation policy binding slots to physical hosts.

use std::collections::{BTreeSet, HashMap};
use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::core::errors::AllocationError;
use crate::core::host::{Dimension, HostDescriptor, HostId, HostPool, HostState, Shortfall};
use crate::core::slot::{ResourceSlot, SlotDemand, SlotId};
use crate::core::tier::Tier;

/// Host rejected during a first-fit scan together with all unsatisfied dimensions.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HostRejection {
    pub host_id: HostId,
    pub shortfalls: Vec<Shortfall>,
}

impl HostRejection {
    pub fn dimensions(&self) -> Vec<Dimension> {
        self.shortfalls.iter().map(|s| s.dimension).collect()
    }
}

/// Result of a first-fit scan which found no suitable host.
///
/// Contains a rejection for every examined host in scan order. An empty list means that the pool has no hosts.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AllocationFailure {
    pub slot_id: SlotId,
    pub tier: Tier,
    pub rejections: Vec<HostRejection>,
}

impl AllocationFailure {
    /// Returns dimensions which failed on the given host, or `None` if the host was not examined.
    pub fn failed_dimensions(&self, host_id: HostId) -> Option<Vec<Dimension>> {
        self.rejections
            .iter()
            .find(|r| r.host_id == host_id)
            .map(|r| r.dimensions())
    }

    /// Derives a reduced demand that fits the first examined host which can hold a non-degenerate slot.
    ///
    /// Every failing dimension is cut down to what the host has available; the rest of the demand is kept.
    pub fn fitting_demand(&self, demand: &SlotDemand) -> Option<SlotDemand> {
        self.rejections.iter().find_map(|rejection| {
            let mut fitted = demand.clone();
            let mut compute_available = None;
            for shortfall in &rejection.shortfalls {
                match shortfall.dimension {
                    Dimension::Cores => fitted.cores = shortfall.available as u32,
                    Dimension::Compute => compute_available = Some(shortfall.available),
                    Dimension::Memory => fitted.memory = shortfall.available as u64,
                    Dimension::Bandwidth => fitted.bandwidth = shortfall.available as u64,
                    Dimension::Storage => fitted.storage = shortfall.available as u64,
                }
            }
            if fitted.cores == 0 || fitted.memory == 0 {
                return None;
            }
            if let Some(available) = compute_available {
                if fitted.total_compute_rate() > available {
                    fitted.compute_rate = available / fitted.cores as f64;
                }
            }
            if fitted.compute_rate <= 0. {
                return None;
            }
            Some(fitted)
        })
    }
}

impl Display for AllocationFailure {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.rejections.is_empty() {
            return write!(f, "no hosts to allocate slot {} ({})", self.slot_id, self.tier);
        }
        write!(f, "no host fits slot {} ({}):", self.slot_id, self.tier)?;
        for rejection in &self.rejections {
            write!(f, " host {} lacks", rejection.host_id)?;
            for shortfall in &rejection.shortfalls {
                write!(
                    f,
                    " {:?} (needs {}, has {})",
                    shortfall.dimension, shortfall.required, shortfall.available
                )?;
            }
            write!(f, ";")?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
struct Binding {
    host_position: usize,
    demand: SlotDemand,
}

/// Binds slots of the served tiers to hosts of its exclusively owned pool using first fit.
///
/// Hosts are scanned in the order they were supplied. Each slot is bound to exactly one host with all of its
/// resource dimensions or not bound at all. A pool shared by several tiers is modelled as a single allocator
/// serving all of them, so that updates to the pool are serialized.
pub struct TieredAllocator {
    name: String,
    tiers: BTreeSet<Tier>,
    pool: HostPool,
    bindings: HashMap<SlotId, Binding>,
}

impl TieredAllocator {
    /// Creates allocator serving a single tier.
    pub fn new(name: &str, tier: Tier, hosts: Vec<HostDescriptor>) -> Self {
        Self::with_tiers(name, [tier], hosts)
    }

    /// Creates allocator serving all tiers from one pool.
    pub fn shared(name: &str, hosts: Vec<HostDescriptor>) -> Self {
        Self::with_tiers(name, Tier::ALL, hosts)
    }

    pub fn with_tiers<I: IntoIterator<Item = Tier>>(name: &str, tiers: I, hosts: Vec<HostDescriptor>) -> Self {
        Self {
            name: name.to_string(),
            tiers: tiers.into_iter().collect(),
            pool: HostPool::from_hosts(hosts),
            bindings: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn serves(&self, tier: Tier) -> bool {
        self.tiers.contains(&tier)
    }

    pub fn pool(&self) -> &HostPool {
        &self.pool
    }

    /// Binds the slot to the first host which satisfies all of its resource demands.
    pub fn bind(&mut self, slot: &ResourceSlot) -> Result<HostId, AllocationError> {
        if !self.serves(slot.tier) {
            return Err(AllocationError::TierNotServed {
                slot_id: slot.id,
                tier: slot.tier,
                allocator: self.name.clone(),
            });
        }
        if let Some(host_id) = self.lookup(slot.id) {
            return Err(AllocationError::AlreadyBound {
                slot_id: slot.id,
                host_id,
            });
        }

        let mut rejections = Vec::new();
        let mut chosen = None;
        for (position, host) in self.pool.iter().enumerate() {
            let shortfalls = host.shortfalls(&slot.demand);
            if shortfalls.is_empty() {
                chosen = Some(position);
                break;
            }
            rejections.push(HostRejection {
                host_id: host.id(),
                shortfalls,
            });
        }

        match chosen {
            Some(position) => {
                self.pool.take(position, &slot.demand);
                self.bindings.insert(
                    slot.id,
                    Binding {
                        host_position: position,
                        demand: slot.demand.clone(),
                    },
                );
                Ok(self.pool.state(position).id())
            }
            None => Err(AllocationError::Exhausted(AllocationFailure {
                slot_id: slot.id,
                tier: slot.tier,
                rejections,
            })),
        }
    }

    /// Releases resources held by the slot. Returns the host the slot was bound to, if any.
    pub fn release(&mut self, slot_id: SlotId) -> Option<HostId> {
        let binding = self.bindings.remove(&slot_id)?;
        self.pool.give_back(binding.host_position, &binding.demand);
        Some(self.pool.state(binding.host_position).id())
    }

    /// Returns the host the slot is bound to.
    pub fn lookup(&self, slot_id: SlotId) -> Option<HostId> {
        self.bindings
            .get(&slot_id)
            .map(|binding| self.pool.state(binding.host_position).id())
    }

    /// Same as [`lookup`](Self::lookup), for call sites which can not proceed without a binding.
    pub fn host_of(&self, slot_id: SlotId) -> Result<HostId, AllocationError> {
        self.lookup(slot_id).ok_or(AllocationError::UnknownSlot(slot_id))
    }

    /// Checks whether the slot could be placed on the given host right now, without binding it.
    ///
    /// Returns `None` for a host which does not belong to the pool.
    pub fn check(&self, slot: &ResourceSlot, host_id: HostId) -> Option<Vec<Shortfall>> {
        self.pool
            .position(host_id)
            .map(|position| self.pool.state(position).shortfalls(&slot.demand))
    }

    /// Returns the number of currently bound slots.
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// Returns the current state of all hosts in scan order.
    pub fn utilization(&self) -> Vec<HostState> {
        self.pool.iter().cloned().collect()
    }

    /// Releases all bindings, restoring the pool to its initial state.
    pub fn reset(&mut self) {
        let slots: Vec<SlotId> = self.bindings.keys().copied().collect();
        for slot_id in slots {
            self.release(slot_id);
        }
    }
}
