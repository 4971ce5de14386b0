//! Errors returned by placement, allocation and scenario configuration.

use thiserror::Error;

use crate::core::allocator::AllocationFailure;
use crate::core::host::HostId;
use crate::core::slot::SlotId;
use crate::core::tier::Tier;

/// Offloading policy could not choose a slot.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum PlacementError {
    /// No slot passed the tier filter of the policy. The caller is expected to apply a fallback.
    #[error("no eligible slot for task {task_id} (tier filter: {tier:?})")]
    NoEligibleSlot { task_id: u64, tier: Option<Tier> },
}

/// Allocator could not bind (or look up) a slot.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum AllocationError {
    /// Every host of the pool was examined and rejected.
    #[error("{0}")]
    Exhausted(AllocationFailure),
    #[error("slot {slot_id} is already bound to host {host_id}")]
    AlreadyBound { slot_id: SlotId, host_id: HostId },
    #[error("slot {slot_id} belongs to tier {tier} which is not served by allocator {allocator}")]
    TierNotServed {
        slot_id: SlotId,
        tier: Tier,
        allocator: String,
    },
    #[error("slot {0} is not bound to any host")]
    UnknownSlot(SlotId),
}

/// Errors related to a finished scenario run.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum RunError {
    #[error("task {0} was not submitted in this run")]
    UnknownTask(u64),
    #[error("task {task_id} was submitted but not placed: {reason}")]
    TaskFailed { task_id: u64, reason: String },
}

/// Errors of reading and resolving scenario configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("can't read file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("can't parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unknown offloading policy: {0}")]
    UnknownPolicy(String),
    #[error("invalid value {value:?} of option {option} for policy {policy}")]
    InvalidOption {
        policy: String,
        option: String,
        value: String,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}
