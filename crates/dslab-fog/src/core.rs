//! Placement core: classification, offloading policies and tiered allocation.

pub mod allocator;
pub mod classifier;
pub mod config;
pub mod errors;
pub mod host;
pub mod load;
pub mod offloading_policies;
pub mod offloading_policy;
pub mod slot;
pub mod task;
pub mod tier;
