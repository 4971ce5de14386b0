//! Offloading policy implementations.

pub mod common;
pub mod deadline_aware;
pub mod energy_aware;
pub mod multi_classifier;
pub mod round_robin;
