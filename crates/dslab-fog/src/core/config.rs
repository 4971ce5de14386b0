//! Scenario configuration.

pub mod options;
pub mod scenario_config;

pub use scenario_config::{HostConfig, ScenarioConfig, SlotConfig, TasksConfig};
