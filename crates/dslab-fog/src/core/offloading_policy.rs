//! Task offloading policies.

use crate::core::config::options::ConfigOptions;
use crate::core::errors::{ConfigError, PlacementError};
use crate::core::load::LoadCounters;
use crate::core::offloading_policies::common::TieBreak;
use crate::core::offloading_policies::deadline_aware::DeadlineAware;
use crate::core::offloading_policies::energy_aware::EnergyAware;
use crate::core::offloading_policies::multi_classifier::MultiClassifier;
use crate::core::offloading_policies::round_robin::RoundRobin;
use crate::core::slot::{SlotCatalog, SlotId};
use crate::core::task::Task;
use crate::core::tier::LatencyModel;

/// Trait for implementation of task offloading policies.
///
/// The policy is defined as a function of task, slot catalog and tier latencies, which returns an ID of the slot
/// selected for task execution or [`PlacementError::NoEligibleSlot`] if no slot passes the policy's tier filter.
///
/// Policies may keep per-run state (load counters, decision caches). This state belongs to a single policy
/// instance and is cleared by [`reset`](OffloadingPolicy::reset), which must be called before every run.
/// Given identical state and inputs, the decision is deterministic.
pub trait OffloadingPolicy {
    fn name(&self) -> &str;

    fn select_slot(
        &mut self,
        task: &Task,
        catalog: &SlotCatalog,
        latency: &dyn LatencyModel,
    ) -> Result<SlotId, PlacementError>;

    /// Number of tasks routed to each slot in the current run.
    fn load(&self) -> &LoadCounters;

    fn reset(&mut self);
}

/// Creates policy from its config string, e.g. `RoundRobin[window=10]` or `EnergyAware[tie_break=random,seed=7]`.
///
/// Resolution happens once when the scenario is configured.
pub fn policy_resolver(config_str: &str) -> Result<Box<dyn OffloadingPolicy>, ConfigError> {
    let options = ConfigOptions::parse(config_str);
    match options.name() {
        "RoundRobin" => {
            let window = option_or(&options, "window", 10usize)?;
            if window == 0 {
                return Err(invalid_option(&options, "window", "0"));
            }
            Ok(Box::new(RoundRobin::with_window(window)))
        }
        "EnergyAware" => Ok(Box::new(EnergyAware::new(tie_break(&options)?))),
        "DeadlineAware" => Ok(Box::new(DeadlineAware::new(tie_break(&options)?))),
        "MultiClassifier" | "MCEETO" => Ok(Box::new(MultiClassifier::new())),
        _ => Err(ConfigError::UnknownPolicy(config_str.to_string())),
    }
}

fn tie_break(options: &ConfigOptions) -> Result<TieBreak, ConfigError> {
    match options.raw("tie_break") {
        None | Some("first") => Ok(TieBreak::FirstInCatalog),
        Some("random") => Ok(TieBreak::random(option_or(options, "seed", 123u64)?)),
        Some(other) => Err(invalid_option(options, "tie_break", other)),
    }
}

fn option_or<T: std::str::FromStr>(options: &ConfigOptions, option: &str, default: T) -> Result<T, ConfigError> {
    options
        .get::<T>(option)
        .map(|value| value.unwrap_or(default))
        .map_err(|value| invalid_option(options, option, &value))
}

fn invalid_option(options: &ConfigOptions, option: &str, value: &str) -> ConfigError {
    ConfigError::InvalidOption {
        policy: options.name().to_string(),
        option: option.to_string(),
        value: value.to_string(),
    }
}
