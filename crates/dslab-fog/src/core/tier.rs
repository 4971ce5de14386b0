//! Capability tiers and the tier-to-tier latency model.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Capability class of execution slots and hosts.
///
/// Tiers are ordered from the most constrained (edge devices) to the most capable (back-end cloud).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Edge devices (IoT nodes).
    Constrained,
    /// Gateway nodes (fog).
    MidTier,
    /// Elastic back-end (cloud).
    Elastic,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Elastic, Tier::MidTier, Tier::Constrained];

    /// Returns the deadline in ms used for tasks bound to this tier when the task carries no deadline.
    pub fn default_deadline(&self) -> f64 {
        match self {
            Tier::Constrained => 1000.,
            Tier::MidTier => 5000.,
            Tier::Elastic => 10000.,
        }
    }

    /// Returns the energy in joules spent per MI of computation in this tier.
    pub fn energy_per_mi(&self) -> f64 {
        match self {
            Tier::Constrained => 0.0001,
            Tier::MidTier => 0.0003,
            Tier::Elastic => 0.0005,
        }
    }

    fn level(&self) -> u8 {
        match self {
            Tier::Constrained => 0,
            Tier::MidTier => 1,
            Tier::Elastic => 2,
        }
    }
}

impl Display for Tier {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            Tier::Constrained => write!(f, "constrained"),
            Tier::MidTier => write!(f, "mid_tier"),
            Tier::Elastic => write!(f, "elastic"),
        }
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "constrained" | "iot" | "edge" => Ok(Tier::Constrained),
            "mid_tier" | "midtier" | "fog" | "gateway" => Ok(Tier::MidTier),
            "elastic" | "cloud" => Ok(Tier::Elastic),
            _ => Err(format!("unknown tier: {}", s)),
        }
    }
}

/// Latency lookup between tiers, in milliseconds.
///
/// Implementations must be pure: the same pair of tiers always yields the same latency.
pub trait LatencyModel {
    fn latency(&self, from: Tier, to: Tier) -> f64;

    /// Uplink plus downlink latency between the task origin and the target tier.
    fn round_trip(&self, origin: Tier, target: Tier) -> f64 {
        self.latency(origin, target) + self.latency(target, origin)
    }
}

/// Latency model of a three-level hierarchy where traffic between non-adjacent tiers passes through the middle one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TierLatency {
    /// Latency of a link between constrained and mid tier.
    pub constrained_to_mid_tier: f64,
    /// Latency of a link between mid tier and elastic tier.
    pub mid_tier_to_elastic: f64,
}

impl TierLatency {
    pub fn new(constrained_to_mid_tier: f64, mid_tier_to_elastic: f64) -> Self {
        Self {
            constrained_to_mid_tier,
            mid_tier_to_elastic,
        }
    }
}

impl Default for TierLatency {
    fn default() -> Self {
        Self::new(2., 20.)
    }
}

impl LatencyModel for TierLatency {
    fn latency(&self, from: Tier, to: Tier) -> f64 {
        let (low, high) = if from.level() <= to.level() { (from, to) } else { (to, from) };
        match (low, high) {
            (a, b) if a == b => 0.,
            (Tier::Constrained, Tier::MidTier) => self.constrained_to_mid_tier,
            (Tier::MidTier, Tier::Elastic) => self.mid_tier_to_elastic,
            _ => self.constrained_to_mid_tier + self.mid_tier_to_elastic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latency_is_symmetric_and_additive() {
        let latency = TierLatency::default();
        assert_eq!(latency.latency(Tier::Constrained, Tier::Constrained), 0.);
        assert_eq!(latency.latency(Tier::Constrained, Tier::MidTier), 2.);
        assert_eq!(latency.latency(Tier::Elastic, Tier::MidTier), 20.);
        assert_eq!(latency.latency(Tier::Elastic, Tier::Constrained), 22.);
        assert_eq!(latency.round_trip(Tier::Constrained, Tier::Elastic), 44.);
    }

    #[test]
    fn tier_names() {
        assert_eq!("fog".parse::<Tier>(), Ok(Tier::MidTier));
        assert_eq!("Cloud".parse::<Tier>(), Ok(Tier::Elastic));
        assert!("moon".parse::<Tier>().is_err());
        assert_eq!(Tier::MidTier.to_string(), "mid_tier");
    }
}
