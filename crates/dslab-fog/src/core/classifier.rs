//! Task classification by computational and data weight.

use std::fmt::{Display, Formatter};

use serde::Serialize;

/// Tasks with at least this demand (in MI) are compute heavy.
pub const HIGH_COMPUTE_THRESHOLD: f64 = 30000.;
/// Tasks with at least this demand (in MI) and below the high threshold are medium.
pub const MEDIUM_COMPUTE_THRESHOLD: f64 = 20000.;
/// Tasks moving at least this amount of data (in bytes) are data heavy.
pub const LARGE_DATA_THRESHOLD: f64 = 1000.;
/// Tasks moving at least this amount of data (in bytes) and below the large threshold are medium.
pub const MEDIUM_DATA_THRESHOLD: f64 = 500.;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComputeWeight {
    Low,
    Medium,
    High,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataWeight {
    Low,
    Medium,
    High,
}

impl ComputeWeight {
    pub fn of(compute_demand: f64) -> Self {
        let demand = compute_demand.max(0.);
        if demand >= HIGH_COMPUTE_THRESHOLD {
            ComputeWeight::High
        } else if demand >= MEDIUM_COMPUTE_THRESHOLD {
            ComputeWeight::Medium
        } else {
            ComputeWeight::Low
        }
    }
}

impl DataWeight {
    pub fn of(data_size: f64) -> Self {
        let size = data_size.max(0.);
        if size >= LARGE_DATA_THRESHOLD {
            DataWeight::High
        } else if size >= MEDIUM_DATA_THRESHOLD {
            DataWeight::Medium
        } else {
            DataWeight::Low
        }
    }
}

/// Task category produced by the classifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum TaskCategory {
    HighComputeLowData,
    HighComputeHighData,
    MediumComputeMediumData,
    MediumComputeHighData,
    LowComputeLowData,
    LowComputeHighData,
}

impl Display for TaskCategory {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            TaskCategory::HighComputeLowData => write!(f, "high_compute_low_data"),
            TaskCategory::HighComputeHighData => write!(f, "high_compute_high_data"),
            TaskCategory::MediumComputeMediumData => write!(f, "medium_compute_medium_data"),
            TaskCategory::MediumComputeHighData => write!(f, "medium_compute_high_data"),
            TaskCategory::LowComputeLowData => write!(f, "low_compute_low_data"),
            TaskCategory::LowComputeHighData => write!(f, "low_compute_high_data"),
        }
    }
}

/// Classifies task by its computational demand (MI) and data size (bytes).
///
/// Negative and NaN inputs are treated as zero. Medium compute tasks with little data fall into
/// [`TaskCategory::LowComputeLowData`], and compute-heavy tasks do not distinguish medium from large data.
pub fn classify(compute_demand: f64, data_size: f64) -> TaskCategory {
    match (ComputeWeight::of(compute_demand), DataWeight::of(data_size)) {
        (ComputeWeight::High, DataWeight::Low) => TaskCategory::HighComputeLowData,
        (ComputeWeight::High, _) => TaskCategory::HighComputeHighData,
        (ComputeWeight::Medium, DataWeight::Medium) => TaskCategory::MediumComputeMediumData,
        (ComputeWeight::Medium, DataWeight::High) => TaskCategory::MediumComputeHighData,
        (ComputeWeight::Medium, DataWeight::Low) => TaskCategory::LowComputeLowData,
        (ComputeWeight::Low, DataWeight::Low) => TaskCategory::LowComputeLowData,
        (ComputeWeight::Low, _) => TaskCategory::LowComputeHighData,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(30000., 0., TaskCategory::HighComputeLowData)]
    #[case(45000., 499., TaskCategory::HighComputeLowData)]
    #[case(30000., 500., TaskCategory::HighComputeHighData)]
    #[case(30000., 5000., TaskCategory::HighComputeHighData)]
    #[case(20000., 500., TaskCategory::MediumComputeMediumData)]
    #[case(29999., 999., TaskCategory::MediumComputeMediumData)]
    #[case(25000., 1000., TaskCategory::MediumComputeHighData)]
    #[case(25000., 100., TaskCategory::LowComputeLowData)]
    #[case(19999., 499., TaskCategory::LowComputeLowData)]
    #[case(100., 500., TaskCategory::LowComputeHighData)]
    #[case(100., 3000., TaskCategory::LowComputeHighData)]
    fn thresholds(#[case] compute: f64, #[case] data: f64, #[case] expected: TaskCategory) {
        assert_eq!(classify(compute, data), expected);
    }

    #[rstest]
    #[case(-5., -5.)]
    #[case(f64::NAN, f64::NAN)]
    #[case(-1e9, 0.)]
    fn negative_and_nan_are_zero(#[case] compute: f64, #[case] data: f64) {
        assert_eq!(classify(compute, data), classify(0., 0.));
        assert_eq!(classify(compute, data), TaskCategory::LowComputeLowData);
    }

    #[test]
    fn classification_is_deterministic() {
        for compute in [0., 19999.9, 20000., 29999.9, 30000., 1e12, f64::INFINITY] {
            for data in [0., 499.9, 500., 999.9, 1000., 1e12] {
                assert_eq!(classify(compute, data), classify(compute, data));
            }
        }
    }
}
