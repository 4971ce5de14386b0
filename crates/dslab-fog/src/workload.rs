//! Generation of submitted tasks.

use rand::prelude::*;
use rand_pcg::Pcg64;

use crate::core::config::TasksConfig;
use crate::core::task::Task;

/// Produces the tasks of a scenario run.
///
/// An explicit task list is returned as is. Otherwise tasks with IDs `0..count` are generated with uniformly
/// distributed demand and data sizes using a generator seeded with `seed`, so equal seeds give equal workloads.
pub fn generate_tasks(config: &TasksConfig, seed: u64) -> Vec<Task> {
    if let Some(list) = &config.list {
        return list.clone();
    }

    let defaults = TasksConfig::default();
    let count = config.count.or(defaults.count).unwrap_or(0);
    let compute = config.compute.or(defaults.compute).unwrap_or((0., 0.));
    let data_in = config.data_in.or(defaults.data_in).unwrap_or((0, 0));
    let data_out = config.data_out.or(defaults.data_out).unwrap_or((0, 0));

    let mut rng = Pcg64::seed_from_u64(seed);
    (0..count as u64)
        .map(|id| {
            let mut task = Task::new(
                id,
                sample_f64(&mut rng, compute).floor(),
                sample_u64(&mut rng, data_in),
                sample_u64(&mut rng, data_out),
            );
            task.affinity = config.affinity;
            task.deadline = config.deadline;
            task
        })
        .collect()
}

fn sample_f64(rng: &mut Pcg64, (from, to): (f64, f64)) -> f64 {
    if from < to && (to - from).is_finite() {
        rng.gen_range(from..to)
    } else {
        from
    }
}

fn sample_u64(rng: &mut Pcg64, (from, to): (u64, u64)) -> u64 {
    if from < to {
        rng.gen_range(from..to)
    } else {
        from
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tasks_are_reproducible_and_in_range() {
        let config = TasksConfig::default();
        let tasks = generate_tasks(&config, 123);
        assert_eq!(tasks.len(), 10);
        assert_eq!(tasks, generate_tasks(&config, 123));
        assert_ne!(tasks, generate_tasks(&config, 124));
        for (i, task) in tasks.iter().enumerate() {
            assert_eq!(task.id, i as u64);
            assert!((10000. ..50000.).contains(&task.compute_demand));
            assert!((500..2000).contains(&task.data_in));
            assert!((300..1300).contains(&task.data_out));
        }
    }

    #[test]
    fn explicit_list_is_kept() {
        let config = TasksConfig {
            list: Some(vec![Task::new(7, 1., 2, 3)]),
            ..TasksConfig::default()
        };
        assert_eq!(generate_tasks(&config, 1), vec![Task::new(7, 1., 2, 3)]);
    }

    #[test]
    fn unbounded_compute_range_does_not_panic() {
        let config = TasksConfig {
            compute: Some((1000., f64::INFINITY)),
            ..TasksConfig::default()
        };
        let tasks = generate_tasks(&config, 1);
        assert!(tasks.iter().all(|t| t.compute_demand == 1000.));
    }
}
