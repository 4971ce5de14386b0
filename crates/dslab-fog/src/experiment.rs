//! Tools for running experiments with one scenario run per offloading policy.

use std::fs;
use std::fs::File;
use std::sync::{Arc, Mutex};

use indexmap::map::IndexMap;
use log::{info, warn};
use serde::Serialize;
use thiserror::Error;
use threadpool::ThreadPool;

use crate::core::config::ScenarioConfig;
use crate::core::errors::ConfigError;
use crate::core::offloading_policy::policy_resolver;
use crate::report::RunReport;
use crate::scenario::FogScenario;
use crate::workload::generate_tasks;

#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("can't write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("can't serialize results: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0} of {1} runs did not finish")]
    Incomplete(usize, usize),
}

/// Implements execution of experiment.
pub struct Experiment {
    pub config: ScenarioConfig,
    pub policies: Vec<String>,
    pub out_dir: Option<String>,
}

#[derive(Serialize)]
struct RunEntry {
    id: usize,
    policy: String,
    results: IndexMap<String, String>,
    report: RunReport,
}

impl Experiment {
    /// Creates experiment running the given policies, or the policies from config if the list is empty.
    pub fn new(config: ScenarioConfig, policies: Vec<String>, out_dir: Option<String>) -> Self {
        let policies = if policies.is_empty() {
            config.policies.clone()
        } else {
            policies
        };
        Self {
            config,
            policies,
            out_dir,
        }
    }

    /// Runs the experiment using the specified number of threads and returns reports in policy order.
    pub fn run(&self, num_threads: usize) -> Result<Vec<RunReport>, ExperimentError> {
        // fail before spawning anything if some policy can't be resolved
        for policy in &self.policies {
            policy_resolver(policy)?;
        }
        if let Some(dir) = &self.out_dir {
            fs::create_dir_all(dir).map_err(|source| ExperimentError::Io {
                path: dir.clone(),
                source,
            })?;
        }

        let tasks = Arc::new(generate_tasks(&self.config.tasks, self.config.seed));
        let results = Arc::new(Mutex::new(Vec::new()));
        let pool = ThreadPool::new(num_threads.max(1));

        for (run_id, policy) in self.policies.iter().enumerate() {
            let config = self.config.clone();
            let policy = policy.clone();
            let tasks = tasks.clone();
            let results = results.clone();
            let csv_file = self.out_dir.as_ref().map(|dir| format!("{}/run_{}.csv", dir, run_id + 1));

            pool.execute(move || {
                info!("RUN {}: {}", run_id + 1, policy);
                let mut scenario = match FogScenario::from_policy_str(config, &policy) {
                    Ok(scenario) => scenario,
                    Err(e) => {
                        warn!("Run {} skipped: {}", run_id + 1, e);
                        return;
                    }
                };
                let report = scenario.run(&tasks);
                if let Some(csv_file) = csv_file {
                    match report.save_csv(&csv_file) {
                        Ok(_) => info!("Tasks of run {} saved to file: {}", run_id + 1, csv_file),
                        Err(e) => warn!("Error while saving tasks of run {}: {}", run_id + 1, e),
                    }
                }
                if let Ok(mut results) = results.lock() {
                    results.push((run_id, policy, report));
                }
            });
        }

        pool.join();
        let mut results = match results.lock() {
            Ok(results) => results.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        if results.len() != self.policies.len() {
            return Err(ExperimentError::Incomplete(
                self.policies.len() - results.len(),
                self.policies.len(),
            ));
        }
        results.sort_by_key(|(run_id, _, _)| *run_id);

        if let Some(dir) = &self.out_dir {
            let entries: Vec<RunEntry> = results
                .iter()
                .map(|(run_id, policy, report)| RunEntry {
                    id: run_id + 1,
                    policy: policy.clone(),
                    results: report.summary(),
                    report: report.clone(),
                })
                .collect();
            let path = format!("{}/results.json", dir);
            let mut file = File::create(&path).map_err(|source| ExperimentError::Io { path, source })?;
            serde_json::to_writer_pretty(&mut file, &entries)?;
        }

        Ok(results.into_iter().map(|(_, _, report)| report).collect())
    }
}
