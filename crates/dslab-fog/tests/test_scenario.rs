use dslab_fog::core::config::ScenarioConfig;
use dslab_fog::core::errors::{ConfigError, RunError};
use dslab_fog::core::offloading_policies::energy_aware::EnergyAware;
use dslab_fog::core::offloading_policies::round_robin::RoundRobin;
use dslab_fog::core::task::Task;
use dslab_fog::core::tier::Tier;
use dslab_fog::experiment::{Experiment, ExperimentError};
use dslab_fog::scenario::FogScenario;
use dslab_fog::workload::generate_tasks;

fn name_wrapper(file_name: &str) -> String {
    format!("test-configs/{}", file_name)
}

fn load_config(file_name: &str) -> ScenarioConfig {
    let _ = env_logger::builder().is_test(true).try_init();
    ScenarioConfig::from_file(&name_wrapper(file_name)).unwrap()
}

#[test]
fn round_robin_scenario() {
    let config = load_config("three-tier.yaml");
    let tasks = generate_tasks(&config.tasks, config.seed);
    let mut scenario = FogScenario::new(config, Box::new(RoundRobin::new()));
    let report = scenario.run(&tasks);

    assert_eq!(report.policy, "RoundRobin");
    assert_eq!(report.submitted, 10);
    assert_eq!(report.placements.len(), 10);
    assert!(report.failed_tasks.is_empty());
    assert!(report.allocation_failures.is_empty());
    assert_eq!(report.success_rate(), 100.);
    assert_eq!(report.fallback_count(), 0);

    let distribution = report.tier_distribution();
    assert_eq!(distribution[&Tier::Elastic], 2);
    assert_eq!(distribution[&Tier::MidTier], 5);
    assert_eq!(distribution[&Tier::Constrained], 3);

    // both elastic slots fit the single cloud host
    assert_eq!(report.slot_bindings[0].host_id, Some(0));
    assert_eq!(report.slot_bindings[1].host_id, Some(0));
    assert_eq!(scenario.host_of(2), Some(1));

    let first = scenario.placement_of(tasks[0].id).unwrap();
    assert_eq!(first.slot_id, 0);
    assert_eq!(first.execution_ms, tasks[0].compute_demand / 50. * 1000.);
    assert_eq!(first.transmission_ms, 44. + tasks[0].data_size() as f64 / 1000.);
    assert_eq!(first.energy, tasks[0].compute_demand * Tier::Elastic.energy_per_mi());
    assert!(report.max_execution_ms() >= report.min_execution_ms());
    let last = scenario.placement_of(tasks[9].id).unwrap();
    assert_eq!(last.tier, Tier::Constrained);
    assert_eq!(last.transmission_ms, tasks[9].data_size() as f64 / 1000.);
}

#[test]
fn repeated_runs_give_identical_reports() {
    let config = load_config("three-tier.yaml");
    let tasks = generate_tasks(&config.tasks, config.seed);
    for policy in ["RoundRobin", "EnergyAware[tie_break=random,seed=5]", "DeadlineAware", "MCEETO"] {
        let mut scenario = FogScenario::from_policy_str(config.clone(), policy).unwrap();
        let first = scenario.run(&tasks);
        let second = scenario.run(&tasks);

        assert_eq!(first.placements, second.placements);
        assert_eq!(first.slot_bindings, second.slot_bindings);
        assert_eq!(first.load, second.load);
        assert_eq!(first.summary(), second.summary());
        assert_eq!(second.load.total(), 10);
    }
}

#[test]
fn unbound_slots_fail_tasks() {
    let config = load_config("small-devices.yaml");
    let tasks = generate_tasks(&config.tasks, config.seed);
    let mut scenario = FogScenario::new(config, Box::new(EnergyAware::default()));
    let report = scenario.run(&tasks);

    assert_eq!(report.allocation_failures.len(), 2);
    assert!(report.slot_bindings[1].host_id.is_none());
    assert_eq!(report.placements.len(), 1);
    assert_eq!(report.failed_tasks.len(), 1);
    assert_eq!(report.failed_tasks[0].task_id, 0);
    assert_eq!(report.failed_tasks[0].slot_id, Some(1));
    assert_eq!(report.success_rate(), 50.);

    assert_eq!(
        scenario.placement_of(0).err(),
        Some(RunError::TaskFailed {
            task_id: 0,
            reason: "slot 1 is not bound to a host".to_string()
        })
    );
    assert_eq!(scenario.placement_of(1).unwrap().tier, Tier::MidTier);
    assert_eq!(scenario.placement_of(42).err(), Some(RunError::UnknownTask(42)));
}

#[test]
fn shrink_on_failure_binds_reduced_slots() {
    let mut config = load_config("small-devices.yaml");
    config.shrink_on_failure = true;
    let tasks = generate_tasks(&config.tasks, config.seed);
    let mut scenario = FogScenario::new(config, Box::new(EnergyAware::default()));
    let report = scenario.run(&tasks);

    assert!(report.allocation_failures.is_empty());
    assert_eq!(report.slot_bindings[1].host_id, Some(1));
    assert_eq!(report.slot_bindings[2].host_id, Some(2));
    assert_eq!(report.slot_bindings[1].resized.as_ref().map(|d| d.memory), Some(100));
    assert_eq!(report.placements.len(), 2);
}

#[test]
fn missing_tier_uses_global_round_robin() {
    let mut config = ScenarioConfig::default();
    config.tasks.list = Some(vec![
        Task::new(0, 1000., 100, 100).with_affinity(Tier::Elastic),
        Task::new(1, 1000., 100, 100).with_affinity(Tier::Elastic),
    ]);
    config.slots.retain(|slot| slot.tier == Tier::Constrained);
    let tasks = generate_tasks(&config.tasks, config.seed);
    let mut scenario = FogScenario::new(config, Box::new(EnergyAware::default()));
    let report = scenario.run(&tasks);

    assert_eq!(report.fallback_count(), 2);
    assert_eq!(report.placements[0].slot_id, 0);
    assert_eq!(report.placements[1].slot_id, 1);
    assert_eq!(report.load.total(), 0);
}

#[test]
fn shared_host_pool() {
    let mut config = ScenarioConfig::default();
    config.shared_host_pool = true;
    let tasks = generate_tasks(&config.tasks, config.seed);
    let mut scenario = FogScenario::new(config, Box::new(RoundRobin::new()));
    let report = scenario.run(&tasks);

    assert_eq!(scenario.allocators().len(), 1);
    // slots of all tiers fill cloud hosts first
    assert!(report.slot_bindings.iter().all(|b| b.host_id.is_some()));
    assert_eq!(report.slot_bindings[0].host_id, Some(0));
    assert_eq!(report.slot_bindings[4].host_id, Some(1));
    assert_eq!(report.slot_bindings[12].host_id, Some(2));
    assert_eq!(report.slot_bindings[16].host_id, Some(4));
    assert_eq!(report.placements.len(), 10);
}

#[test]
fn default_config_values() {
    let config = ScenarioConfig::from_yaml("seed: 5").unwrap();
    assert_eq!(config.seed, 5);
    assert_eq!(config.slots, ScenarioConfig::default().slots);
    assert_eq!(config.build_catalog().len(), 17);
    let hosts = config.build_hosts();
    assert_eq!(hosts.len(), 17);
    assert_eq!(hosts[0].name, "cloud-0");
    assert_eq!(hosts[2].name, "fog-0");
    assert_eq!(hosts[16].name, "iot-9");
}

#[test]
fn config_file_values() {
    let config = load_config("three-tier.yaml");
    assert_eq!(config.policies.len(), 4);
    assert_eq!(config.hosts.len(), 3);
    assert_eq!(config.build_hosts().len(), 16);
    assert_eq!(config.tasks.compute, Some((10000., 50000.)));

    let config = load_config("small-devices.yaml");
    let tasks = generate_tasks(&config.tasks, config.seed);
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].affinity, Some(Tier::Constrained));
    assert_eq!(tasks[0].origin, Tier::Constrained);
}

#[test]
fn bad_configs() {
    assert!(matches!(
        ScenarioConfig::from_file(&name_wrapper("missing.yaml")),
        Err(ConfigError::Io { .. })
    ));
    assert!(matches!(
        ScenarioConfig::from_yaml("slots: 5"),
        Err(ConfigError::Yaml(_))
    ));
    let yaml = "
hosts:
  - tier: mid_tier
    cores: 2
    compute_rate_per_core: 1000
    memory: 1024
    bandwidth: 100
    storage: 1000
    count: 2
";
    assert!(matches!(ScenarioConfig::from_yaml(yaml), Err(ConfigError::Invalid(_))));
}

#[test]
fn task_ranges_are_validated() {
    for yaml in [
        "tasks:\n  compute: [5000, 1000]",
        "tasks:\n  compute: [1000, .inf]",
        "tasks:\n  compute: [.nan, 1000]",
        "tasks:\n  data_in: [2000, 500]",
        "tasks:\n  data_out: [1300, 300]",
    ] {
        assert!(
            matches!(ScenarioConfig::from_yaml(yaml), Err(ConfigError::Invalid(_))),
            "{}",
            yaml
        );
    }
    assert!(ScenarioConfig::from_yaml("tasks:\n  data_in: [500, 500]").is_ok());
    assert!(matches!(
        FogScenario::from_policy_str(ScenarioConfig::default(), "FirstFit"),
        Err(ConfigError::UnknownPolicy(_))
    ));
}

#[test]
fn experiment_runs_all_policies() {
    let config = load_config("three-tier.yaml");
    let experiment = Experiment::new(config, Vec::new(), None);
    let reports = experiment.run(2).unwrap();

    let names: Vec<&str> = reports.iter().map(|r| r.policy.as_str()).collect();
    assert_eq!(names, vec!["RoundRobin", "EnergyAware", "DeadlineAware", "MultiClassifier"]);
    assert!(reports.iter().all(|r| r.placements.len() == 10));
}

#[test]
fn experiment_rejects_unknown_policy() {
    let experiment = Experiment::new(ScenarioConfig::default(), vec!["Greedy".to_string()], None);
    assert!(matches!(
        experiment.run(1),
        Err(ExperimentError::Config(ConfigError::UnknownPolicy(_)))
    ));
}
