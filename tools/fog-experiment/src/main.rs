use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use env_logger::Builder;
use log::{error, info, LevelFilter};

use dslab_fog::core::config::ScenarioConfig;
use dslab_fog::experiment::Experiment;

#[derive(Parser, Debug)]
#[command(about, long_about = None)]
/// Runs task offloading experiment with DSLab Fog
struct Args {
    /// Path to YAML file with scenario configuration
    #[arg(short, long)]
    config: PathBuf,

    /// Directory for results.json and per-run CSV files
    #[arg(short, long)]
    output_dir: Option<String>,

    /// Number of threads to use (default - use all available cores)
    #[arg(short, long, default_value_t = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1))]
    threads: usize,

    /// Policy to run instead of the policies from config (can be repeated)
    #[arg(short, long)]
    policy: Vec<String>,

    /// Print debug messages
    #[arg(short, long)]
    debug: bool,
}

fn init_logger(level: LevelFilter) {
    Builder::new()
        .filter(Some("dslab_fog"), level)
        .filter(Some("fog_experiment"), level)
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logger(if args.debug { LevelFilter::Debug } else { LevelFilter::Info });

    let config_path = args.config.to_string_lossy().to_string();
    let config = match ScenarioConfig::from_file(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let experiment = Experiment::new(config, args.policy, args.output_dir);
    match experiment.run(args.threads) {
        Ok(reports) => {
            for report in reports {
                let summary: Vec<String> = report
                    .summary()
                    .iter()
                    .map(|(key, value)| format!("{}={}", key, value))
                    .collect();
                info!("{}", summary.join(" "));
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
