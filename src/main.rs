//! mcpulse CLI entry point

use std::sync::Arc;
use std::time::{Duration, Instant};

use mcpulse::config::cli::Cli;
use mcpulse::config::{validator, Config};
use mcpulse::distribution::SizeKeyDistribution;
use mcpulse::reporter::Reporter;
use mcpulse::{stats, warmup, worker};

fn main() -> anyhow::Result<()> {
    println!("mcpulse - memcached binary-protocol load generator");

    let t0 = Instant::now();
    let cli = Cli::parse_args();
    validator::validate(&cli)?;
    if cli.debug {
        eprintln!("DEBUG TIMING: cli_parse: {}s", t0.elapsed().as_secs_f64());
    }

    let master_seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system clock before UNIX epoch")
        .as_nanos() as u64;
    let config = Arc::new(Config::from_cli(&cli, master_seed)?);

    let t_dist = Instant::now();
    let distribution = match &config.distribution_file {
        Some(path) => Some(Arc::new(SizeKeyDistribution::load(path)?)),
        None => None,
    };
    if config.debug {
        eprintln!("DEBUG TIMING: distribution_load: {}s", t_dist.elapsed().as_secs_f64());
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run(config, distribution))
}

async fn run(
    config: Arc<Config>,
    distribution: Option<Arc<SizeKeyDistribution>>,
) -> anyhow::Result<()> {
    let t_warmup = Instant::now();
    warmup::run(&config, distribution.as_ref()).await?;
    if config.debug {
        eprintln!("DEBUG TIMING: warmup: {}s", t_warmup.elapsed().as_secs_f64());
    }

    let template = stats::new_registered_collection();

    let t_workers = Instant::now();
    let mut workers = Vec::with_capacity(config.workers);
    for index in 0..config.workers {
        let handle = worker::spawn(index, config.clone(), distribution.clone(), template.deep_copy()).await?;
        workers.push(handle);
    }
    if config.debug {
        eprintln!("DEBUG TIMING: worker_startup: {}s", t_workers.elapsed().as_secs_f64());
    }

    let report_interval = Duration::from_secs_f64(config.report_interval);
    let runtime = config.runtime.map(Duration::from_secs_f64);
    let reporter = Reporter::new(template, report_interval, runtime);
    reporter.run(&workers).await
}
