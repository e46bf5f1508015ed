//! Configuration: CLI parsing, validation, and the immutable run-time
//! [`Config`] every worker shares read-only.

pub mod cli;
pub mod validator;

use std::time::Duration;

use cli::Cli;

/// Fully resolved, immutable configuration shared read-only by every
/// worker for the lifetime of a run. Built once in `main` from [`Cli`]
/// after validation.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: String,
    pub workers: usize,
    pub enable_nagle: bool,
    pub rps: Option<f64>,
    pub runtime: Option<f64>,
    pub report_interval: f64,
    pub fraction_gets: f64,
    pub fixed_size: u32,
    pub debug: bool,
    pub distribution_file: Option<std::path::PathBuf>,
    pub pin_cpus: Option<Vec<usize>>,
    pub master_seed: u64,
}

impl Config {
    pub fn from_cli(cli: &Cli, master_seed: u64) -> anyhow::Result<Self> {
        let pin_cpus = match &cli.pin_cpus {
            Some(spec) => Some(crate::util::affinity::parse_cpu_list(spec)?),
            None => None,
        };

        Ok(Self {
            server: cli.server.clone(),
            workers: cli.workers,
            enable_nagle: cli.enable_nagle,
            rps: cli.rps,
            runtime: cli.runtime,
            report_interval: cli.report_interval,
            fraction_gets: cli.fraction_gets,
            fixed_size: cli.fixed_size,
            debug: cli.debug,
            distribution_file: cli.distribution_file.clone(),
            pin_cpus,
            master_seed,
        })
    }

    /// Target per-worker inter-send interval `delta = (1/rps) / n_workers`,
    /// or `None` to send as fast as the connection accepts writes.
    pub fn inter_send_interval(&self) -> Option<Duration> {
        let rps = self.rps?;
        if rps <= 0.0 {
            return None;
        }
        let per_worker_rps = rps / self.workers as f64;
        Some(Duration::from_secs_f64(1.0 / per_worker_rps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn inter_send_interval_divides_evenly_across_workers() {
        let cli = Cli::parse_from(["mcpulse", "-s", "localhost", "-w", "4", "-r", "1000"]);
        let config = Config::from_cli(&cli, 1).unwrap();
        let delta = config.inter_send_interval().unwrap();
        // 1000 rps / 4 workers = 250 rps/worker -> 4ms apart
        assert!((delta.as_secs_f64() - 0.004).abs() < 1e-9);
    }

    #[test]
    fn no_rps_means_unbounded_pacing() {
        let cli = Cli::parse_from(["mcpulse", "-s", "localhost"]);
        let config = Config::from_cli(&cli, 1).unwrap();
        assert!(config.inter_send_interval().is_none());
    }
}
