//! CLI argument parsing using clap.

use std::path::PathBuf;

use clap::Parser;

/// mcpulse - closed-loop memcached binary-protocol load generator
#[derive(Parser, Debug)]
#[command(name = "mcpulse")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Connections per worker (reserved; current design uses 1)
    #[arg(short = 'c', long = "connections", default_value = "1")]
    pub connections_per_worker: usize,

    /// Enable packet byte-dump debugging
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Load size/key distribution file
    #[arg(short = 'f', long = "dist-file")]
    pub distribution_file: Option<PathBuf>,

    /// Fixed object size fallback, in bytes (used when no distribution file is given)
    #[arg(short = 'F', long = "fixed-size", default_value = "64")]
    pub fixed_size: u32,

    /// Fraction of requests that are GETs (remainder SETs)
    #[arg(short = 'g', long = "fraction-gets", default_value = "0.9")]
    pub fraction_gets: f64,

    /// Fixed gets-per-multiget (reserved)
    #[arg(short = 'l', long = "gets-per-multiget", default_value = "1")]
    pub gets_per_multiget: u32,

    /// Fraction multiget (reserved; not implemented)
    #[arg(short = 'm', long = "fraction-multiget", default_value = "0.0")]
    pub fraction_multiget: f64,

    /// Enable Nagle's algorithm (default off: TCP_NODELAY is set)
    #[arg(short = 'n', long = "enable-nagle")]
    pub enable_nagle: bool,

    /// Target requests/sec across all workers (default: unbounded)
    #[arg(short = 'r', long = "rps")]
    pub rps: Option<f64>,

    /// Server hostname, resolved to IPv4
    #[arg(short = 's', long = "server")]
    pub server: String,

    /// Runtime in seconds (default: infinite)
    #[arg(short = 't', long = "runtime")]
    pub runtime: Option<f64>,

    /// Reporting interval in seconds
    #[arg(short = 'T', long = "report-interval", default_value = "1.0")]
    pub report_interval: f64,

    /// Number of worker threads
    #[arg(short = 'w', long = "workers", default_value = "1")]
    pub workers: usize,

    /// CPU cores to pin workers to, one per worker in order (comma-separated,
    /// e.g. "0,2,4"); optional and configured separately from everything
    /// else the core measures.
    #[arg(long = "pin-cpus")]
    pub pin_cpus: Option<String>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_minimal_required_args() {
        let cli = Cli::parse_from(["mcpulse", "-s", "localhost"]);
        assert_eq!(cli.server, "localhost");
        assert_eq!(cli.workers, 1);
        assert_eq!(cli.report_interval, 1.0);
        assert!(cli.rps.is_none());
    }
}
