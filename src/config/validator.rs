//! Range checks over parsed CLI flags, run before any connection opens.

use super::cli::Cli;

pub fn validate(cli: &Cli) -> anyhow::Result<()> {
    if cli.workers == 0 {
        anyhow::bail!("workers (-w) must be at least 1");
    }

    if !(0.0..=1.0).contains(&cli.fraction_gets) {
        anyhow::bail!("fraction_gets (-g) must be in [0, 1], got {}", cli.fraction_gets);
    }

    if let Some(rps) = cli.rps {
        if rps <= 0.0 {
            anyhow::bail!("rps (-r) must be > 0 when given, got {rps}");
        }
    }

    if cli.report_interval <= 0.0 {
        anyhow::bail!(
            "report_interval (-T) must be > 0, got {}",
            cli.report_interval
        );
    }

    if let Some(runtime) = cli.runtime {
        if runtime <= 0.0 {
            anyhow::bail!("runtime (-t) must be > 0 when given, got {runtime}");
        }
    }

    if cli.fixed_size == 0 {
        anyhow::bail!("fixed_size (-F) must be at least 1");
    }

    if cli.connections_per_worker != 1 {
        anyhow::bail!("connections (-c) is reserved; only 1 connection per worker is supported");
    }

    if let Some(spec) = &cli.pin_cpus {
        crate::util::affinity::parse_cpu_list(spec)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn base_cli() -> Cli {
        Cli::parse_from(["mcpulse", "-s", "localhost"])
    }

    #[test]
    fn default_args_are_valid() {
        assert!(validate(&base_cli()).is_ok());
    }

    #[test]
    fn rejects_zero_workers() {
        let mut cli = base_cli();
        cli.workers = 0;
        assert!(validate(&cli).is_err());
    }

    #[test]
    fn rejects_out_of_range_fraction_gets() {
        let mut cli = base_cli();
        cli.fraction_gets = 1.5;
        assert!(validate(&cli).is_err());
    }

    #[test]
    fn rejects_non_positive_rps() {
        let mut cli = base_cli();
        cli.rps = Some(0.0);
        assert!(validate(&cli).is_err());
    }

    #[test]
    fn rejects_non_positive_report_interval() {
        let mut cli = base_cli();
        cli.report_interval = 0.0;
        assert!(validate(&cli).is_err());
    }

    #[test]
    fn accepts_valid_pin_cpus() {
        let mut cli = base_cli();
        cli.pin_cpus = Some("0,1,2".to_string());
        assert!(validate(&cli).is_ok());
    }
}
