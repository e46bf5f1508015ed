//! Optional CPU pinning (`--pin-cpus`).
//!
//! Has no effect on the measured semantics (codec, pacing, statistics);
//! skipped entirely when the flag isn't given. CPU-only (no NUMA path),
//! since that's all this crate exposes.

use anyhow::Context;

use crate::Result;

/// Bind the current thread to a single CPU core.
#[cfg(target_os = "linux")]
pub fn set_cpu_affinity(cores: &[usize]) -> Result<()> {
    use libc::{cpu_set_t, sched_setaffinity, CPU_SET, CPU_ZERO};
    use std::mem;

    if cores.is_empty() {
        anyhow::bail!("CPU core list cannot be empty");
    }

    unsafe {
        let mut cpu_set: cpu_set_t = mem::zeroed();
        CPU_ZERO(&mut cpu_set);

        for &core in cores {
            if core >= 1024 {
                anyhow::bail!("CPU core ID {core} is too large (max 1023)");
            }
            CPU_SET(core, &mut cpu_set);
        }

        let result = sched_setaffinity(0, mem::size_of::<cpu_set_t>(), &cpu_set);
        if result != 0 {
            let err = std::io::Error::last_os_error();
            return Err(err).context(format!("setting CPU affinity to cores {cores:?}"));
        }
    }

    Ok(())
}

#[cfg(not(target_os = "linux"))]
pub fn set_cpu_affinity(_cores: &[usize]) -> Result<()> {
    anyhow::bail!("CPU affinity is only supported on Linux")
}

/// Parse a comma-separated list of CPU cores or ranges: "0,2-4,7" -> `[0,
/// 2, 3, 4, 7]`.
pub fn parse_cpu_list(spec: &str) -> Result<Vec<usize>> {
    let mut cores = Vec::new();

    for part in spec.split(',') {
        let part = part.trim();

        if let Some((start, end)) = part.split_once('-') {
            let start: usize = start
                .parse()
                .with_context(|| format!("invalid CPU core number {start:?}"))?;
            let end: usize = end
                .parse()
                .with_context(|| format!("invalid CPU core number {end:?}"))?;
            if start > end {
                anyhow::bail!("invalid CPU range: start ({start}) > end ({end})");
            }
            cores.extend(start..=end);
        } else {
            let core: usize = part
                .parse()
                .with_context(|| format!("invalid CPU core number {part:?}"))?;
            cores.push(core);
        }
    }

    if cores.is_empty() {
        anyhow::bail!("CPU core list cannot be empty");
    }

    cores.sort_unstable();
    cores.dedup();
    Ok(cores)
}
