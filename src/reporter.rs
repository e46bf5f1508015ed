//! Periodically snapshots every worker's statistics, merges them into an
//! aggregate, prints it, and enforces the overall runtime limit.

use std::time::{Duration, Instant};

use crate::stats::StatisticsCollection;
use crate::worker::WorkerHandle;

pub struct Reporter {
    template: StatisticsCollection,
    report_interval: Duration,
    runtime: Option<Duration>,
}

impl Reporter {
    pub fn new(template: StatisticsCollection, report_interval: Duration, runtime: Option<Duration>) -> Self {
        Self { template, report_interval, runtime }
    }

    /// Run forever, printing an aggregate report every `report_interval`.
    /// Exits the process with status 0 once `runtime` elapses; never
    /// returns otherwise (there is no graceful drain).
    pub async fn run(&self, workers: &[WorkerHandle]) -> anyhow::Result<()> {
        let start = Instant::now();
        loop {
            tokio::time::sleep(self.report_interval).await;

            let aggregate = self.snapshot_and_reset(workers)?;
            print_report(&aggregate);

            if let Some(runtime) = self.runtime {
                if start.elapsed() >= runtime {
                    std::process::exit(0);
                }
            }
        }
    }

    /// Deep-copy the (empty) template, merge each worker's current
    /// collection into it while holding that worker's mutex, and reset
    /// the worker's non-cumulative statistics — the mutex makes the
    /// worker<->reporter hand-off atomic with respect to `add_sample`.
    fn snapshot_and_reset(&self, workers: &[WorkerHandle]) -> anyhow::Result<StatisticsCollection> {
        let mut aggregate = self.template.deep_copy();
        for worker in workers {
            let mut worker_stats = worker.stats.lock().unwrap();
            aggregate.merge(&worker_stats)?;
            worker_stats.reset_non_cumulative();
        }
        Ok(aggregate)
    }
}

fn print_report(aggregate: &StatisticsCollection) {
    println!("==============================");
    for stat in aggregate.iter() {
        let mut line = format!("{} - ", stat.name());
        for printer in stat.printers() {
            line.push_str(&printer.render(stat));
        }
        println!("{line}");
    }
    println!();
}
