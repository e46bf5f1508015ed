//! Multi-resolution latency histograms, moment accumulators, and the named
//! collection that ties them together for a worker or the reporter.

pub mod collection;
pub mod histogram;
pub mod printer;
pub mod statistic;

pub use collection::StatisticsCollection;
pub use histogram::Histogram;
pub use printer::Printer;
pub use statistic::Statistic;

/// Build the fixed namespace the core registers at startup:
/// `get_requests` (count), `get_request_size` (avg/min/max), `set_requests`
/// (count), `set_request_size` (avg/min/max), `latency` (avg + p50/p90/p95/p99).
/// All non-cumulative.
pub fn new_registered_collection() -> StatisticsCollection {
    let mut c = StatisticsCollection::new();
    c.register("get_requests", false, vec![Printer::Count]);
    c.register(
        "get_request_size",
        false,
        vec![Printer::Average, Printer::Min, Printer::Max],
    );
    c.register("set_requests", false, vec![Printer::Count]);
    c.register(
        "set_request_size",
        false,
        vec![Printer::Average, Printer::Min, Printer::Max],
    );
    c.register(
        "latency",
        false,
        vec![
            Printer::Average,
            Printer::Quantile(0.50),
            Printer::Quantile(0.90),
            Printer::Quantile(0.95),
            Printer::Quantile(0.99),
        ],
    );
    c
}
