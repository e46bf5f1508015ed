//! Named, insertion-ordered collection of [`Statistic`]s.
//!
//! Ordering is insertion order, not alphabetical — the reporter prints
//! statistics in the order they were registered (`get_requests`,
//! `get_request_size`, `set_requests`, `set_request_size`, `latency`), and
//! a plain `Vec` of (name, Statistic) pairs gets that for free without
//! pulling in an indexmap dependency for five entries.

use super::printer::Printer;
use super::statistic::Statistic;
use crate::error::ProtocolError;

#[derive(Debug, Clone, Default)]
pub struct StatisticsCollection {
    entries: Vec<Statistic>,
}

impl StatisticsCollection {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|s| s.name() == name)
    }

    /// Register a new statistic. Registering the same name twice is a
    /// programmer error (the namespace is fixed after setup) and panics,
    /// matching the "fatal" treatment every other namespace violation gets.
    pub fn register(&mut self, name: impl Into<String>, cumulative: bool, printers: Vec<Printer>) {
        let name = name.into();
        assert!(self.index_of(&name).is_none(), "statistic {name:?} already registered");
        self.entries.push(Statistic::new(name, cumulative, printers));
    }

    /// Record a sample against an already-registered statistic. Fatal if
    /// the name was never registered.
    pub fn add_sample(&mut self, name: &str, value: f64) -> Result<(), ProtocolError> {
        let idx = self
            .index_of(name)
            .ok_or_else(|| ProtocolError::UnknownStatistic(name.to_string()))?;
        self.entries[idx].add(value)
    }

    pub fn get(&self, name: &str) -> Option<&Statistic> {
        self.index_of(name).map(|i| &self.entries[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Statistic> {
        self.entries.iter()
    }

    /// Deep copy: every `Statistic`, including its printers, is cloned
    /// rather than shared.
    pub fn deep_copy(&self) -> Self {
        self.clone()
    }

    /// Merge `other` into `self` pointwise by name. Both collections must
    /// have identical namespaces (same set of registered names).
    pub fn merge(&mut self, other: &StatisticsCollection) -> Result<(), ProtocolError> {
        if self.entries.len() != other.entries.len() {
            return Err(ProtocolError::NamespaceMismatch);
        }
        for stat in &mut self.entries {
            let other_stat = other
                .get(stat.name())
                .ok_or(ProtocolError::NamespaceMismatch)?;
            stat.merge(other_stat)?;
        }
        Ok(())
    }

    /// Reset every non-cumulative statistic; cumulative ones are left
    /// untouched across reporting intervals.
    pub fn reset_non_cumulative(&mut self) {
        for stat in &mut self.entries {
            if !stat.cumulative() {
                stat.reset();
            }
        }
    }
}
