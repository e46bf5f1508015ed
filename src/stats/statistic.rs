//! Moment accumulator plus a three-band latency histogram, keyed by name.

use super::histogram::{Histogram, BINS_PER_HISTOGRAM};
use super::printer::Printer;
use crate::error::ProtocolError;

const MICROSECOND_BAND_MAX: f32 = 1e-3;
const MILLISECOND_BAND_MAX: f32 = 1.0;
const SECOND_BAND_MAX: f32 = 1e3;

fn new_bands() -> [Histogram; 3] {
    [
        Histogram::new(0.0, MICROSECOND_BAND_MAX, BINS_PER_HISTOGRAM),
        Histogram::new(MICROSECOND_BAND_MAX, MILLISECOND_BAND_MAX, BINS_PER_HISTOGRAM),
        Histogram::new(MILLISECOND_BAND_MAX, SECOND_BAND_MAX, BINS_PER_HISTOGRAM),
    ]
}

/// A single named metric: running moments, min/max, and (if it's a
/// latency-shaped metric) a three-band histogram for quantile queries.
#[derive(Debug, Clone)]
pub struct Statistic {
    name: String,
    cumulative: bool,
    s0: u64,
    s1: f64,
    s2: f64,
    min: f64,
    max: f64,
    bands: [Histogram; 3],
    printers: Vec<Printer>,
}

impl Statistic {
    pub fn new(name: impl Into<String>, cumulative: bool, printers: Vec<Printer>) -> Self {
        Self {
            name: name.into(),
            cumulative,
            s0: 0,
            s1: 0.0,
            s2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            bands: new_bands(),
            printers,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cumulative(&self) -> bool {
        self.cumulative
    }

    pub fn printers(&self) -> &[Printer] {
        &self.printers
    }

    pub fn count(&self) -> u64 {
        self.s0
    }

    pub fn average(&self) -> f64 {
        if self.s0 == 0 {
            0.0
        } else {
            self.s1 / self.s0 as f64
        }
    }

    /// Sample standard deviation: `sqrt((s0*s2 - s1^2) / (s0*(s0-1)))`.
    /// Undefined below two samples; returns 0 there.
    pub fn stddev(&self) -> f64 {
        if self.s0 < 2 {
            return 0.0;
        }
        let n = self.s0 as f64;
        (((n * self.s2) - self.s1 * self.s1) / (n * (n - 1.0))).sqrt()
    }

    pub fn min_or_zero(&self) -> f64 {
        if self.s0 == 0 { 0.0 } else { self.min }
    }

    pub fn max_or_zero(&self) -> f64 {
        if self.s0 == 0 { 0.0 } else { self.max }
    }

    /// Update moments and min/max unconditionally; route `v` to a band
    /// histogram unless it's negative. Values `>= 1e3` are fatal — the
    /// system assumes latencies fit in the seconds band.
    pub fn add(&mut self, v: f64) -> Result<(), ProtocolError> {
        self.s0 += 1;
        self.s1 += v;
        self.s2 += v * v;
        if v < self.min {
            self.min = v;
        }
        if v > self.max {
            self.max = v;
        }

        if v < 0.0 {
            return Ok(());
        }
        if v >= SECOND_BAND_MAX as f64 {
            return Err(ProtocolError::SampleOutOfBand(v));
        }

        let band = if v < MICROSECOND_BAND_MAX as f64 {
            0
        } else if v < MILLISECOND_BAND_MAX as f64 {
            1
        } else {
            2
        };
        self.bands[band].add(v as f32)
    }

    /// Cumulative-count walk across microsecond -> millisecond -> second
    /// bands. Returns the lower edge of the spanning bin, or the top edge
    /// of the last bin in the second band if `q` exceeds all samples.
    pub fn quantile(&self, q: f32) -> f64 {
        if self.s0 == 0 {
            return 0.0;
        }
        let mut remaining = (q as f64 * self.s0 as f64).ceil() as u64;

        for band in &self.bands {
            if remaining <= band.n_samples() {
                return band.bin_for_count(remaining) as f64;
            }
            remaining -= band.n_samples();
        }

        self.bands[2].bin_for_count(u64::MAX) as f64
    }

    /// Merge `other` into `self`: moments add, extrema widen, bands merge
    /// band-to-band. Both statistics must share a name.
    pub fn merge(&mut self, other: &Statistic) -> Result<(), ProtocolError> {
        if self.name != other.name {
            return Err(ProtocolError::StatisticNameMismatch(other.name.clone()));
        }
        self.s0 += other.s0;
        self.s1 += other.s1;
        self.s2 += other.s2;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        for (a, b) in self.bands.iter_mut().zip(other.bands.iter()) {
            a.merge(b)?;
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        self.s0 = 0;
        self.s1 = 0.0;
        self.s2 = 0.0;
        self.min = f64::INFINITY;
        self.max = f64::NEG_INFINITY;
        for band in &mut self.bands {
            band.reset();
        }
    }
}
