//! Fixed-range, fixed-bin-count histogram with exact (non-interpolated)
//! quantile estimation.
//!
//! The bin and quantile formulas are exact, not approximated: `bin =
//! floor(v * n_bins / max)`, and `quantile(q)` returns the lower edge of
//! the first bin whose cumulative count reaches `ceil(q * n_samples)`,
//! with no interpolation — every printed quantile is a value that was
//! actually observed to fall in that bin's lower edge.

use crate::error::ProtocolError;

/// Number of bins each band histogram is allocated.
pub const BINS_PER_HISTOGRAM: u32 = 1000;

#[derive(Debug, Clone)]
pub struct Histogram {
    min: f32,
    max: f32,
    n_bins: u32,
    bins: Vec<u64>,
    n_samples: u64,
}

impl Histogram {
    /// Create a histogram spanning `[min, max)` with `n_bins` equal-width
    /// bins over `[0, max)` (samples in `[0, min)` land in bin 0, per the
    /// bin index scheme).
    pub fn new(min: f32, max: f32, n_bins: u32) -> Self {
        assert!(min < max, "histogram min must be < max");
        assert!(n_bins > 0, "histogram must have at least one bin");
        Self {
            min,
            max,
            n_bins,
            bins: vec![0u64; n_bins as usize],
            n_samples: 0,
        }
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn n_bins(&self) -> u32 {
        self.n_bins
    }

    pub fn n_samples(&self) -> u64 {
        self.n_samples
    }

    pub fn bins(&self) -> &[u64] {
        &self.bins
    }

    fn bin_index(&self, v: f32) -> usize {
        let idx = (v * self.n_bins as f32 / self.max) as u32;
        idx.min(self.n_bins - 1) as usize
    }

    /// Record `v`. Fatal if `v` falls outside `[min, max)` — callers (the
    /// band-routing logic in [`super::statistic::Statistic`]) must only
    /// ever hand this histogram values that belong to its band.
    pub fn add(&mut self, v: f32) -> Result<(), ProtocolError> {
        if v < self.min || v >= self.max {
            return Err(ProtocolError::SampleOutOfBand(v as f64));
        }
        let idx = self.bin_index(v);
        self.bins[idx] += 1;
        self.n_samples += 1;
        Ok(())
    }

    /// Lower edge of bin `i`: `i * max / n_bins`.
    pub fn bin_lower_edge(&self, i: u32) -> f32 {
        i as f32 * self.max / self.n_bins as f32
    }

    /// Non-interpolated quantile: the lower edge of the first bin whose
    /// running count reaches `ceil(q * n_samples)`. Returns 0 for an empty
    /// histogram.
    pub fn quantile(&self, q: f32) -> f32 {
        if self.n_samples == 0 {
            return 0.0;
        }
        let target = (q as f64 * self.n_samples as f64).ceil() as u64;
        self.bin_for_count(target)
    }

    /// Lower edge of the first bin whose running count reaches `target`.
    /// Used both by [`Self::quantile`] and by
    /// [`super::statistic::Statistic::quantile`]'s cross-band walk, where
    /// `target` is a remaining count rather than `ceil(q * n_samples)`.
    pub fn bin_for_count(&self, target: u64) -> f32 {
        let mut cumulative = 0u64;
        for (i, &count) in self.bins.iter().enumerate() {
            cumulative += count;
            if cumulative >= target {
                return self.bin_lower_edge(i as u32);
            }
        }
        self.bin_lower_edge(self.n_bins - 1)
    }

    /// Merge `other`'s bins into `self`. Both histograms must share the
    /// same range and bin count — merging across bands is a caller bug.
    pub fn merge(&mut self, other: &Histogram) -> Result<(), ProtocolError> {
        if self.min != other.min || self.max != other.max || self.n_bins != other.n_bins {
            return Err(ProtocolError::NamespaceMismatch);
        }
        for (a, b) in self.bins.iter_mut().zip(other.bins.iter()) {
            *a += b;
        }
        self.n_samples += other.n_samples;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.bins.iter_mut().for_each(|b| *b = 0);
        self.n_samples = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_bins_and_quantiles() {
        let mut h = Histogram::new(1e-3, 1.0, 10);
        for v in [1e-3_f32, 5e-3, 0.101, 0.999999] {
            h.add(v).unwrap();
        }
        assert_eq!(h.bins()[0], 2);
        assert_eq!(h.bins()[1], 1);
        assert_eq!(h.bins()[9], 1);
        assert_eq!(h.quantile(0.5), 0.0);
        assert_eq!(h.quantile(1.0), 0.9);
    }

    #[test]
    fn add_rejects_out_of_band() {
        let mut h = Histogram::new(1e-3, 1.0, 10);
        assert!(h.add(0.0).is_err());
        assert!(h.add(1.0).is_err());
    }

    #[test]
    fn quantile_zero_is_bin_zero_lower_edge_even_with_an_empty_leading_bin() {
        let mut h = Histogram::new(0.0, 1.0, 10);
        // bin 0 (0.0..0.1) stays empty; bin 1 holds every sample.
        for _ in 0..5 {
            h.add(0.15).unwrap();
        }
        assert_eq!(h.quantile(0.0), 0.0);
    }

    #[test]
    fn quantile_is_monotone_and_bounded_by_max_observed() {
        let mut h = Histogram::new(0.0, 1.0, 100);
        for i in 0..100u32 {
            h.add(i as f32 / 100.0).unwrap();
        }
        let mut last = 0.0;
        for i in 0..=20 {
            let q = i as f32 / 20.0;
            let v = h.quantile(q);
            assert!(v >= last, "quantile({q}) = {v} < previous {last}");
            last = v;
        }
        assert!(h.quantile(1.0) <= 0.99);
    }

    #[test]
    fn empty_histogram_quantile_is_zero() {
        let h = Histogram::new(0.0, 1.0, 10);
        assert_eq!(h.quantile(0.5), 0.0);
    }

    #[test]
    fn reset_clears_bins_and_count() {
        let mut h = Histogram::new(0.0, 1.0, 10);
        h.add(0.5).unwrap();
        h.reset();
        assert_eq!(h.n_samples(), 0);
        assert!(h.bins().iter().all(|&c| c == 0));
        h.add(0.1).unwrap();
        assert_eq!(h.n_samples(), 1);
    }

    #[test]
    fn merge_adds_bins_and_rejects_mismatched_ranges() {
        let mut a = Histogram::new(0.0, 1.0, 10);
        let mut b = Histogram::new(0.0, 1.0, 10);
        a.add(0.05).unwrap();
        b.add(0.05).unwrap();
        b.add(0.95).unwrap();
        a.merge(&b).unwrap();
        assert_eq!(a.n_samples(), 3);
        assert_eq!(a.bins()[0], 2);
        assert_eq!(a.bins()[9], 1);

        let c = Histogram::new(0.0, 2.0, 10);
        let mut d = Histogram::new(0.0, 1.0, 10);
        assert!(d.merge(&c).is_err());
    }
}
