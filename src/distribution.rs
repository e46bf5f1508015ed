//! Weighted (key, size) sampling from an empirical CDF.
//!
//! Entries are loaded once from a plain-text distribution file and shared
//! read-only across every worker for the lifetime of the run.

use anyhow::{bail, Context};
use std::fs;
use std::path::Path;

/// One row of the popularity distribution: the cumulative mass up to and
/// including this entry, the value size in bytes, and the key string.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeKeyEntry {
    pub cdf: f32,
    pub size: u32,
    pub key: String,
}

/// Immutable, CDF-sorted sequence of [`SizeKeyEntry`] used to draw (key,
/// size) pairs proportional to their configured popularity.
#[derive(Debug, Clone, Default)]
pub struct SizeKeyDistribution {
    entries: Vec<SizeKeyEntry>,
}

impl SizeKeyDistribution {
    /// Build a distribution from already-parsed entries.
    ///
    /// Entries must be sorted by non-decreasing `cdf`; this is a
    /// precondition of the file format, not re-sorted here.
    pub fn new(entries: Vec<SizeKeyEntry>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[SizeKeyEntry] {
        &self.entries
    }

    /// Load `cdf, size, key` rows from a plain-text file.
    ///
    /// Blank lines are skipped. `key` is everything after the second comma,
    /// trimmed of leading whitespace only (a key may legitimately contain
    /// trailing whitespace or further commas).
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading distribution file {}", path.display()))?;

        let mut entries = Vec::new();
        for (lineno, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let mut parts = line.splitn(3, ',');
            let cdf_str = parts
                .next()
                .with_context(|| format!("{}:{}: missing cdf field", path.display(), lineno + 1))?;
            let size_str = parts
                .next()
                .with_context(|| format!("{}:{}: missing size field", path.display(), lineno + 1))?;
            let key_str = parts
                .next()
                .with_context(|| format!("{}:{}: missing key field", path.display(), lineno + 1))?;

            let cdf: f32 = cdf_str
                .trim()
                .parse()
                .with_context(|| format!("{}:{}: invalid cdf {:?}", path.display(), lineno + 1, cdf_str))?;
            let size: u32 = size_str
                .trim()
                .parse()
                .with_context(|| format!("{}:{}: invalid size {:?}", path.display(), lineno + 1, size_str))?;
            let key = key_str.trim_start().to_string();

            entries.push(SizeKeyEntry { cdf, size, key });
        }

        if entries.is_empty() {
            bail!("distribution file {} contains no entries", path.display());
        }
        for w in entries.windows(2) {
            if w[1].cdf < w[0].cdf {
                bail!(
                    "distribution file {} is not sorted by non-decreasing cdf ({} then {})",
                    path.display(),
                    w[0].cdf,
                    w[1].cdf
                );
            }
        }

        Ok(Self::new(entries))
    }

    /// Sample the entry for a uniform draw `u in [0, 1)`: the first entry
    /// whose `cdf >= u`, found by lower-bound binary search. Ties on `cdf`
    /// resolve to the lowest index because `partition_point` returns the
    /// first position where the predicate turns false.
    pub fn sample(&self, u: f32) -> &SizeKeyEntry {
        debug_assert!(!self.entries.is_empty(), "SizeKeyDistribution is empty");
        let idx = self.entries.partition_point(|e| e.cdf < u);
        let idx = idx.min(self.entries.len() - 1);
        &self.entries[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> SizeKeyDistribution {
        SizeKeyDistribution::new(vec![
            SizeKeyEntry { cdf: 0.25, size: 8, key: "a".into() },
            SizeKeyEntry { cdf: 0.75, size: 16, key: "b".into() },
            SizeKeyEntry { cdf: 1.0, size: 32, key: "c".into() },
        ])
    }

    #[test]
    fn sample_matches_fixture() {
        let dist = fixture();
        assert_eq!(dist.sample(0.10).key, "a");
        assert_eq!(dist.sample(0.50).key, "b");
        assert_eq!(dist.sample(0.90).key, "c");
    }

    #[test]
    fn sample_at_exact_cdf_boundary_takes_lowest_index() {
        let dist = fixture();
        assert_eq!(dist.sample(0.25).key, "a");
        assert_eq!(dist.sample(0.75).key, "b");
    }

    #[test]
    fn sample_clamps_at_upper_edge() {
        let dist = fixture();
        assert_eq!(dist.sample(1.0).key, "c");
    }

    #[test]
    fn uniform_distribution_converges_to_1_over_n() {
        let n = 10usize;
        let entries: Vec<_> = (0..n)
            .map(|i| SizeKeyEntry {
                cdf: (i as f32 + 1.0) / n as f32,
                size: 8,
                key: format!("k{i}"),
            })
            .collect();
        let dist = SizeKeyDistribution::new(entries);

        let m = 200_000u64;
        let mut counts = vec![0u64; n];
        let mut rng = rand_xoshiro::Xoshiro256PlusPlus::seed_from_u64(42);
        use rand::{Rng, SeedableRng};
        for _ in 0..m {
            let u: f32 = rng.gen();
            let idx = dist.entries().iter().position(|e| e.cdf >= u).unwrap();
            counts[idx] += 1;
        }

        let expected = m as f64 / n as f64;
        let p = 1.0 / n as f64;
        let sigma = (m as f64 * p * (1.0 - p)).sqrt();
        for c in counts {
            assert!(
                (c as f64 - expected).abs() < 3.0 * sigma,
                "count {c} too far from expected {expected} (3 sigma = {sigma})"
            );
        }
    }

    #[test]
    fn load_parses_rows_and_rejects_unsorted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dist.txt");
        std::fs::write(&path, "0.25, 8, a\n0.75, 16, b\n\n1.0, 32, c\n").unwrap();
        let dist = SizeKeyDistribution::load(&path).unwrap();
        assert_eq!(dist.len(), 3);
        assert_eq!(dist.entries()[1].key, "b");

        let bad = dir.path().join("bad.txt");
        std::fs::write(&bad, "0.75, 16, b\n0.25, 8, a\n").unwrap();
        assert!(SizeKeyDistribution::load(&bad).is_err());
    }
}
