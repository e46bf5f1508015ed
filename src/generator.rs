//! Produces the next [`Request`] per the configured GET/SET mix.
//!
//! Each worker owns its own `Generator` with its own PRNG stream, seeded
//! from a master seed plus worker index, rather than a single process-wide
//! RNG: per-worker state scales without contention and stays reproducible
//! across runs.

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::codec::{Request, SET_EXPIRY, SET_FLAGS};
use crate::distribution::SizeKeyDistribution;

const ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Key space used when no popularity distribution was loaded (`-f`
/// absent); `-F` still governs the fixed value size in that mode.
const FALLBACK_KEY_SPACE: u64 = 10_000;

pub struct Generator {
    rng: Xoshiro256PlusPlus,
    distribution: Option<Arc<SizeKeyDistribution>>,
    fraction_gets: f64,
    fixed_size: u32,
}

impl Generator {
    pub fn new(
        master_seed: u64,
        worker_index: u64,
        distribution: Option<Arc<SizeKeyDistribution>>,
        fraction_gets: f64,
        fixed_size: u32,
    ) -> Self {
        // Splitting the stream by XORing in the worker index keeps workers
        // independent without needing a jump-ahead scheme; Xoshiro256++'s
        // avalanche makes adjacent seeds produce uncorrelated streams.
        let seed = master_seed ^ (worker_index.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
            distribution,
            fraction_gets,
            fixed_size,
        }
    }

    fn random_key(&mut self) -> String {
        let id = self.rng.gen_range(0..FALLBACK_KEY_SPACE);
        format!("key:{id}")
    }

    fn random_value(&mut self, size: u32) -> Vec<u8> {
        let len = if size <= 1 { 1 } else { self.rng.gen_range(1..=size) } as usize;
        (0..len)
            .map(|_| {
                let idx = self.rng.gen_range(0..ALPHANUMERIC.len());
                ALPHANUMERIC[idx]
            })
            .collect()
    }

    /// Generate the next request: a GET with probability `fraction_gets`,
    /// otherwise a SET carrying a freshly generated alphanumeric value.
    ///
    /// The `*_request_size` statistics are derived from the encoded wire
    /// size of the returned request (see `codec::encode_request`), not
    /// from anything returned here.
    pub fn next_request(&mut self) -> Request {
        let (key, size) = match &self.distribution {
            Some(dist) => {
                let u: f32 = self.rng.gen();
                let entry = dist.sample(u);
                (entry.key.clone(), entry.size)
            }
            None => (self.random_key(), self.fixed_size),
        };

        if self.rng.gen::<f64>() < self.fraction_gets {
            Request::Get { key }
        } else {
            let value = self.random_value(size);
            Request::Set { key, value, flags: SET_FLAGS, expiry: SET_EXPIRY }
        }
    }
}
