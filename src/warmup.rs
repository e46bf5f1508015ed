//! One-time priming pass that issues a SET for every entry in the loaded
//! distribution before any measurement worker starts.
//!
//! Grounded on `worker_thread.cc`'s `WarmupWorkerThread`: a single
//! connection pipelines one SET per entry with no rate pacing, and the
//! pass ends once every entry has been sent and every response has come
//! back. Warmup never touches any `StatisticsCollection`.

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use tokio::sync::mpsc;

use crate::codec::{Request, SET_EXPIRY, SET_FLAGS};
use crate::config::Config;
use crate::connection;
use crate::distribution::SizeKeyDistribution;

const ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// XORed into the master seed so warmup's RNG stream never collides with
/// any worker's (worker streams are indexed `0..workers`).
const WARMUP_SEED_XOR: u64 = u64::MAX;

fn random_value(rng: &mut Xoshiro256PlusPlus, size: u32) -> Vec<u8> {
    let len = if size <= 1 { 1 } else { rng.gen_range(1..=size) } as usize;
    (0..len).map(|_| ALPHANUMERIC[rng.gen_range(0..ALPHANUMERIC.len())]).collect()
}

/// Run the warmup pass if a distribution was loaded; a no-op otherwise —
/// there's nothing to prime without one.
pub async fn run(config: &Config, distribution: Option<&Arc<SizeKeyDistribution>>) -> anyhow::Result<()> {
    let Some(distribution) = distribution else {
        return Ok(());
    };
    if distribution.is_empty() {
        return Ok(());
    }

    let stream = connection::open(&config.server, config.enable_nagle).await?;
    let (read_half, write_half) = stream.into_split();

    let entries = distribution.entries().to_vec();
    let n = entries.len();
    let (tx, rx) = mpsc::unbounded_channel::<()>();
    let seed = config.master_seed ^ WARMUP_SEED_XOR;
    let debug = config.debug;

    let writer = tokio::spawn(async move {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let mut writer = write_half;
        for entry in &entries {
            let value = random_value(&mut rng, entry.size);
            let req = Request::Set {
                key: entry.key.clone(),
                value,
                flags: SET_FLAGS,
                expiry: SET_EXPIRY,
            };
            connection::send_request(&mut writer, &req, debug).await?;
            if tx.send(()).is_err() {
                break;
            }
        }
        anyhow::Ok(())
    });

    let reader = tokio::spawn(async move {
        let mut reader = read_half;
        let mut rx = rx;
        for _ in 0..n {
            connection::recv_response(&mut reader, debug).await?;
            rx.recv()
                .await
                .ok_or_else(|| anyhow::anyhow!("warmup writer exited before all sends completed"))?;
        }
        anyhow::Ok(())
    });

    writer.await??;
    reader.await??;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_value_length_is_in_range() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        for _ in 0..100 {
            let v = random_value(&mut rng, 32);
            assert!(v.len() >= 1 && v.len() <= 32);
            assert!(v.iter().all(|b| ALPHANUMERIC.contains(b)));
        }
    }

    #[test]
    fn random_value_clamps_to_one_byte_for_degenerate_sizes() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        assert_eq!(random_value(&mut rng, 0).len(), 1);
        assert_eq!(random_value(&mut rng, 1).len(), 1);
    }
}
