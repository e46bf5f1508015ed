//! mcpulse - closed-loop memcached binary-protocol load generator
//!
//! mcpulse drives a memcached-compatible server over its binary wire
//! protocol and measures latency and throughput under controlled offered
//! load. It pipelines requests per worker connection, paces sends to a
//! target rate, matches responses FIFO, and aggregates per-worker latency
//! histograms into periodic stdout reports.
//!
//! # Architecture
//!
//! - **distribution**: weighted (key, size) sampling from an empirical CDF
//! - **codec**: memcached binary protocol v1 request/response framing
//! - **connection**: one TCP stream, split into independent read/write tasks
//! - **generator**: produces the next request per the configured GET/SET mix
//! - **stats**: banded histograms, moment accumulators, named collections
//! - **worker**: owns one connection, paces sends, matches responses
//! - **reporter**: periodically snapshots, merges and prints worker stats
//! - **warmup**: one-time cache-priming pass over the full key set

pub mod codec;
pub mod config;
pub mod connection;
pub mod distribution;
pub mod error;
pub mod generator;
pub mod reporter;
pub mod stats;
pub mod util;
pub mod warmup;
pub mod worker;

pub use config::Config;
pub use error::ProtocolError;

/// Result type used throughout mcpulse.
pub type Result<T> = anyhow::Result<T>;
