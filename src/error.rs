//! Structural/protocol faults that are always fatal.
//!
//! Configuration, connection-setup and stream I/O errors flow through
//! `anyhow` like everywhere else in this crate; the variants below are the
//! handful of invariant violations the core itself can detect and that have
//! no local recovery.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("bad response magic: expected 0x81, got {0:#04x}")]
    BadMagic(u8),

    #[error("sample {0} is outside every histogram band (>= 1e3)")]
    SampleOutOfBand(f64),

    #[error("add_sample against unregistered statistic {0:?}")]
    UnknownStatistic(String),

    #[error("merge across mismatched statistic namespaces")]
    NamespaceMismatch,

    #[error("merge of statistic {0:?} against a statistic with a different name")]
    StatisticNameMismatch(String),
}
