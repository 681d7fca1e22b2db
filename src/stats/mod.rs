//! Statistics collection and periodic reporting
//!
//! Workers record into a shared [`aggregator::Aggregator`]; the
//! [`reporter::Reporter`] turns one drained interval into an
//! [`IntervalReport`] and hands it to the output sinks.
//!
//! # Metrics
//!
//! For an interval of `elapsed_usec` wall time with `count` operations:
//!
//! - IOPS = count × 1e6 / elapsed_usec
//! - throughput (MB/s) = (bytes / 1,048,576) × 1e6 / elapsed_usec
//! - average response (usec) = elapsed_usec / count
//!
//! All three are 0.00 when either count or elapsed time is zero.

pub mod aggregator;
pub mod reporter;

use aggregator::Counters;
use serde::Serialize;

const MIB: f64 = 1024.0 * 1024.0;

/// One drained interval and the wall time it covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalSnapshot {
    pub counters: Counters,
    /// Wall time since the previous interval started, in microseconds
    pub elapsed_usec: u64,
}

/// Metrics derived from an [`IntervalSnapshot`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IntervalReport {
    pub iops: f64,
    /// Megabytes (2^20 bytes) per second
    pub throughput_mb: f64,
    /// Interval wall time divided by operation count
    pub avg_response_usec: f64,
    /// Run-wide maximum single-operation latency
    pub max_response_usec: u64,
    /// Summed service time divided by operation count
    pub avg_service_usec: f64,
    pub operations: u64,
    pub bytes: u64,
    pub elapsed_usec: u64,
}

impl IntervalReport {
    pub fn from_snapshot(snapshot: &IntervalSnapshot) -> Self {
        let Counters {
            count,
            bytes,
            usec,
            max_usec,
        } = snapshot.counters;
        let elapsed = snapshot.elapsed_usec;

        let (iops, throughput_mb, avg_response_usec) = if count == 0 || elapsed == 0 {
            (0.0, 0.0, 0.0)
        } else {
            let elapsed = elapsed as f64;
            (
                count as f64 * 1e6 / elapsed,
                (bytes as f64 / MIB) * 1e6 / elapsed,
                elapsed / count as f64,
            )
        };

        let avg_service_usec = if count == 0 {
            0.0
        } else {
            usec as f64 / count as f64
        };

        Self {
            iops,
            throughput_mb,
            avg_response_usec,
            max_response_usec: max_usec,
            avg_service_usec,
            operations: count,
            bytes,
            elapsed_usec: snapshot.elapsed_usec,
        }
    }
}
