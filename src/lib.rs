//! iotest - storage device micro-benchmark
//!
//! Drives block-sized reads or writes against a regular file or block device
//! from one or more worker threads, and prints IOPS, throughput and latency
//! at a fixed interval.
//!
//! # Architecture
//!
//! - **target**: opens and measures the file or device
//! - **engine**: issues one positioned transfer per operation
//! - **distribution**: sequential or uniform random block selection
//! - **worker**: the per-thread IO loop
//! - **stats**: the shared aggregator and the periodic reporter
//! - **output**: text, JSON and log file report sinks
//! - **coordinator**: starts, stops and joins a run

pub mod config;
pub mod coordinator;
pub mod distribution;
pub mod engine;
pub mod error;
pub mod output;
pub mod stats;
pub mod target;
pub mod util;
pub mod worker;

// Re-export commonly used types
pub use config::BenchConfig;
pub use coordinator::{Benchmark, RunSummary, StopReason};
pub use engine::IoEngine;
pub use error::BenchError;

/// Result type used throughout iotest
pub type Result<T> = std::result::Result<T, BenchError>;
