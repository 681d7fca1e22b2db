//! Error types for the benchmark engine
//!
//! Every failure the engine can hit is fatal: setup errors abort before any
//! worker starts, and an IO error during the run shuts the whole engine down.
//! Nothing here is retried.

use std::path::PathBuf;

/// Errors produced by target resolution, IO execution and reporting
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to open target {}: {source}", path.display())]
    TargetOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to stat target {}: {source}", path.display())]
    TargetStat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{query} failed on block device {}: {source}", path.display())]
    DeviceQuery {
        path: PathBuf,
        query: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("target {} must be a regular file or block device", path.display())]
    UnsupportedTarget { path: PathBuf },

    #[error(
        "target {} is too small: {size} bytes holds no whole {block_size}-byte block",
        path.display()
    )]
    TargetTooSmall {
        path: PathBuf,
        size: u64,
        block_size: u64,
    },

    #[error("worker {worker}: {op} failed at offset {offset}: {source}")]
    IoOperation {
        worker: usize,
        op: &'static str,
        offset: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open log file {}: {source}", path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write report: {0}")]
    Report(#[source] std::io::Error),

    #[error("failed to spawn {name} thread: {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} thread panicked")]
    WorkerPanicked(String),
}

impl BenchError {
    /// Whether the error happened before any IO was issued
    pub fn is_setup_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig(_)
                | Self::TargetOpen { .. }
                | Self::TargetStat { .. }
                | Self::DeviceQuery { .. }
                | Self::UnsupportedTarget { .. }
                | Self::TargetTooSmall { .. }
                | Self::LogFile { .. }
        )
    }
}
