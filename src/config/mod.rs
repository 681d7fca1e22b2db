//! Configuration module
//!
//! Handles CLI argument parsing, TOML configuration files, and validation.
//! Everything funnels into a single [`BenchConfig`] that is frozen before the
//! first worker starts.

pub mod cli;
pub mod cli_convert;
pub mod toml;
pub mod validator;
pub mod workload;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use workload::*;

/// Complete benchmark configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BenchConfig {
    /// Target file or block device
    #[serde(default)]
    pub target: PathBuf,
    /// Bytes transferred by every IO
    #[serde(default = "default_block_size")]
    pub block_size: u64,
    #[serde(default)]
    pub operation: OperationKind,
    #[serde(default)]
    pub access: AccessPattern,
    #[serde(default)]
    pub durability: Durability,
    /// Operations per worker (0 = unbounded)
    #[serde(default)]
    pub io_count: u64,
    /// Number of worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Stop after this many seconds
    #[serde(default)]
    pub duration_secs: Option<u64>,
    /// Seconds between report lines
    #[serde(default = "default_report_interval")]
    pub report_interval_secs: u64,
    /// File that receives a copy of every report line
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    /// Format of the report lines on stdout
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_block_size() -> u64 {
    4096
}

fn default_workers() -> usize {
    1
}

fn default_report_interval() -> u64 {
    2
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            target: PathBuf::new(),
            block_size: default_block_size(),
            operation: OperationKind::default(),
            access: AccessPattern::default(),
            durability: Durability::default(),
            io_count: 0,
            workers: default_workers(),
            duration_secs: None,
            report_interval_secs: default_report_interval(),
            log_file: None,
            format: OutputFormat::default(),
        }
    }
}

impl BenchConfig {
    /// Per-worker operation limit, `None` when unbounded
    pub fn io_limit(&self) -> Option<u64> {
        (self.io_count > 0).then_some(self.io_count)
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration_secs.map(Duration::from_secs)
    }

    pub fn report_interval(&self) -> Duration {
        Duration::from_secs(self.report_interval_secs)
    }
}

impl fmt::Display for BenchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "target={} bs={} op={} access={} durability={} workers={}",
            self.target.display(),
            self.block_size,
            self.operation,
            self.access,
            self.durability,
            self.workers
        )?;
        match self.io_limit() {
            Some(count) => write!(f, " io_count={}", count)?,
            None => write!(f, " io_count=unbounded")?,
        }
        if let Some(secs) = self.duration_secs {
            write!(f, " time={}s", secs)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_original_tool() {
        let config = BenchConfig::default();
        assert_eq!(config.block_size, 4096);
        assert_eq!(config.workers, 1);
        assert_eq!(config.operation, OperationKind::Read);
        assert_eq!(config.access, AccessPattern::Sequential);
        assert_eq!(config.durability, Durability::Buffered);
        assert_eq!(config.report_interval(), Duration::from_secs(2));
        assert_eq!(config.io_limit(), None);
        assert_eq!(config.duration(), None);
    }

    #[test]
    fn test_io_limit() {
        let config = BenchConfig {
            io_count: 10,
            ..Default::default()
        };
        assert_eq!(config.io_limit(), Some(10));
    }

    #[test]
    fn test_display_summarizes_run() {
        let config = BenchConfig {
            target: PathBuf::from("/dev/sdb"),
            operation: OperationKind::Write,
            access: AccessPattern::Random,
            durability: Durability::Direct,
            workers: 4,
            duration_secs: Some(30),
            ..Default::default()
        };
        let line = config.to_string();
        assert!(line.contains("target=/dev/sdb"));
        assert!(line.contains("op=write"));
        assert!(line.contains("access=random"));
        assert!(line.contains("durability=direct"));
        assert!(line.contains("workers=4"));
        assert!(line.contains("io_count=unbounded"));
        assert!(line.contains("time=30s"));
    }
}
