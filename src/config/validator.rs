//! Configuration validation

use super::BenchConfig;
use crate::error::BenchError;
use crate::Result;
use tracing::warn;

/// Logical sector size every O_DIRECT transfer must be a multiple of
const DIRECT_IO_ALIGNMENT: u64 = 512;

/// Validate complete configuration
///
/// Hard errors are returned; questionable but runnable settings only produce
/// a warning.
pub fn validate_config(config: &BenchConfig) -> Result<()> {
    if config.target.as_os_str().is_empty() {
        return Err(invalid(
            "Which is the target file? Please specify with -f or --file option",
        ));
    }

    if config.block_size == 0 {
        return Err(invalid("block_size must be greater than 0"));
    }

    if usize::try_from(config.block_size).is_err() {
        return Err(invalid(format!(
            "block_size {} does not fit in memory",
            config.block_size
        )));
    }

    if config.workers == 0 {
        return Err(invalid("worker count must be at least 1"));
    }

    if config.duration_secs == Some(0) {
        return Err(invalid("time must be at least 1 second"));
    }

    if config.report_interval_secs == 0 {
        return Err(invalid("report interval must be at least 1 second"));
    }

    if config.durability.is_direct() && config.block_size % DIRECT_IO_ALIGNMENT != 0 {
        warn!(
            block_size = config.block_size,
            "direct IO with a block size that is not a multiple of {} bytes will likely fail with EINVAL",
            DIRECT_IO_ALIGNMENT
        );
    }

    let cpus = num_cpus::get();
    if config.workers > cpus {
        warn!(
            workers = config.workers,
            cpus, "more workers than CPUs, results include scheduling overhead"
        );
    }

    Ok(())
}

fn invalid(msg: impl Into<String>) -> BenchError {
    BenchError::InvalidConfig(msg.into())
}
