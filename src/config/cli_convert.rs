//! CLI to Config conversion utilities

use crate::config::cli::{self, Cli};
use crate::config::workload::{AccessPattern, Durability, OperationKind, OutputFormat};
use crate::config::BenchConfig;
use anyhow::{Context, Result};

/// Parse a block size string (e.g. "4096", "4k", "1M") to bytes
pub fn parse_size(s: &str) -> Result<u64> {
    let s = s.trim().to_lowercase();

    let (num_str, multiplier) = if s.ends_with('k') || s.ends_with("kb") {
        (s.trim_end_matches("kb").trim_end_matches('k'), 1024u64)
    } else if s.ends_with('m') || s.ends_with("mb") {
        (s.trim_end_matches("mb").trim_end_matches('m'), 1024 * 1024)
    } else if s.ends_with('g') || s.ends_with("gb") {
        (s.trim_end_matches("gb").trim_end_matches('g'), 1024 * 1024 * 1024)
    } else {
        (s.as_str(), 1)
    };

    let num: u64 = num_str
        .parse()
        .with_context(|| format!("block_size must be digit, e.g. 1024, 1k, 1m: {}", s))?;

    num.checked_mul(multiplier)
        .with_context(|| format!("block size overflows: {}", s))
}

/// Map a classic mode number (1-8) to an access pattern and durability
///
/// | mode | access     | sync | direct |
/// |------|------------|------|--------|
/// | 1    | sequential | yes  | no     |
/// | 2    | sequential | no   | no     |
/// | 3    | sequential | yes  | yes    |
/// | 4    | sequential | no   | yes    |
/// | 5-8  | random     | as 1-4 | as 1-4 |
pub fn mode_to_pattern(mode: u8) -> Result<(AccessPattern, Durability)> {
    let access = match mode {
        1..=4 => AccessPattern::Sequential,
        5..=8 => AccessPattern::Random,
        _ => anyhow::bail!("mode must be between 1 and 8, got {}", mode),
    };

    let durability = match (mode - 1) % 4 {
        0 => Durability::Synchronous,
        1 => Durability::Buffered,
        2 => Durability::SynchronousDirect,
        _ => Durability::Direct,
    };

    Ok((access, durability))
}

/// Convert CLI OpsArg to workload OperationKind
pub fn convert_operation(op: cli::OpsArg) -> OperationKind {
    match op {
        cli::OpsArg::Read => OperationKind::Read,
        cli::OpsArg::Write => OperationKind::Write,
    }
}

/// Convert CLI FormatArg to workload OutputFormat
pub fn convert_format(format: cli::FormatArg) -> OutputFormat {
    match format {
        cli::FormatArg::Text => OutputFormat::Text,
        cli::FormatArg::Json => OutputFormat::Json,
    }
}

/// Build the run configuration from the command line
///
/// Starts from the `--config` file when one is given (defaults otherwise)
/// and applies every flag present on the command line on top.
pub fn build_config(cli: &Cli) -> Result<BenchConfig> {
    let base = match &cli.config {
        Some(path) => crate::config::toml::parse_toml_file(path)?,
        None => BenchConfig::default(),
    };

    merge_cli_with_config(cli, base)
}

/// Merge CLI arguments with a base configuration (CLI takes precedence)
pub fn merge_cli_with_config(cli: &Cli, mut config: BenchConfig) -> Result<BenchConfig> {
    if let Some(ref bs) = cli.block_size {
        config.block_size = parse_size(bs).context("Invalid block size")?;
    }

    if let Some(mode) = cli.mode {
        let (access, durability) = mode_to_pattern(mode)?;
        config.access = access;
        config.durability = durability;
    }

    if let Some(op) = cli.operation {
        config.operation = convert_operation(op);
    }

    if let Some(ref target) = cli.target {
        config.target = target.clone();
    }

    if let Some(count) = cli.io_count {
        config.io_count = count;
    }

    if let Some(workers) = cli.workers {
        config.workers = usize::try_from(workers).context("Invalid worker count")?;
    }

    if let Some(secs) = cli.time {
        config.duration_secs = Some(secs);
    }

    if let Some(ref log) = cli.log_file {
        config.log_file = Some(log.clone());
    }

    if let Some(format) = cli.format {
        config.format = convert_format(format);
    }

    if let Some(interval) = cli.interval {
        config.report_interval_secs = interval;
    }

    Ok(config)
}
