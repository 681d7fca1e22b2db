//! CLI argument parsing using clap
//!
//! Flags keep the short names of the classic `iotest` tool. Every workload
//! flag is optional so that a `--config` file can supply it instead; values
//! given on the command line win.

use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

/// iotest - storage device micro-benchmark
#[derive(Parser, Debug)]
#[command(name = "iotest")]
#[command(version, about, long_about = None, disable_version_flag = true)]
#[command(after_help = MODE_HELP)]
pub struct Cli {
    /// IO block size (e.g. 4096, 4k, 1m)
    #[arg(short = 'b', long = "bs", value_name = "SIZE")]
    pub block_size: Option<String>,

    /// IO mode (1-8), see the mode table below
    #[arg(short = 'm', long, value_parser = clap::value_parser!(u8).range(1..=8))]
    pub mode: Option<u8>,

    /// IO operation: r (read) or w (write)
    #[arg(short = 'o', long = "ops", value_enum)]
    pub operation: Option<OpsArg>,

    /// Target file or block device
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub target: Option<PathBuf>,

    /// IO count per worker (0 = unbounded)
    #[arg(short = 'c', long = "count")]
    pub io_count: Option<u64>,

    /// Number of IO worker threads
    #[arg(short = 'n', long = "num", value_parser = clap::value_parser!(u64).range(1..))]
    pub workers: Option<u64>,

    /// Run time in seconds
    #[arg(short = 't', long = "time", value_parser = clap::value_parser!(u64).range(1..))]
    pub time: Option<u64>,

    /// Log file receiving a copy of every report line
    #[arg(short = 'l', long = "log", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Diagnostic level: 0 warn, 1 info, 2 debug, 3 trace
    #[arg(short = 'g', long = "debug", default_value = "0")]
    pub debug: u8,

    /// TOML configuration file (command-line flags override it)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Report line format on stdout
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Seconds between report lines
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,

    /// Print version
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    pub version: Option<bool>,
}

const MODE_HELP: &str = "\
Modes:
  1 - seq,sync,non-direct
  2 - seq,async,non-direct
  3 - seq,sync,direct
  4 - seq,async,direct
  5 - ran,sync,non-direct
  6 - ran,async,non-direct
  7 - ran,sync,direct
  8 - ran,async,direct";

/// IO operation flag value
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OpsArg {
    #[value(name = "r", alias = "read")]
    Read,
    #[value(name = "w", alias = "write")]
    Write,
}

/// Report format flag value
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Text,
    Json,
}

impl Cli {
    /// Parse CLI arguments from the process command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
