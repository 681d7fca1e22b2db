//! iotest CLI entry point

use anyhow::{Context, Result};
use iotest::config::cli::Cli;
use iotest::config::cli_convert;
use iotest::Benchmark;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse_args();
    init_tracing(cli.debug);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli_convert::build_config(cli).context("Failed to build configuration")?;

    let benchmark = Benchmark::new(config);

    let handle = benchmark.stop_handle();
    let interrupted = AtomicBool::new(false);
    ctrlc::set_handler(move || {
        if interrupted.swap(true, Ordering::SeqCst) {
            eprintln!("Received second interrupt, aborting");
            std::process::abort();
        }
        handle.stop();
    })
    .context("Failed to install Ctrl-C handler")?;

    let summary = benchmark.run()?;
    info!(
        operations = summary.operations,
        bytes = summary.bytes,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        reason = %summary.reason,
        "run complete: {}",
        summary
    );

    Ok(())
}

/// Map the `-g` level to a default filter; `RUST_LOG` wins when set
fn init_tracing(debug: u8) {
    let level = match debug {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("iotest={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
