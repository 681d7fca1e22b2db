//! Report sinks
//!
//! Every interval report is handed to each configured sink in turn:
//!
//! - **text**: the classic one-line console format on stdout
//! - **json**: one JSON object per line on stdout, with a timestamp
//! - **log**: the text line appended to a log file
//!
//! Sinks are owned by the reporter and only ever called with its lock held,
//! so implementations need no synchronization of their own.

pub mod json;
pub mod log;
pub mod text;

use crate::config::workload::OutputFormat;
use crate::config::BenchConfig;
use crate::stats::IntervalReport;
use crate::Result;
use std::io;
use std::sync::{Arc, Mutex, PoisonError};

/// Destination for interval reports
pub trait ReportSink: Send {
    /// Write one report
    fn emit(&mut self, report: &IntervalReport) -> io::Result<()>;

    /// Short sink name for diagnostics
    fn name(&self) -> &'static str;
}

/// Build the sinks a configuration asks for
///
/// The stdout sink follows `format`; a log file sink is added when
/// `log_file` is set.
///
/// # Errors
///
/// Returns `LogFile` if the log file cannot be opened.
pub fn sinks_for_config(config: &BenchConfig) -> Result<Vec<Box<dyn ReportSink>>> {
    let mut sinks: Vec<Box<dyn ReportSink>> = Vec::with_capacity(2);

    match config.format {
        OutputFormat::Text => sinks.push(Box::new(text::TextSink::stdout())),
        OutputFormat::Json => sinks.push(Box::new(json::JsonSink::stdout())),
    }

    if let Some(path) = &config.log_file {
        sinks.push(Box::new(log::LogFileSink::open(path)?));
    }

    Ok(sinks)
}

/// Sink that keeps every report in memory
///
/// Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    reports: Arc<Mutex<Vec<IntervalReport>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<IntervalReport> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ReportSink for MemorySink {
    fn emit(&mut self, report: &IntervalReport) -> io::Result<()> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(*report);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
