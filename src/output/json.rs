//! JSON output formatting
//!
//! One object per line, suitable for piping into log processors:
//!
//! ```text
//! {"timestamp":"2024-05-01T12:00:02.001Z","iops":512.0,"throughput_mb":2.0,...}
//! ```

use super::ReportSink;
use crate::stats::IntervalReport;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::io::{self, Write};

/// A report stamped with the wall-clock time it was emitted
#[derive(Debug, Serialize)]
pub struct JsonReportLine<'a> {
    pub timestamp: String,
    #[serde(flatten)]
    pub report: &'a IntervalReport,
}

impl<'a> JsonReportLine<'a> {
    pub fn now(report: &'a IntervalReport) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            report,
        }
    }
}

/// Writes one JSON object per report
pub struct JsonSink<W: Write + Send> {
    writer: W,
}

impl JsonSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> JsonSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> ReportSink for JsonSink<W> {
    fn emit(&mut self, report: &IntervalReport) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, &JsonReportLine::now(report))?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }

    fn name(&self) -> &'static str {
        "json"
    }
}
