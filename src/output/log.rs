//! Log file output
//!
//! Appends every report line to a file, flushing after each so the log is
//! complete even if the process is killed.

use super::text::format_report_line;
use super::ReportSink;
use crate::error::BenchError;
use crate::stats::IntervalReport;
use crate::Result;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

pub struct LogFileSink {
    writer: BufWriter<File>,
}

impl LogFileSink {
    /// Open `path` for appending, creating it if needed
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| BenchError::LogFile {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl ReportSink for LogFileSink {
    fn emit(&mut self, report: &IntervalReport) -> io::Result<()> {
        writeln!(self.writer, "{}", format_report_line(report))?;
        self.writer.flush()
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
