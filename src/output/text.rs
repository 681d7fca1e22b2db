//! Human-readable text output

use super::ReportSink;
use crate::stats::IntervalReport;
use std::io::{self, Write};

/// Render a report in the classic single-line format
///
/// ```
/// use iotest::stats::{IntervalReport, IntervalSnapshot};
/// use iotest::stats::aggregator::Counters;
/// use iotest::output::text::format_report_line;
///
/// let report = IntervalReport::from_snapshot(&IntervalSnapshot {
///     counters: Counters { count: 0, bytes: 0, usec: 0, max_usec: 12 },
///     elapsed_usec: 2_000_000,
/// });
/// assert_eq!(
///     format_report_line(&report),
///     "IOPS = 0.00 IO/s Throughput = 0.00MB Avg_response = 0.00 usec Max_response = 12 usec"
/// );
/// ```
pub fn format_report_line(report: &IntervalReport) -> String {
    format!(
        "IOPS = {:.2} IO/s Throughput = {:.2}MB Avg_response = {:.2} usec Max_response = {} usec",
        report.iops, report.throughput_mb, report.avg_response_usec, report.max_response_usec
    )
}

/// Writes one text line per report
pub struct TextSink<W: Write + Send> {
    writer: W,
}

impl TextSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> TextSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> ReportSink for TextSink<W> {
    fn emit(&mut self, report: &IntervalReport) -> io::Result<()> {
        writeln!(self.writer, "{}", format_report_line(report))?;
        self.writer.flush()
    }

    fn name(&self) -> &'static str {
        "text"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::aggregator::Counters;
    use crate::stats::IntervalSnapshot;

    #[test]
    fn test_line_format() {
        let report = IntervalReport::from_snapshot(&IntervalSnapshot {
            counters: Counters {
                count: 1000,
                bytes: 1000 * 4096,
                usec: 150_000,
                max_usec: 812,
            },
            elapsed_usec: 2_000_000,
        });

        assert_eq!(
            format_report_line(&report),
            "IOPS = 500.00 IO/s Throughput = 1.95MB Avg_response = 2000.00 usec Max_response = 812 usec"
        );
    }

    #[test]
    fn test_sink_writes_lines() {
        let mut sink = TextSink::new(Vec::new());
        let report = IntervalReport::from_snapshot(&IntervalSnapshot {
            counters: Counters::default(),
            elapsed_usec: 0,
        });
        sink.emit(&report).unwrap();
        sink.emit(&report).unwrap();

        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(output.lines().count(), 2);
        assert!(output.lines().all(|l| l.starts_with("IOPS = 0.00 IO/s")));
    }
}
