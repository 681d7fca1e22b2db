//! Periodic reporting
//!
//! The [`Reporter`] drains the aggregator, derives the interval metrics and
//! hands them to every sink. It fires from a dedicated timer thread at a fixed
//! interval and can also be fired out of cycle, e.g. by the worker that
//! exhausts its operation count.
//!
//! Interval bookkeeping and emission happen under one lock, so a timer tick
//! and an out-of-cycle report never interleave.
//!
//! # Example
//!
//! ```
//! use iotest::output::MemorySink;
//! use iotest::stats::aggregator::Aggregator;
//! use iotest::stats::reporter::Reporter;
//! use std::sync::Arc;
//!
//! let aggregator = Arc::new(Aggregator::new());
//! let sink = MemorySink::new();
//! let reporter = Reporter::new(Arc::clone(&aggregator), vec![Box::new(sink.clone())]);
//!
//! aggregator.record(4096, 80);
//! let report = reporter.report_now()?;
//! assert_eq!(report.operations, 1);
//! assert_eq!(sink.reports().len(), 1);
//! # Ok::<(), iotest::error::BenchError>(())
//! ```

use super::aggregator::Aggregator;
use super::{IntervalReport, IntervalSnapshot};
use crate::error::BenchError;
use crate::output::ReportSink;
use crate::util::time::micros;
use crate::Result;
use crossbeam::channel::{Receiver, RecvTimeoutError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, trace};

struct ReporterState {
    interval_start: Instant,
    sinks: Vec<Box<dyn ReportSink>>,
    reports_emitted: u64,
}

/// Turns aggregator intervals into report lines
pub struct Reporter {
    aggregator: Arc<Aggregator>,
    state: Mutex<ReporterState>,
}

impl Reporter {
    /// Create a reporter whose first interval starts now
    pub fn new(aggregator: Arc<Aggregator>, sinks: Vec<Box<dyn ReportSink>>) -> Self {
        Self {
            aggregator,
            state: Mutex::new(ReporterState {
                interval_start: Instant::now(),
                sinks,
                reports_emitted: 0,
            }),
        }
    }

    /// Restart the current interval at `now`, discarding nothing
    pub fn start_interval(&self) {
        self.lock().interval_start = Instant::now();
    }

    /// Close the current interval and emit its report
    ///
    /// # Errors
    ///
    /// Returns `Report` if a sink fails to write. Remaining sinks still
    /// receive the report.
    pub fn report_now(&self) -> Result<IntervalReport> {
        let mut state = self.lock();

        let interval_end = Instant::now();
        let elapsed_usec = micros(interval_end.duration_since(state.interval_start));
        let counters = self.aggregator.snapshot_and_reset_additive();
        let report = IntervalReport::from_snapshot(&IntervalSnapshot {
            counters,
            elapsed_usec,
        });

        let mut first_error = None;
        for sink in state.sinks.iter_mut() {
            if let Err(e) = sink.emit(&report) {
                error!(sink = sink.name(), "report sink failed: {}", e);
                first_error.get_or_insert(e);
            }
        }

        state.reports_emitted += 1;
        state.interval_start = Instant::now();
        trace!(
            operations = report.operations,
            elapsed_usec,
            reports = state.reports_emitted,
            "interval reported"
        );

        match first_error {
            Some(e) => Err(BenchError::Report(e)),
            None => Ok(report),
        }
    }

    /// Number of reports emitted so far
    pub fn reports_emitted(&self) -> u64 {
        self.lock().reports_emitted
    }

    /// Spawn the timer thread
    ///
    /// The thread reports every `interval` until `shutdown` receives a message
    /// or is disconnected. If reporting fails it raises `stop` and returns the
    /// error.
    pub fn spawn_timer(
        self: &Arc<Self>,
        interval: Duration,
        shutdown: Receiver<()>,
        stop: Arc<AtomicBool>,
    ) -> Result<JoinHandle<Result<()>>> {
        let reporter = Arc::clone(self);
        let name = "iotest-reporter".to_string();

        thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                debug!(interval_ms = interval.as_millis() as u64, "reporter started");
                loop {
                    match shutdown.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            if let Err(e) = reporter.report_now() {
                                stop.store(true, Ordering::SeqCst);
                                return Err(e);
                            }
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                debug!("reporter stopped");
                Ok(())
            })
            .map_err(|source| BenchError::Spawn { name, source })
    }

    fn lock(&self) -> MutexGuard<'_, ReporterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
