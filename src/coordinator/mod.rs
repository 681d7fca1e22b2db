//! Run orchestration
//!
//! The [`Benchmark`] wires everything together for one run:
//!
//! 1. validate the configuration and resolve the target
//! 2. build the aggregator, reporter and sinks
//! 3. start the reporter timer and one thread per worker
//! 4. wait for the first of: every worker finishing, the duration limit,
//!    or an external stop (Ctrl-C)
//! 5. raise the stop flag, join everything, and return a [`RunSummary`]
//!
//! Any worker error or panic fails the run after all threads have joined.
//!
//! # Example
//!
//! ```no_run
//! use iotest::config::BenchConfig;
//! use iotest::coordinator::Benchmark;
//!
//! let config = BenchConfig {
//!     target: "/tmp/data.bin".into(),
//!     io_count: 1000,
//!     ..Default::default()
//! };
//!
//! let summary = Benchmark::new(config).run()?;
//! println!("{}", summary);
//! # Ok::<(), iotest::error::BenchError>(())
//! ```

use crate::config::validator::validate_config;
use crate::config::BenchConfig;
use crate::engine::sync::SyncEngine;
use crate::engine::IoEngine;
use crate::error::BenchError;
use crate::output::{self, ReportSink};
use crate::stats::aggregator::Aggregator;
use crate::stats::reporter::Reporter;
use crate::target::{TargetDescriptor, TargetKind};
use crate::util::time::format_duration;
use crate::worker::{SharedState, Worker, WorkerOutcome, WorkerSummary};
use crate::Result;
use crossbeam::channel::{self, Receiver, Sender};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Why a run ended cleanly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// A worker issued its full operation count
    Exhausted,
    /// The duration limit elapsed
    Duration,
    /// Stopped through a [`StopHandle`], e.g. on Ctrl-C
    Interrupted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Exhausted => write!(f, "operation count reached"),
            StopReason::Duration => write!(f, "time limit reached"),
            StopReason::Interrupted => write!(f, "interrupted"),
        }
    }
}

/// Whole-run totals returned by a clean run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunSummary {
    pub operations: u64,
    pub bytes: u64,
    pub elapsed: Duration,
    pub reason: StopReason,
    pub workers: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} operations, {} bytes in {} by {} worker(s): {}",
            self.operations,
            self.bytes,
            format_duration(self.elapsed),
            self.workers,
            self.reason
        )
    }
}

/// Stops a running benchmark from another thread
#[derive(Debug, Clone)]
pub struct StopHandle {
    stop: Arc<AtomicBool>,
    notify: Sender<()>,
}

impl StopHandle {
    /// Raise the stop flag and wake the coordinator
    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
        let _ = self.notify.try_send(());
    }
}

type EngineFactory = Box<dyn Fn(usize) -> Box<dyn IoEngine>>;

/// One configured benchmark run
pub struct Benchmark {
    config: BenchConfig,
    engine_factory: EngineFactory,
    sinks: Option<Vec<Box<dyn ReportSink>>>,
    stop: Arc<AtomicBool>,
    interrupt_tx: Sender<()>,
    interrupt_rx: Receiver<()>,
}

impl Benchmark {
    /// Prepare a run using `pread`/`pwrite` and the sinks the config names
    pub fn new(config: BenchConfig) -> Self {
        let (interrupt_tx, interrupt_rx) = channel::bounded(1);
        Self {
            config,
            engine_factory: Box::new(|_| Box::new(SyncEngine::new())),
            sinks: None,
            stop: Arc::new(AtomicBool::new(false)),
            interrupt_tx,
            interrupt_rx,
        }
    }

    /// Build each worker's IO engine with `factory(worker_id)`
    pub fn with_engine_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(usize) -> Box<dyn IoEngine> + 'static,
    {
        self.engine_factory = Box::new(factory);
        self
    }

    /// Replace the configured report sinks
    pub fn with_sinks(mut self, sinks: Vec<Box<dyn ReportSink>>) -> Self {
        self.sinks = Some(sinks);
        self
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            stop: Arc::clone(&self.stop),
            notify: self.interrupt_tx.clone(),
        }
    }

    /// Execute the run
    ///
    /// # Errors
    ///
    /// Setup errors are returned before any worker starts. During the run the
    /// first `IoOperation`, `Report` or `WorkerPanicked` error wins; it is
    /// returned once every thread has been joined.
    pub fn run(self) -> Result<RunSummary> {
        let Benchmark {
            config,
            engine_factory,
            sinks,
            stop,
            interrupt_tx: _interrupt_tx,
            interrupt_rx,
        } = self;

        validate_config(&config)?;
        info!("{}", config);

        let target = TargetDescriptor::for_config(&config)?;
        target.checked_range(config.block_size)?;
        if target.kind() == TargetKind::BlockDevice {
            println!("{}", target.summary_line());
        }

        let sinks = match sinks {
            Some(sinks) => sinks,
            None => output::sinks_for_config(&config)?,
        };

        let config = Arc::new(config);
        let aggregator = Arc::new(Aggregator::new());
        let reporter = Arc::new(Reporter::new(Arc::clone(&aggregator), sinks));
        let shared = SharedState {
            config: Arc::clone(&config),
            target: Arc::new(target),
            aggregator: Arc::clone(&aggregator),
            reporter: Arc::clone(&reporter),
            stop: Arc::clone(&stop),
        };

        let mut workers = Vec::with_capacity(config.workers);
        for id in 0..config.workers {
            workers.push(Worker::new(id, shared.clone(), engine_factory(id))?);
        }

        let (reporter_shutdown, shutdown_rx) = channel::bounded(1);
        let (done_tx, done_rx) = channel::unbounded();

        let started = Instant::now();
        reporter.start_interval();
        let reporter_handle =
            reporter.spawn_timer(config.report_interval(), shutdown_rx, Arc::clone(&stop))?;

        let mut handles = Vec::with_capacity(workers.len());
        let mut spawn_error = None;
        for worker in workers {
            match spawn_worker(worker, done_tx.clone()) {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    stop.store(true, Ordering::SeqCst);
                    spawn_error = Some(e);
                    break;
                }
            }
        }
        drop(done_tx);

        let deadline = match config.duration() {
            Some(limit) => channel::after(limit),
            None => channel::never(),
        };
        let mut reason = None;
        let mut finished = 0;
        while finished < handles.len() {
            channel::select! {
                recv(done_rx) -> msg => match msg {
                    Ok(_) => finished += 1,
                    Err(_) => break,
                },
                recv(deadline) -> _ => {
                    if reason.is_none() {
                        debug!("time limit reached");
                        reason = Some(StopReason::Duration);
                    }
                    stop.store(true, Ordering::SeqCst);
                },
                recv(interrupt_rx) -> _ => {
                    if reason.is_none() {
                        info!("stop requested");
                        reason = Some(StopReason::Interrupted);
                    }
                    stop.store(true, Ordering::SeqCst);
                },
            }
        }
        stop.store(true, Ordering::SeqCst);

        let mut first_error = spawn_error;
        let mut summaries = Vec::with_capacity(handles.len());
        for handle in handles {
            match join(handle) {
                Ok(summary) => summaries.push(summary),
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }

        let _ = reporter_shutdown.send(());
        if let Err(e) = join(reporter_handle) {
            first_error.get_or_insert(e);
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        let reason = reason.unwrap_or_else(|| stop_reason(&summaries));
        let totals = aggregator.totals();
        Ok(RunSummary {
            operations: totals.operations,
            bytes: totals.bytes,
            elapsed: started.elapsed(),
            reason,
            workers: summaries.len(),
        })
    }
}

fn stop_reason(summaries: &[WorkerSummary]) -> StopReason {
    if summaries
        .iter()
        .any(|s| s.outcome == WorkerOutcome::Exhausted)
    {
        StopReason::Exhausted
    } else {
        StopReason::Interrupted
    }
}

/// Notifies the coordinator when a worker thread ends, including by panic
struct DoneGuard {
    id: usize,
    done: Sender<usize>,
}

impl Drop for DoneGuard {
    fn drop(&mut self) {
        let _ = self.done.send(self.id);
    }
}

fn spawn_worker(mut worker: Worker, done: Sender<usize>) -> Result<JoinHandle<Result<WorkerSummary>>> {
    let id = worker.id();
    let name = format!("iotest-worker-{}", id);

    thread::Builder::new()
        .name(name.clone())
        .spawn(move || {
            let _guard = DoneGuard { id, done };
            worker.run()
        })
        .map_err(|source| BenchError::Spawn { name, source })
}

fn join<T>(handle: JoinHandle<Result<T>>) -> Result<T> {
    let name = handle.thread().name().unwrap_or("unnamed").to_string();
    handle.join().unwrap_or_else(|_| {
        warn!(thread = %name, "thread panicked");
        Err(BenchError::WorkerPanicked(name))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::mock::MockEngine;
    use crate::output::MemorySink;
    use tempfile::TempDir;

    fn target_file(dir: &TempDir, len: usize) -> std::path::PathBuf {
        let path = dir.path().join("target.dat");
        std::fs::write(&path, vec![0u8; len]).unwrap();
        path
    }

    #[test]
    fn test_exhausted_run() {
        let dir = TempDir::new().unwrap();
        let engine = MockEngine::new();
        let sink = MemorySink::new();
        let config = BenchConfig {
            target: target_file(&dir, 40960),
            io_count: 10,
            ..Default::default()
        };

        let factory_engine = engine.clone();
        let summary = Benchmark::new(config)
            .with_engine_factory(move |_| Box::new(factory_engine.clone()))
            .with_sinks(vec![Box::new(sink.clone())])
            .run()
            .unwrap();

        assert_eq!(summary.reason, StopReason::Exhausted);
        assert_eq!(summary.operations, 10);
        assert_eq!(summary.bytes, 40960);
        assert_eq!(summary.workers, 1);
        assert_eq!(sink.reports().len(), 1);
    }

    #[test]
    fn test_duration_limit() {
        let dir = TempDir::new().unwrap();
        let engine = MockEngine::new();
        engine.set_latency(Duration::from_millis(1));
        let config = BenchConfig {
            target: target_file(&dir, 40960),
            duration_secs: Some(1),
            workers: 2,
            ..Default::default()
        };

        let summary = Benchmark::new(config)
            .with_engine_factory(move |_| Box::new(engine.clone()))
            .with_sinks(vec![Box::new(MemorySink::new())])
            .run()
            .unwrap();

        assert_eq!(summary.reason, StopReason::Duration);
        assert!(summary.operations > 0);
        assert!(summary.elapsed >= Duration::from_secs(1));
        assert!(summary.elapsed < Duration::from_secs(10));
    }

    #[test]
    fn test_stop_handle_interrupts() {
        let dir = TempDir::new().unwrap();
        let engine = MockEngine::new();
        engine.set_latency(Duration::from_millis(1));
        let config = BenchConfig {
            target: target_file(&dir, 40960),
            ..Default::default()
        };

        let benchmark = Benchmark::new(config)
            .with_engine_factory(move |_| Box::new(engine.clone()))
            .with_sinks(vec![Box::new(MemorySink::new())]);
        let handle = benchmark.stop_handle();
        let stopper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            handle.stop();
        });

        let summary = benchmark.run().unwrap();
        stopper.join().unwrap();
        assert_eq!(summary.reason, StopReason::Interrupted);
    }

    #[test]
    fn test_io_error_fails_run() {
        let dir = TempDir::new().unwrap();
        let engine = MockEngine::new();
        engine.fail_after(7);
        let config = BenchConfig {
            target: target_file(&dir, 40960),
            workers: 3,
            ..Default::default()
        };

        let err = Benchmark::new(config)
            .with_engine_factory(move |_| Box::new(engine.clone()))
            .with_sinks(vec![Box::new(MemorySink::new())])
            .run()
            .unwrap_err();
        assert!(matches!(err, BenchError::IoOperation { .. }));
    }

    #[test]
    fn test_setup_errors_before_workers() {
        let engine = MockEngine::new();
        let config = BenchConfig {
            target: "/nonexistent/iotest.dat".into(),
            ..Default::default()
        };

        let factory_engine = engine.clone();
        let err = Benchmark::new(config)
            .with_engine_factory(move |_| Box::new(factory_engine.clone()))
            .run()
            .unwrap_err();
        assert!(err.is_setup_error());
        assert_eq!(engine.operation_count(), 0);
    }

    #[test]
    fn test_summary_display() {
        let summary = RunSummary {
            operations: 10,
            bytes: 40960,
            elapsed: Duration::from_millis(1500),
            reason: StopReason::Exhausted,
            workers: 1,
        };
        assert_eq!(
            summary.to_string(),
            "10 operations, 40960 bytes in 1.50s by 1 worker(s): operation count reached"
        );
    }
}
