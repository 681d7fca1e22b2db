//! Benchmark worker
//!
//! One worker runs per configured thread. Each owns its IO engine, block
//! generator and aligned buffer, and shares the target, aggregator, reporter
//! and stop flag with the others.
//!
//! # Loop
//!
//! Per iteration a worker:
//!
//! 1. returns `Stopped` if the stop flag is raised
//! 2. returns `Exhausted` once it has issued its operation count; the first
//!    worker to get there fires an out-of-cycle report and raises the stop flag
//! 3. picks the next block, issues exactly one transfer of `block_size` bytes
//!    at `block * block_size`, and records the bytes moved and the service time
//!
//! A failed transfer raises the stop flag and ends the worker with
//! `IoOperation`. Short transfers are recorded as they are.

use crate::config::workload::OperationKind;
use crate::config::BenchConfig;
use crate::distribution::{self, Distribution};
use crate::engine::{IoEngine, IoOperation};
use crate::error::BenchError;
use crate::stats::aggregator::Aggregator;
use crate::stats::reporter::Reporter;
use crate::target::TargetDescriptor;
use crate::util::buffer::AlignedBuffer;
use crate::util::time::micros;
use crate::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error};

/// How a worker finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerOutcome {
    /// The stop flag was raised by someone else
    Stopped,
    /// The worker issued its full operation count
    Exhausted,
}

/// Result of a worker that finished without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerSummary {
    pub id: usize,
    pub operations: u64,
    pub outcome: WorkerOutcome,
}

/// Handles shared by every worker of one run
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<BenchConfig>,
    pub target: Arc<TargetDescriptor>,
    pub aggregator: Arc<Aggregator>,
    pub reporter: Arc<Reporter>,
    pub stop: Arc<AtomicBool>,
}

pub struct Worker {
    id: usize,
    shared: SharedState,
    range: u64,
    engine: Box<dyn IoEngine>,
    distribution: Box<dyn Distribution>,
    buffer: AlignedBuffer,
}

impl Worker {
    /// Create a worker with a block generator matching the configured pattern
    ///
    /// # Errors
    ///
    /// - `TargetTooSmall` if the target holds no whole block
    /// - `InvalidConfig` if the block buffer cannot be allocated
    pub fn new(id: usize, shared: SharedState, engine: Box<dyn IoEngine>) -> Result<Self> {
        let distribution = distribution::for_pattern(shared.config.access);
        Self::with_distribution(id, shared, engine, distribution)
    }

    /// Create a worker with an explicit block generator
    pub fn with_distribution(
        id: usize,
        shared: SharedState,
        engine: Box<dyn IoEngine>,
        distribution: Box<dyn Distribution>,
    ) -> Result<Self> {
        let block_size = shared.config.block_size;
        let range = shared.target.checked_range(block_size)?;

        let buffer = usize::try_from(block_size)
            .ok()
            .and_then(AlignedBuffer::for_block)
            .ok_or_else(|| {
                BenchError::InvalidConfig(format!(
                    "cannot allocate a {}-byte aligned buffer",
                    block_size
                ))
            })?;

        Ok(Self {
            id,
            shared,
            range,
            engine,
            distribution,
            buffer,
        })
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Run until stopped, exhausted or failed
    pub fn run(&mut self) -> Result<WorkerSummary> {
        let config = Arc::clone(&self.shared.config);
        let limit = config.io_limit();
        let kind = config.operation;
        let fd = self.shared.target.fd();
        let mut operations = 0u64;

        debug!(
            worker = self.id,
            engine = self.engine.name(),
            range = self.range,
            "worker started"
        );

        let outcome = loop {
            if self.shared.stop.load(Ordering::Relaxed) {
                break WorkerOutcome::Stopped;
            }

            if limit.is_some_and(|limit| operations >= limit) {
                self.exhaust()?;
                break WorkerOutcome::Exhausted;
            }

            let block = self.distribution.next_block(self.range);
            let offset = block * config.block_size;

            let start = Instant::now();
            let result = self.engine.execute(IoOperation {
                kind,
                fd,
                offset,
                buffer: self.buffer.as_mut_slice(),
            });
            let usec = micros(start.elapsed());

            match result {
                Ok(bytes) => self.shared.aggregator.record(bytes as u64, usec),
                Err(source) => {
                    self.shared.stop.store(true, Ordering::SeqCst);
                    error!(worker = self.id, offset, "{} failed: {}", op_name(kind), source);
                    return Err(BenchError::IoOperation {
                        worker: self.id,
                        op: op_name(kind),
                        offset,
                        source,
                    });
                }
            }

            operations += 1;
        };

        debug!(worker = self.id, operations, ?outcome, "worker finished");

        Ok(WorkerSummary {
            id: self.id,
            operations,
            outcome,
        })
    }

    /// Fire the closing report if this worker is the one that ends the run
    fn exhaust(&self) -> Result<()> {
        if self.shared.stop.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        debug!(worker = self.id, "operation count reached, stopping run");
        self.shared.reporter.report_now().map(|_| ())
    }
}

fn op_name(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::Read => "pread",
        OperationKind::Write => "pwrite",
    }
}
