//! Mock IO engine for testing
//!
//! Simulates transfers without touching the target. Every clone shares the
//! same operation log and failure settings, so a test can hand clones to
//! several workers and inspect the combined log afterwards.
//!
//! # Features
//!
//! - Tracks all executed operations in order
//! - Configurable failure after N successful operations
//! - Configurable short transfers
//! - Optional simulated latency
//!
//! # Example
//!
//! ```
//! use iotest::config::workload::OperationKind;
//! use iotest::engine::{IoEngine, IoOperation};
//! use iotest::engine::mock::MockEngine;
//!
//! let mut engine = MockEngine::new();
//! let mut buffer = vec![0u8; 4096];
//! engine.execute(IoOperation {
//!     kind: OperationKind::Read,
//!     fd: 3,
//!     offset: 8192,
//!     buffer: &mut buffer,
//! }).unwrap();
//!
//! assert_eq!(engine.offsets(), vec![8192]);
//! ```

use super::{IoEngine, IoOperation};
use crate::config::workload::OperationKind;
use std::io;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Record of an executed operation for testing verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRecord {
    pub kind: OperationKind,
    pub offset: u64,
    pub length: usize,
}

#[derive(Debug, Default)]
struct MockState {
    records: Vec<OperationRecord>,
    fail_after: Option<usize>,
    bytes_per_op: Option<usize>,
    latency: Option<Duration>,
}

/// Mock IO engine for testing
#[derive(Debug, Clone, Default)]
pub struct MockEngine {
    state: Arc<Mutex<MockState>>,
}

impl MockEngine {
    /// Create a mock engine that succeeds every operation with a full transfer
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every operation once `successes` operations have completed
    pub fn fail_after(&self, successes: usize) {
        self.lock().fail_after = Some(successes);
    }

    /// Report `bytes` transferred for every operation instead of the full length
    pub fn set_bytes_per_op(&self, bytes: usize) {
        self.lock().bytes_per_op = Some(bytes);
    }

    /// Sleep this long inside every operation
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = Some(latency);
    }

    /// All operations executed so far, across every clone
    pub fn records(&self) -> Vec<OperationRecord> {
        self.lock().records.clone()
    }

    /// Offsets of all operations executed so far
    pub fn offsets(&self) -> Vec<u64> {
        self.lock().records.iter().map(|r| r.offset).collect()
    }

    pub fn operation_count(&self) -> usize {
        self.lock().records.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl IoEngine for MockEngine {
    fn execute(&mut self, op: IoOperation<'_>) -> io::Result<usize> {
        let latency = {
            let mut state = self.lock();
            if let Some(limit) = state.fail_after {
                if state.records.len() >= limit {
                    return Err(io::Error::from_raw_os_error(libc::EIO));
                }
            }
            state.records.push(OperationRecord {
                kind: op.kind,
                offset: op.offset,
                length: op.len(),
            });
            state.latency
        };

        if let Some(latency) = latency {
            std::thread::sleep(latency);
        }

        let state = self.lock();
        Ok(state.bytes_per_op.map_or(op.len(), |b| b.min(op.len())))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
