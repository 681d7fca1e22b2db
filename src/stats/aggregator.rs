//! Shared result aggregation
//!
//! Every worker feeds each completed operation into one [`Aggregator`]. The
//! reporter drains it once per interval with
//! [`snapshot_and_reset_additive`](Aggregator::snapshot_and_reset_additive).
//!
//! # Invariants
//!
//! - count, bytes and usec change together under one lock, so a reader never
//!   sees a half-applied operation
//! - the maximum latency only grows and survives interval resets
//! - whole-run totals are updated in the same critical section and never reset
//!
//! # Example
//!
//! ```
//! use iotest::stats::aggregator::Aggregator;
//!
//! let aggregator = Aggregator::new();
//! aggregator.record(4096, 100);
//! aggregator.record(4096, 250);
//!
//! let snapshot = aggregator.snapshot_and_reset_additive();
//! assert_eq!(snapshot.count, 2);
//! assert_eq!(snapshot.max_usec, 250);
//!
//! let after = aggregator.peek();
//! assert_eq!(after.count, 0);
//! assert_eq!(after.max_usec, 250);
//! ```

use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Interval counters plus the run-wide maximum latency
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    /// Operations completed
    pub count: u64,
    /// Bytes transferred
    pub bytes: u64,
    /// Sum of per-operation service times in microseconds
    pub usec: u64,
    /// Largest single-operation latency seen since the run started
    pub max_usec: u64,
}

/// Totals for the whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunTotals {
    pub operations: u64,
    pub bytes: u64,
}

#[derive(Debug, Default)]
struct State {
    current: Counters,
    totals: RunTotals,
}

/// Lock-protected accumulator shared by all workers
#[derive(Debug, Default)]
pub struct Aggregator {
    state: Mutex<State>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one completed operation
    ///
    /// # Arguments
    ///
    /// * `bytes` - Bytes actually transferred (may be short)
    /// * `usec` - Service time of the operation in microseconds
    pub fn record(&self, bytes: u64, usec: u64) {
        let mut state = self.lock();

        let current = &mut state.current;
        current.count = current.count.saturating_add(1);
        current.bytes = current.bytes.saturating_add(bytes);
        current.usec = current.usec.saturating_add(usec);
        if usec > current.max_usec {
            current.max_usec = usec;
        }

        state.totals.operations = state.totals.operations.saturating_add(1);
        state.totals.bytes = state.totals.bytes.saturating_add(bytes);
    }

    /// Capture all fields and zero the additive ones in one critical section
    ///
    /// The maximum latency is returned but not reset.
    pub fn snapshot_and_reset_additive(&self) -> Counters {
        let mut state = self.lock();
        let snapshot = state.current;
        state.current = Counters {
            max_usec: snapshot.max_usec,
            ..Counters::default()
        };
        snapshot
    }

    /// Copy the current fields without changing them
    pub fn peek(&self) -> Counters {
        self.lock().current
    }

    /// Operations and bytes since the run started
    pub fn totals(&self) -> RunTotals {
        self.lock().totals
    }

    // Updates cannot panic halfway, so a poisoned lock still guards whole values
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
