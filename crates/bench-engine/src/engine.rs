//! The four-phase measurement engine.

use std::hint::black_box;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;
use tracing::debug;

use crate::priority::{PriorityGuard, PriorityLevel};
use crate::quiesce::QuiesceGuard;
use crate::results::BenchmarkResults;
use crate::ticks::{elapsed_micros, TickInstant};

/// Iterations per phase for production measurements.
///
/// Tests construct engines with far smaller counts; results stay in whole
/// microseconds either way.
pub const DEFAULT_ITERATIONS: u64 = 1_000_000;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("priority level access failed: {0}")]
    Priority(#[source] std::io::Error),

    #[error("failed to mask signals for the measurement scope: {0}")]
    Quiesce(#[source] std::io::Error),
}

/// Runs the fixed sequence of measurement phases.
///
/// Each invocation of [`run`](BenchmarkEngine::run) is self-contained: the
/// scratch counters are locals, nothing persists between calls, and two
/// consecutive runs do not influence each other.
#[derive(Debug, Clone)]
pub struct BenchmarkEngine {
    iterations: u64,
    elevated: PriorityLevel,
}

impl BenchmarkEngine {
    pub fn new() -> Self {
        Self::with_iterations(DEFAULT_ITERATIONS)
    }

    pub fn with_iterations(iterations: u64) -> Self {
        Self {
            iterations,
            elevated: PriorityLevel::ELEVATED,
        }
    }

    /// Override the level the write phase raises to.
    pub fn with_elevated_level(mut self, elevated: PriorityLevel) -> Self {
        self.elevated = elevated;
        self
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Execute all four phases, in order, inside one quiesce scope.
    ///
    /// Phases are bracketed independently; no phase's elapsed time includes
    /// another's. Errors propagate immediately and the guards restore the
    /// signal mask and priority level on the way out. No partial results:
    /// the record exists only once every phase has finished.
    pub fn run(&self) -> Result<BenchmarkResults, EngineError> {
        let _quiet = QuiesceGuard::engage().map_err(EngineError::Quiesce)?;
        debug!("measurement scope engaged, {} iterations per phase", self.iterations);

        let read_us = self.read_phase()?;
        let write_us = self.write_phase()?;
        let fenced_increment_us = self.fenced_increment_phase();
        let unfenced_increment_us = self.unfenced_increment_phase();

        Ok(BenchmarkResults {
            read_us,
            write_us,
            fenced_increment_us,
            unfenced_increment_us,
        })
    }

    fn read_phase(&self) -> Result<u64, EngineError> {
        let start = TickInstant::now();
        for _ in 0..self.iterations {
            black_box(PriorityLevel::current().map_err(EngineError::Priority)?);
        }
        let end = TickInstant::now();
        Ok(elapsed_micros(start, end))
    }

    /// The outer guard establishes the baseline every inner pair returns to,
    /// keeping its one-time setup and teardown outside the timed bracket.
    fn write_phase(&self) -> Result<u64, EngineError> {
        let outer = PriorityGuard::raise(self.elevated).map_err(EngineError::Priority)?;

        let start = TickInstant::now();
        for _ in 0..self.iterations {
            let inner = PriorityGuard::raise(self.elevated).map_err(EngineError::Priority)?;
            drop(inner);
        }
        let end = TickInstant::now();

        drop(outer);
        Ok(elapsed_micros(start, end))
    }

    fn fenced_increment_phase(&self) -> u64 {
        let counter = AtomicU64::new(0);

        let start = TickInstant::now();
        for _ in 0..self.iterations {
            counter.fetch_add(1, Ordering::SeqCst);
        }
        let end = TickInstant::now();

        black_box(counter.into_inner());
        elapsed_micros(start, end)
    }

    fn unfenced_increment_phase(&self) -> u64 {
        let counter = AtomicU64::new(0);

        let start = TickInstant::now();
        for _ in 0..self.iterations {
            counter.fetch_add(1, Ordering::Relaxed);
        }
        let end = TickInstant::now();

        black_box(counter.into_inner());
        elapsed_micros(start, end)
    }
}

impl Default for BenchmarkEngine {
    fn default() -> Self {
        Self::new()
    }
}
