//! Request validation and engine invocation.

use thiserror::Error;
use tracing::debug;

use bench_engine::{BenchmarkEngine, BenchmarkResults, EngineError};

use crate::protocol::{Status, CONTROL_RUN_BENCHMARK};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("output buffer too small: {capacity} < {required}")]
    BufferTooSmall { capacity: usize, required: usize },

    #[error("unsupported control code {code:#06x}")]
    UnsupportedRequest { code: u32 },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl DispatchError {
    /// The wire status this failure maps to.
    pub fn status(&self) -> Status {
        match self {
            DispatchError::BufferTooSmall { .. } => Status::BufferTooSmall,
            DispatchError::UnsupportedRequest { .. } => Status::UnsupportedRequest,
            DispatchError::Engine(_) => Status::EngineFailure,
        }
    }
}

/// Validates one control request and runs the engine against the caller's
/// buffer.
///
/// Stateless across calls: every `dispatch` is validated and executed on its
/// own, and a failed call writes nothing into `out`.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    engine: BenchmarkEngine,
}

impl Dispatcher {
    pub fn new(engine: BenchmarkEngine) -> Self {
        Self { engine }
    }

    /// Handle one request, writing the result record into `out`.
    ///
    /// Returns the number of bytes written. The capacity check happens
    /// before the engine runs, and the record is copied out only after the
    /// whole run succeeded, so `out` is either untouched or fully populated.
    pub fn dispatch(&self, code: u32, out: &mut [u8]) -> Result<usize, DispatchError> {
        match code {
            CONTROL_RUN_BENCHMARK => {
                let required = BenchmarkResults::WIRE_SIZE;
                if out.len() < required {
                    return Err(DispatchError::BufferTooSmall {
                        capacity: out.len(),
                        required,
                    });
                }

                debug!("running benchmark suite, {} iterations per phase", self.engine.iterations());
                let results = self.engine.run()?;
                out[..required].copy_from_slice(&results.encode());
                Ok(required)
            }
            code => Err(DispatchError::UnsupportedRequest { code }),
        }
    }
}
