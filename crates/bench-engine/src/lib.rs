pub mod engine;
pub mod priority;
pub mod quiesce;
pub mod results;
pub mod ticks;

pub use engine::{BenchmarkEngine, EngineError, DEFAULT_ITERATIONS};
pub use priority::{PriorityGuard, PriorityLevel};
pub use quiesce::QuiesceGuard;
pub use results::BenchmarkResults;
pub use ticks::{elapsed_micros, TickInstant};

pub type Result<T> = std::result::Result<T, EngineError>;
