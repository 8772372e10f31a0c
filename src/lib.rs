//! # priobench: scheduler-priority primitive latency benchmark
//!
//! A privileged daemon and an unprivileged client featuring:
//! - Four-phase measurement of priority reads, raise/lower pairs, and
//!   fenced/unfenced atomic increments
//! - Signal-quiesced measurement scopes for low-noise timings
//! - A fixed-size result record served over a Unix-socket control channel
//! - 100 ns tick timing with integer-exact microsecond conversion

pub mod client;
pub mod config;
pub mod server;

pub use bench_engine;
pub use control_channel;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
