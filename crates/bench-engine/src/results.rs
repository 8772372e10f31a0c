//! The fixed-size result record returned to callers.

use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

/// Latency report for one benchmark run.
///
/// Each field is the total cost of one phase's full iteration loop in whole
/// microseconds. Field order is the wire order and must not change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkResults {
    /// Priority-level reads.
    pub read_us: u64,
    /// Priority raise+lower pairs.
    pub write_us: u64,
    /// Sequentially consistent atomic increments.
    pub fenced_increment_us: u64,
    /// Relaxed atomic increments.
    pub unfenced_increment_us: u64,
}

impl BenchmarkResults {
    /// Encoded size on the wire: four little-endian u64 fields.
    pub const WIRE_SIZE: usize = 32;

    /// Encode into the fixed wire layout.
    pub fn encode(&self) -> [u8; Self::WIRE_SIZE] {
        let mut buf = [0u8; Self::WIRE_SIZE];
        let mut cursor = &mut buf[..];
        cursor.put_u64_le(self.read_us);
        cursor.put_u64_le(self.write_us);
        cursor.put_u64_le(self.fenced_increment_us);
        cursor.put_u64_le(self.unfenced_increment_us);
        buf
    }

    /// Decode from the wire layout; `None` if `buf` is short.
    pub fn decode(mut buf: &[u8]) -> Option<Self> {
        if buf.remaining() < Self::WIRE_SIZE {
            return None;
        }
        Some(Self {
            read_us: buf.get_u64_le(),
            write_us: buf.get_u64_le(),
            fenced_increment_us: buf.get_u64_le(),
            unfenced_increment_us: buf.get_u64_le(),
        })
    }
}
