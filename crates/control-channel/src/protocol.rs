//! Wire framing for the control channel.
//!
//! One request and one response per connection. Both frames carry a fixed
//! little-endian header followed by a payload; the request states the
//! caller's output capacity up front so the dispatcher can reject undersized
//! buffers before any work happens.

use std::fmt;

use bytes::{Buf, BufMut};

/// Control code for "run the full benchmark suite", the only recognized
/// operation.
pub const CONTROL_RUN_BENCHMARK: u32 = 0x0800;

/// Request header: `code | input_len | output_capacity`, all u32 LE.
pub const REQUEST_HEADER_LEN: usize = 12;

/// Response header: `status | bytes_returned`, both u32 LE.
pub const RESPONSE_HEADER_LEN: usize = 8;

/// Largest request payload the server will read.
pub const MAX_INPUT_LEN: u32 = 4096;

/// Largest output capacity the server will honor when sizing its copy of
/// the caller's buffer.
pub const MAX_OUTPUT_CAPACITY: u32 = 4096;

/// Outcome of a dispatched request, as carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Status {
    Ok = 0,
    BufferTooSmall = 1,
    UnsupportedRequest = 2,
    EngineFailure = 3,
}

impl Status {
    pub fn from_u32(raw: u32) -> Option<Status> {
        match raw {
            0 => Some(Status::Ok),
            1 => Some(Status::BufferTooSmall),
            2 => Some(Status::UnsupportedRequest),
            3 => Some(Status::EngineFailure),
            _ => None,
        }
    }

    pub fn as_u32(self) -> u32 {
        self as u32
    }

    pub fn is_ok(self) -> bool {
        self == Status::Ok
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Status::Ok => "ok",
            Status::BufferTooSmall => "buffer too small",
            Status::UnsupportedRequest => "unsupported request",
            Status::EngineFailure => "engine failure",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHeader {
    pub code: u32,
    pub input_len: u32,
    pub output_capacity: u32,
}

impl RequestHeader {
    pub fn encode(&self) -> [u8; REQUEST_HEADER_LEN] {
        let mut buf = [0u8; REQUEST_HEADER_LEN];
        let mut cursor = &mut buf[..];
        cursor.put_u32_le(self.code);
        cursor.put_u32_le(self.input_len);
        cursor.put_u32_le(self.output_capacity);
        buf
    }

    pub fn decode(mut buf: &[u8]) -> Option<Self> {
        if buf.remaining() < REQUEST_HEADER_LEN {
            return None;
        }
        Some(Self {
            code: buf.get_u32_le(),
            input_len: buf.get_u32_le(),
            output_capacity: buf.get_u32_le(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHeader {
    pub status: Status,
    pub bytes_returned: u32,
}

impl ResponseHeader {
    pub fn encode(&self) -> [u8; RESPONSE_HEADER_LEN] {
        let mut buf = [0u8; RESPONSE_HEADER_LEN];
        let mut cursor = &mut buf[..];
        cursor.put_u32_le(self.status.as_u32());
        cursor.put_u32_le(self.bytes_returned);
        buf
    }

    /// `None` for a short buffer or an unknown status word.
    pub fn decode(mut buf: &[u8]) -> Option<Self> {
        if buf.remaining() < RESPONSE_HEADER_LEN {
            return None;
        }
        let status = Status::from_u32(buf.get_u32_le())?;
        Some(Self {
            status,
            bytes_returned: buf.get_u32_le(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_header_wire_layout() {
        let header = RequestHeader {
            code: CONTROL_RUN_BENCHMARK,
            input_len: 0,
            output_capacity: 32,
        };

        let encoded = header.encode();
        assert_eq!(&encoded[0..4], &0x0800u32.to_le_bytes());
        assert_eq!(&encoded[4..8], &0u32.to_le_bytes());
        assert_eq!(&encoded[8..12], &32u32.to_le_bytes());

        assert_eq!(RequestHeader::decode(&encoded), Some(header));
    }

    #[test]
    fn test_request_header_rejects_short_input() {
        assert!(RequestHeader::decode(&[0u8; REQUEST_HEADER_LEN - 1]).is_none());
    }

    #[test]
    fn test_response_header_roundtrip() {
        let header = ResponseHeader {
            status: Status::BufferTooSmall,
            bytes_returned: 0,
        };
        assert_eq!(ResponseHeader::decode(&header.encode()), Some(header));
    }

    #[test]
    fn test_response_header_rejects_unknown_status() {
        let mut wire = [0u8; RESPONSE_HEADER_LEN];
        wire[0..4].copy_from_slice(&99u32.to_le_bytes());
        assert!(ResponseHeader::decode(&wire).is_none());
    }

    #[test]
    fn test_status_words_are_stable() {
        assert_eq!(Status::Ok.as_u32(), 0);
        assert_eq!(Status::BufferTooSmall.as_u32(), 1);
        assert_eq!(Status::UnsupportedRequest.as_u32(), 2);
        assert_eq!(Status::EngineFailure.as_u32(), 3);

        for status in [
            Status::Ok,
            Status::BufferTooSmall,
            Status::UnsupportedRequest,
            Status::EngineFailure,
        ] {
            assert_eq!(Status::from_u32(status.as_u32()), Some(status));
        }
        assert_eq!(Status::from_u32(4), None);
    }
}
