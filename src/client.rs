//! Client adapter: opens the control channel, issues exactly one benchmark
//! request, and decodes the result record.

use std::path::Path;

use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tracing::debug;

use bench_engine::BenchmarkResults;
use control_channel::protocol::{
    RequestHeader, ResponseHeader, Status, CONTROL_RUN_BENCHMARK, RESPONSE_HEADER_LEN,
};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to open control channel {path}: {source}")]
    ChannelOpen {
        path: String,
        source: std::io::Error,
    },

    #[error("benchmark request failed: {0}")]
    Request(#[source] std::io::Error),

    #[error("benchmark request rejected: {0}")]
    Rejected(Status),

    #[error("malformed response from server")]
    MalformedResponse,
}

/// Issue one benchmark request against the daemon at `path`.
///
/// The request declares a capacity of exactly one result record; the
/// connection closes when the stream drops.
pub async fn run_benchmark(path: &Path) -> Result<BenchmarkResults, ClientError> {
    let mut stream = UnixStream::connect(path)
        .await
        .map_err(|source| ClientError::ChannelOpen {
            path: path.display().to_string(),
            source,
        })?;
    debug!("control channel open at {}", path.display());

    let header = RequestHeader {
        code: CONTROL_RUN_BENCHMARK,
        input_len: 0,
        output_capacity: BenchmarkResults::WIRE_SIZE as u32,
    };
    stream
        .write_all(&header.encode())
        .await
        .map_err(ClientError::Request)?;

    let mut response_buf = [0u8; RESPONSE_HEADER_LEN];
    stream
        .read_exact(&mut response_buf)
        .await
        .map_err(ClientError::Request)?;
    let response = ResponseHeader::decode(&response_buf).ok_or(ClientError::MalformedResponse)?;

    if !response.status.is_ok() {
        return Err(ClientError::Rejected(response.status));
    }
    if response.bytes_returned as usize != BenchmarkResults::WIRE_SIZE {
        return Err(ClientError::MalformedResponse);
    }

    let mut record = [0u8; BenchmarkResults::WIRE_SIZE];
    stream
        .read_exact(&mut record)
        .await
        .map_err(ClientError::Request)?;

    BenchmarkResults::decode(&record).ok_or(ClientError::MalformedResponse)
}
