//! Integration tests for the benchmark control channel
//!
//! These tests exercise the full path: a server bound to a real socket, a
//! client issuing requests, and the wire-level failure responses.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::task::JoinHandle;

use bench_engine::{BenchmarkResults, PriorityLevel};
use control_channel::protocol::{
    RequestHeader, ResponseHeader, Status, CONTROL_RUN_BENCHMARK, RESPONSE_HEADER_LEN,
};
use priobench::client::{self, ClientError};
use priobench::config::ServerConfig;
use priobench::server::ControlServer;

const TEST_ITERATIONS: u64 = 1_000;

/// Start a server on a fresh socket, raising only to the level already in
/// effect so the suite runs without CAP_SYS_NICE.
async fn spawn_server(dir: &tempfile::TempDir) -> (PathBuf, JoinHandle<anyhow::Result<()>>) {
    let socket_path = dir.path().join("priobench.sock");
    let config = ServerConfig {
        socket_path: socket_path.clone(),
        iterations: TEST_ITERATIONS,
        elevated_nice: PriorityLevel::current()
            .expect("read current priority level")
            .nice(),
    };

    let handle = tokio::spawn(ControlServer::new(&config).serve());

    for _ in 0..100 {
        if socket_path.exists() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(socket_path.exists(), "server did not bind its socket");

    (socket_path, handle)
}

/// Send a raw request frame and collect the response header plus whatever
/// payload follows it.
async fn send_raw(socket: &Path, code: u32, output_capacity: u32) -> (ResponseHeader, Vec<u8>) {
    let mut stream = UnixStream::connect(socket).await.expect("connect");

    let header = RequestHeader {
        code,
        input_len: 0,
        output_capacity,
    };
    stream.write_all(&header.encode()).await.expect("send request");

    let mut response_buf = [0u8; RESPONSE_HEADER_LEN];
    stream
        .read_exact(&mut response_buf)
        .await
        .expect("read response header");
    let response = ResponseHeader::decode(&response_buf).expect("decode response header");

    let mut payload = Vec::new();
    stream
        .read_to_end(&mut payload)
        .await
        .expect("read response payload");

    (response, payload)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_end_to_end_benchmark_request() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let (socket_path, server) = spawn_server(&dir).await;

    let results = client::run_benchmark(&socket_path)
        .await
        .expect("benchmark request succeeds");

    // 1000 priority syscalls per phase cannot finish inside a microsecond.
    assert!(results.read_us > 0);
    assert!(results.write_us > 0);

    server.abort();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_consecutive_requests_are_independent() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let (socket_path, server) = spawn_server(&dir).await;

    let first = client::run_benchmark(&socket_path)
        .await
        .expect("first request succeeds");
    let second = client::run_benchmark(&socket_path)
        .await
        .expect("second request succeeds");

    // Each run brackets its own phases; totals stay in the same ballpark
    // rather than accumulating across requests.
    assert!(second.read_us < first.read_us.saturating_mul(100).max(1_000_000));

    server.abort();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_undersized_buffer_is_rejected() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let (socket_path, server) = spawn_server(&dir).await;

    let (response, payload) = send_raw(
        &socket_path,
        CONTROL_RUN_BENCHMARK,
        (BenchmarkResults::WIRE_SIZE - 1) as u32,
    )
    .await;

    assert_eq!(response.status, Status::BufferTooSmall);
    assert_eq!(response.bytes_returned, 0);
    assert!(payload.is_empty(), "no payload may follow a failed request");

    server.abort();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unknown_control_code_is_rejected() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let (socket_path, server) = spawn_server(&dir).await;

    let (response, payload) =
        send_raw(&socket_path, 0x0999, BenchmarkResults::WIRE_SIZE as u32).await;

    assert_eq!(response.status, Status::UnsupportedRequest);
    assert_eq!(response.bytes_returned, 0);
    assert!(payload.is_empty());

    server.abort();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_success_returns_exactly_one_record() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let (socket_path, server) = spawn_server(&dir).await;

    let (response, payload) = send_raw(
        &socket_path,
        CONTROL_RUN_BENCHMARK,
        BenchmarkResults::WIRE_SIZE as u32,
    )
    .await;

    assert_eq!(response.status, Status::Ok);
    assert_eq!(response.bytes_returned as usize, BenchmarkResults::WIRE_SIZE);
    assert_eq!(payload.len(), BenchmarkResults::WIRE_SIZE);
    assert!(BenchmarkResults::decode(&payload).is_some());

    server.abort();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_missing_socket_is_a_fatal_open_error() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let socket_path = dir.path().join("absent.sock");

    let err = client::run_benchmark(&socket_path)
        .await
        .expect_err("connecting to a missing socket must fail");

    match err {
        ClientError::ChannelOpen { source, .. } => {
            // The underlying system error is surfaced verbatim.
            assert!(source.raw_os_error().is_some());
        }
        other => panic!("expected ChannelOpen, got {other:?}"),
    }
}
