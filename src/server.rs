//! Control-channel server: one request per connection, answered with a
//! benchmark result record or a failure status.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::task;
use tracing::{debug, error, info, warn};

use bench_engine::{BenchmarkEngine, PriorityLevel};
use control_channel::protocol::{
    RequestHeader, ResponseHeader, Status, MAX_INPUT_LEN, MAX_OUTPUT_CAPACITY,
    REQUEST_HEADER_LEN, RESPONSE_HEADER_LEN,
};
use control_channel::Dispatcher;

use crate::config::ServerConfig;

pub struct ControlServer {
    socket_path: PathBuf,
    dispatcher: Dispatcher,
}

impl ControlServer {
    pub fn new(config: &ServerConfig) -> Self {
        let engine = BenchmarkEngine::with_iterations(config.iterations)
            .with_elevated_level(PriorityLevel::from_nice(config.elevated_nice));

        Self {
            socket_path: config.socket_path.clone(),
            dispatcher: Dispatcher::new(engine),
        }
    }

    /// Bind the well-known socket and serve requests until Ctrl+C.
    ///
    /// Connections are handled one at a time; concurrent callers serialize
    /// behind the accept loop.
    pub async fn serve(self) -> Result<()> {
        remove_stale_socket(&self.socket_path)?;

        let listener = UnixListener::bind(&self.socket_path).with_context(|| {
            format!(
                "failed to bind control socket {}",
                self.socket_path.display()
            )
        })?;
        info!("control channel listening on {}", self.socket_path.display());

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("shutdown requested");
                    break;
                }
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, _addr)) => {
                            debug!("control channel opened");
                            if let Err(err) = self.handle_connection(stream).await {
                                warn!("request handling failed: {:#}", err);
                            }
                            debug!("control channel closed");
                        }
                        Err(err) => error!("accept failed: {}", err),
                    }
                }
            }
        }

        if let Err(err) = std::fs::remove_file(&self.socket_path) {
            warn!(
                "failed to remove control socket {}: {}",
                self.socket_path.display(),
                err
            );
        }
        info!("control channel shut down");
        Ok(())
    }

    async fn handle_connection(&self, mut stream: UnixStream) -> Result<()> {
        let mut header_buf = [0u8; REQUEST_HEADER_LEN];
        stream
            .read_exact(&mut header_buf)
            .await
            .context("failed to read request header")?;
        let header = RequestHeader::decode(&header_buf).context("malformed request header")?;

        if header.input_len > MAX_INPUT_LEN {
            anyhow::bail!(
                "request input of {} bytes exceeds the {} byte limit",
                header.input_len,
                MAX_INPUT_LEN
            );
        }
        // The benchmark request carries no input; whatever arrives is
        // drained so the frame stays aligned, then ignored.
        let mut input = vec![0u8; header.input_len as usize];
        stream
            .read_exact(&mut input)
            .await
            .context("failed to read request payload")?;

        let capacity = header.output_capacity.min(MAX_OUTPUT_CAPACITY) as usize;
        let mut out = vec![0u8; capacity];

        // The engine blocks for the whole measurement; keep the runtime's
        // other workers usable while it runs.
        let outcome = task::block_in_place(|| self.dispatcher.dispatch(header.code, &mut out));

        let (status, written) = match outcome {
            Ok(written) => (Status::Ok, written),
            Err(err) => {
                warn!("dispatch rejected: {}", err);
                (err.status(), 0)
            }
        };

        let response = ResponseHeader {
            status,
            bytes_returned: written as u32,
        };
        let mut frame = BytesMut::with_capacity(RESPONSE_HEADER_LEN + written);
        frame.put_slice(&response.encode());
        frame.put_slice(&out[..written]);

        stream
            .write_all(&frame)
            .await
            .context("failed to write response")?;
        stream.shutdown().await.ok();
        Ok(())
    }
}

/// A socket file left behind by a previous run would fail the bind.
fn remove_stale_socket(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            warn!("removed stale control socket {}", path.display());
            Ok(())
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err)
            .with_context(|| format!("failed to remove stale socket {}", path.display())),
    }
}
