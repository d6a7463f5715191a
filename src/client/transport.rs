//! Capability seam toward the SSH transport collaborator.
//!
//! Session establishment, authentication and teardown live entirely on the
//! other side of these traits; a transport handed to the client is expected
//! to be authenticated already. See `demos/client.rs` for an implementation
//! over russh execution channels.

use bytes::Bytes;
use std::io;
use std::path::Path;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::stat::PathStat;

/// Failures raised by transport implementations. Always fatal to the
/// operation that triggered them; the client never retries.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("connect: {0}")]
    Connect(String),
    #[error("authentication: {0}")]
    Auth(String),
    #[error("channel: {0}")]
    Channel(String),
    #[error("transfer: {0}")]
    Transfer(String),
    #[error("stat: {0}")]
    Stat(String),
    #[error("I/O: {0}")]
    Io(String),
}

impl From<io::Error> for TransportError {
    fn from(err: io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Output streams of one remote command execution.
///
/// Both streams stay open until the remote command finishes; [`collect`]
/// drains them fully.
///
/// [`collect`]: ExecStreams::collect
pub struct ExecStreams {
    pub stdout: Box<dyn AsyncRead + Send + Unpin>,
    pub stderr: Box<dyn AsyncRead + Send + Unpin>,
}

impl ExecStreams {
    /// Reads both streams to the end, awaiting until the remote side closes
    /// them, and returns the captured bytes as `(stdout, stderr)`.
    pub async fn collect(mut self) -> Result<(Bytes, Bytes), TransportError> {
        let mut stdout = Vec::new();
        let _ = self.stdout.read_to_end(&mut stdout).await?;

        let mut stderr = Vec::new();
        let _ = self.stderr.read_to_end(&mut stderr).await?;

        Ok((Bytes::from(stdout), Bytes::from(stderr)))
    }
}

/// A shell-execution capability: one short-lived execution channel per
/// command, with distinct stdout and stderr byte streams.
///
/// A single transport supports one live command at a time; the client
/// serializes its calls accordingly.
#[async_trait]
pub trait ShellTransport: Send {
    /// Starts `command` on the remote shell and exposes its output streams.
    async fn exec(&mut self, command: &str) -> Result<ExecStreams, TransportError>;
}

/// Bulk file-copy capability (an `scp`-like primitive). Chunking, resume and
/// integrity checking are the implementation's concern, not the client's.
#[async_trait]
pub trait CopyTransport: Send {
    /// Copies a local file to `remote_path`, creating it with `mode`.
    async fn copy_file_in(
        &mut self,
        local_path: &Path,
        remote_path: &str,
        mode: u32,
    ) -> Result<(), TransportError>;

    /// Copies the remote file at `remote_path` into `local_path`.
    async fn copy_file_out(
        &mut self,
        remote_path: &str,
        local_path: &Path,
    ) -> Result<(), TransportError>;
}

/// Structured stat capability, bypassing the text-listing path entirely.
#[async_trait]
pub trait StatTransport: Send {
    async fn stat(&mut self, path: &str) -> Result<PathStat, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn streams(stdout: &str, stderr: &str) -> ExecStreams {
        ExecStreams {
            stdout: Box::new(Cursor::new(stdout.as_bytes().to_vec())),
            stderr: Box::new(Cursor::new(stderr.as_bytes().to_vec())),
        }
    }

    #[tokio::test]
    async fn collect_drains_both_streams() {
        let (out, err) = streams("listing\n", "warning\n").collect().await.unwrap();
        assert_eq!(out.as_ref(), b"listing\n");
        assert_eq!(err.as_ref(), b"warning\n");
    }

    #[tokio::test]
    async fn collect_of_empty_streams() {
        let (out, err) = streams("", "").collect().await.unwrap();
        assert!(out.is_empty());
        assert!(err.is_empty());
    }
}
