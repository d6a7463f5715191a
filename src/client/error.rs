use thiserror::Error;

use super::transport::TransportError;
use crate::error::ParseError;

pub type ShellFsResult<T> = Result<T, Error>;

/// Enum for client errors
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Session, channel or transfer failure raised by the transport.
    #[error("transport: {0}")]
    Transport(#[from] TransportError),
    /// A remote command wrote to standard error; carries the text verbatim.
    ///
    /// Exit status is never inspected, so a non-fatal diagnostic on stderr
    /// is indistinguishable from a hard failure.
    #[error("remote command failed: {0}")]
    Command(String),
    /// A listing line could not be decoded.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The local destination of a download is missing or not writable.
    #[error("local file is not writable: {0}")]
    LocalFile(String),
}
