pub mod error;
pub mod fs;
mod session;
pub mod transport;

pub use error::{Error, ShellFsResult};
pub use session::ShellFsSession;
pub use transport::{CopyTransport, ExecStreams, ShellTransport, StatTransport, TransportError};
