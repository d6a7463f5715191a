#[macro_use]
extern crate log;
#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate async_trait;

/// Client side
pub mod client;
mod error;
mod escape;
/// Listing-dialect parsing
pub mod listing;
mod stat;

pub use error::ParseError;
pub use escape::escape_path;
pub use stat::{FileType, PathStat};
