//! Remote filesystem views produced by listing operations.

mod dir;

pub use dir::ReadDir;

use crate::stat::PathStat;

pub type Metadata = PathStat;
