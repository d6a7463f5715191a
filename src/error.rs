use thiserror::Error;

use crate::listing::Dialect;

/// Failure to decode one raw listing line into an [`Entry`](crate::listing::Entry).
///
/// None of these are ever coerced into a default entry; a line that cannot be
/// decoded surfaces to the caller of the listing operation that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The line does not decompose into the expected fields.
    #[error("listing line has too few fields: {0:?}")]
    Truncated(String),
    /// The first character of the permission field is not in the type table.
    #[error("unrecognized type descriptor {0:?}")]
    UnknownTypeDescriptor(char),
    /// The size field is not an unsigned integer.
    #[error("invalid size field {0:?}")]
    InvalidSize(String),
    /// The month/day/year/time fields do not combine into a timestamp.
    #[error("unparseable modification date {0:?}")]
    InvalidDate(String),
    /// No line parser exists for the remote dialect.
    #[error("{0} listings are not supported")]
    UnsupportedDialect(Dialect),
}
