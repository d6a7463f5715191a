//! Windows (`dir`-style) listings.
//!
//! No parser exists for this dialect: the field layout of `dir` output was
//! never specified for this client, so every line surfaces an explicit
//! [`ParseError::UnsupportedDialect`] instead of a guessed entry.

use std::collections::HashSet;

use super::{Dialect, Entry};
use crate::error::ParseError;

pub(super) fn parse_line(
    _raw: &str,
    _parent_path: &str,
    _ignore_names: &HashSet<String>,
) -> Result<Option<Entry>, ParseError> {
    Err(ParseError::UnsupportedDialect(Dialect::Windows))
}
