//! Text-listing decoding.
//!
//! The remote side is driven with plain `ls` invocations, so the "wire
//! format" of this crate is whatever the remote's listing convention prints.
//! Each convention is a [`Dialect`]; a dialect turns one raw listing line
//! into an [`Entry`].

mod posix;
mod windows;

use chrono::{Datelike, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::ParseError;

/// The remote operating system's listing and command-line convention.
///
/// Selected once per session and passed explicitly into the parser; it is
/// not mutable session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dialect {
    Posix,
    Windows,
}

impl Dialect {
    /// Decodes one raw listing line into an entry.
    ///
    /// Returns `Ok(None)` for lines that carry no entry: empty lines,
    /// summary rows (`total N`), and names in `ignore_names`.
    pub fn parse_line(
        self,
        raw: &str,
        parent_path: &str,
        ignore_names: &HashSet<String>,
    ) -> Result<Option<Entry>, ParseError> {
        if raw.is_empty() {
            return Ok(None);
        }

        match self {
            Self::Posix => posix::parse_line(raw, parent_path, ignore_names, Local::now().year()),
            Self::Windows => windows::parse_line(raw, parent_path, ignore_names),
        }
    }

    /// Guesses the dialect from the raw lines of a detailed listing.
    ///
    /// Looks at the first whitespace-delimited field of the first data row
    /// (the row after the summary line): a date-like token of exactly 8
    /// bytes with no ASCII letter reads as Windows, a permission string as
    /// Posix. Best-effort fallback for remotes without `uname`; prefer the
    /// probe run by [`ShellFsSession::new`](crate::client::ShellFsSession::new).
    #[must_use]
    pub fn from_listing<S: AsRef<str>>(lines: &[S]) -> Self {
        let first_field = lines
            .get(1)
            .and_then(|row| row.as_ref().split_whitespace().next())
            .unwrap_or("");

        if first_field.len() == 8 && !first_field.contains(|c: char| c.is_ascii_alphabetic()) {
            Self::Windows
        } else {
            Self::Posix
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Posix => write!(f, "posix"),
            Self::Windows => write!(f, "windows"),
        }
    }
}

/// Kind of a filesystem object, derived from its listing type descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    Dir,
    File,
    Symlink,
}

impl EntryKind {
    /// Maps a raw type-descriptor character through the fixed table
    /// `{'d': Dir, '-': File, 'l': Symlink}`.
    pub fn from_descriptor(descriptor: char) -> Result<Self, ParseError> {
        match descriptor {
            'd' => Ok(Self::Dir),
            '-' => Ok(Self::File),
            'l' => Ok(Self::Symlink),
            other => Err(ParseError::UnknownTypeDescriptor(other)),
        }
    }

    /// The descriptor character this kind decodes from.
    #[must_use]
    pub fn descriptor(self) -> char {
        match self {
            Self::Dir => 'd',
            Self::File => '-',
            Self::Symlink => 'l',
        }
    }
}

/// One filesystem object observed in a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Base name only, trimmed.
    pub name: String,
    /// Fully-qualified remote path. For a symbolic link this is the resolved
    /// target as printed after `->`, not the link's own location.
    pub path: String,
    /// Kind derived from [`Entry::type_descriptor`].
    pub kind: EntryKind,
    /// The raw dialect character the kind was derived from.
    pub type_descriptor: char,
    /// Size in bytes.
    pub size: u64,
    /// Permission bits as reported by the listing, not normalized.
    pub permissions: String,
    /// Modification timestamp reconstructed from the listing's partial date
    /// fields; the current year is substituted when the listing omits it.
    pub modified: NaiveDateTime,
}

/// Names that never produce an entry: the empty name (summary rows have no
/// name field) and the dot entries.
#[must_use]
pub fn default_ignore_names() -> HashSet<String> {
    ["", ".", ".."].iter().map(ToString::to_string).collect()
}

/// Splits on runs of whitespace into at most `limit` fields; the last field
/// absorbs the remainder of the line with its leading whitespace collapsed.
pub(crate) fn split_whitespace_limit(raw: &str, limit: usize) -> Vec<&str> {
    let mut fields = Vec::with_capacity(limit);
    let mut rest = raw.trim_start();

    while fields.len() + 1 < limit {
        match rest.find(char::is_whitespace) {
            Some(end) => {
                fields.push(&rest[..end]);
                rest = rest[end..].trim_start();
                if rest.is_empty() {
                    return fields;
                }
            }
            None => {
                if !rest.is_empty() {
                    fields.push(rest);
                }
                return fields;
            }
        }
    }

    if !rest.is_empty() {
        fields.push(rest);
    }
    fields
}
