//! Parser for `ls -la` output as produced by POSIX-like remotes.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::HashSet;

use super::{split_whitespace_limit, Entry, EntryKind};
use crate::error::ParseError;

// Field layout of one `ls -la` line, split on whitespace runs:
//   0 mode  1 links  2 user  3 group  4 size  5 month  6 day  7 year|time  8 name
// The name field absorbs the rest of the line since names may contain spaces.
const FIELD_COUNT: usize = 9;

pub(super) fn parse_line(
    raw: &str,
    parent_path: &str,
    ignore_names: &HashSet<String>,
    current_year: i32,
) -> Result<Option<Entry>, ParseError> {
    let fields = split_whitespace_limit(raw, FIELD_COUNT);

    // The ignore check runs before any fallible decoding. Summary rows
    // (`total N`) have no name field, so their name is the empty string and
    // the default ignore-set drops them here.
    let name_field = fields.get(8).copied().unwrap_or("");
    let (name, symlink_target) = match name_field.split_once("->") {
        Some((name, target)) => (name.trim(), Some(target.trim())),
        None => (name_field.trim(), None),
    };

    if ignore_names.contains(name) {
        return Ok(None);
    }

    if fields.len() < FIELD_COUNT {
        return Err(ParseError::Truncated(raw.to_owned()));
    }

    let mut mode = fields[0].chars();
    let type_descriptor = match mode.next() {
        Some(c) => c,
        None => return Err(ParseError::Truncated(raw.to_owned())),
    };
    let kind = EntryKind::from_descriptor(type_descriptor)?;
    let permissions = mode.as_str().to_owned();

    let size = fields[4]
        .parse::<u64>()
        .map_err(|_| ParseError::InvalidSize(fields[4].to_owned()))?;

    let modified = parse_modified(fields[6], fields[5], fields[7], current_year)?;

    let path = match (kind, symlink_target) {
        (EntryKind::Symlink, Some(target)) => target.to_owned(),
        _ => join_remote(parent_path, name),
    };

    Ok(Some(Entry {
        name: name.to_owned(),
        path,
        kind,
        type_descriptor,
        size,
        permissions,
        modified,
    }))
}

/// Reconstructs the modification timestamp from the listing's partial date.
///
/// Field 7 of the listing is a 4-digit year for older entries and a
/// time-of-day for recent ones; an all-digit token is taken as the year
/// (with a midnight time), anything else as the time with the current year
/// substituted.
fn parse_modified(
    day: &str,
    month: &str,
    year_or_time: &str,
    current_year: i32,
) -> Result<NaiveDateTime, ParseError> {
    let is_year = !year_or_time.is_empty() && year_or_time.bytes().all(|b| b.is_ascii_digit());

    let parsed = if is_year {
        NaiveDate::parse_from_str(&format!("{day} {month} {year_or_time}"), "%d %b %Y")
            .map(|date| date.and_time(NaiveTime::MIN))
    } else {
        NaiveDateTime::parse_from_str(
            &format!("{day} {month} {current_year} {year_or_time}"),
            "%d %b %Y %H:%M",
        )
    };

    parsed.map_err(|_| ParseError::InvalidDate(format!("{day} {month} {year_or_time}")))
}

fn join_remote(parent: &str, name: &str) -> String {
    if parent.ends_with('/') {
        format!("{parent}{name}")
    } else {
        format!("{parent}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::default_ignore_names;

    const YEAR: i32 = 2024;

    fn parse(raw: &str, parent: &str) -> Result<Option<Entry>, ParseError> {
        parse_line(raw, parent, &default_ignore_names(), YEAR)
    }

    fn date(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, min, 0))
            .expect("valid test date")
    }

    #[test]
    fn parses_a_directory_line() {
        let entry = parse("drwxr-xr-x 2 user group 4096 Jan 5 09:30 subdir", "/home/user")
            .unwrap()
            .unwrap();

        assert_eq!(entry.name, "subdir");
        assert_eq!(entry.path, "/home/user/subdir");
        assert_eq!(entry.kind, EntryKind::Dir);
        assert_eq!(entry.type_descriptor, 'd');
        assert_eq!(entry.size, 4096);
        assert_eq!(entry.permissions, "rwxr-xr-x");
        assert_eq!(entry.modified, date(YEAR, 1, 5, 9, 30));
    }

    #[test]
    fn symlink_path_is_the_resolved_target() {
        let entry = parse("lrwxrwxrwx 1 user group 7 Jan 5 09:30 link -> target", "/home/user")
            .unwrap()
            .unwrap();

        assert_eq!(entry.kind, EntryKind::Symlink);
        assert_eq!(entry.name, "link");
        assert_eq!(entry.path, "target");
    }

    #[test]
    fn regular_file_without_arrow_joins_parent_and_name() {
        let entry = parse("-rw-r--r-- 1 user group 220 Jan 5 09:30 notes.txt", "/home/user")
            .unwrap()
            .unwrap();

        assert_eq!(entry.kind, EntryKind::File);
        assert_eq!(entry.path, "/home/user/notes.txt");
    }

    #[test]
    fn root_parent_does_not_double_the_separator() {
        let entry = parse("drwxr-xr-x 12 root root 4096 Jan 5 09:30 etc", "/")
            .unwrap()
            .unwrap();
        assert_eq!(entry.path, "/etc");
    }

    #[test]
    fn name_keeps_its_inner_spaces() {
        let entry = parse("-rw-r--r-- 1 user group 100 Jan 5 09:30 my notes.txt", "/srv")
            .unwrap()
            .unwrap();

        assert_eq!(entry.name, "my notes.txt");
        assert_eq!(entry.path, "/srv/my notes.txt");
    }

    #[test]
    fn all_digit_seventh_field_is_a_year() {
        let entry = parse("-rw-r--r-- 1 user group 220 Sep 1 2023 .profile", "/home/user")
            .unwrap()
            .unwrap();

        assert_eq!(entry.modified, date(2023, 9, 1, 0, 0));
    }

    #[test]
    fn time_token_substitutes_the_current_year() {
        let entry = parse("-rw-r--r-- 1 user group 220 Dec 31 23:59 old.log", "/var/log")
            .unwrap()
            .unwrap();

        assert_eq!(entry.modified, date(YEAR, 12, 31, 23, 59));
    }

    #[test]
    fn unknown_type_descriptor_is_an_error() {
        assert_eq!(
            parse("brw-rw---- 1 root disk 0 Jan 5 09:30 sda", "/dev"),
            Err(ParseError::UnknownTypeDescriptor('b'))
        );
    }

    #[test]
    fn bad_size_is_an_error() {
        assert_eq!(
            parse("-rw-r--r-- 1 user group huge Jan 5 09:30 notes.txt", "/srv"),
            Err(ParseError::InvalidSize("huge".to_owned()))
        );
    }

    #[test]
    fn bad_month_is_an_error() {
        assert_eq!(
            parse("-rw-r--r-- 1 user group 220 Foo 5 09:30 notes.txt", "/srv"),
            Err(ParseError::InvalidDate("5 Foo 09:30".to_owned()))
        );
    }

    #[test]
    fn dot_entries_produce_nothing() {
        assert_eq!(parse("drwxr-xr-x 5 user group 4096 Jan 5 09:30 .", "/home"), Ok(None));
        assert_eq!(parse("drwxr-xr-x 9 root root 4096 Jan 4 18:02 ..", "/home"), Ok(None));
    }

    #[test]
    fn summary_row_is_dropped_by_the_default_ignore_set() {
        assert_eq!(parse("total 24", "/home"), Ok(None));
    }

    #[test]
    fn summary_row_is_truncated_without_the_empty_ignore_name() {
        let none = HashSet::new();
        assert_eq!(
            parse_line("total 24", "/home", &none, YEAR),
            Err(ParseError::Truncated("total 24".to_owned()))
        );
    }

    #[test]
    fn arrow_in_a_regular_file_name_still_splits_off_the_name() {
        let entry = parse("-rw-r--r-- 1 user group 10 Jan 5 09:30 in -> out", "/srv")
            .unwrap()
            .unwrap();

        assert_eq!(entry.name, "in");
        assert_eq!(entry.path, "/srv/in");
    }
}
