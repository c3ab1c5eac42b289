/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the wrake project authors
 */

//! Heuristic decoding of legacy `LIST` output.
//!
//! Legacy listings have no standard shape; the decoder samples the
//! response to guess the source format before parsing. Lines that do not
//! parse under the detected format are skipped, never fatal.

use crate::facts::FtpFileFacts;

mod msdos;
mod unix;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingFormat {
    Unix,
    Msdos,
    Unknown,
}

const DETECT_SAMPLE_LINES: usize = 25;

/// Guess the listing format from a sample of lines.
pub fn detect_format<'a, I>(lines: I) -> ListingFormat
where
    I: IntoIterator<Item = &'a str>,
{
    let mut unix_votes = 0usize;
    let mut msdos_votes = 0usize;

    for line in lines.into_iter().take(DETECT_SAMPLE_LINES) {
        if unix::matches_line(line) {
            unix_votes += 1;
        } else if msdos::matches_line(line) {
            msdos_votes += 1;
        }
    }

    if unix_votes == 0 && msdos_votes == 0 {
        ListingFormat::Unknown
    } else if unix_votes >= msdos_votes {
        ListingFormat::Unix
    } else {
        ListingFormat::Msdos
    }
}

/// Decode a whole legacy listing body into entries, in server order.
pub fn parse_legacy_listing(text: &str) -> Vec<FtpFileFacts> {
    let lines: Vec<&str> = text
        .lines()
        .map(|l| l.trim_end_matches('\r'))
        .filter(|l| !l.trim().is_empty())
        .collect();

    let format = detect_format(lines.iter().copied());

    let mut entries = Vec::new();
    for line in lines {
        let parsed = match format {
            ListingFormat::Unix => unix::parse_line(line),
            ListingFormat::Msdos => msdos::parse_line(line),
            ListingFormat::Unknown => None,
        };
        if let Some(ff) = parsed {
            entries.push(ff);
        }
    }
    entries
}

/// Split off the first `n` whitespace separated fields, returning them
/// together with the remainder of the line (which may itself contain
/// whitespace, e.g. a file name).
pub(crate) fn split_fields(line: &str, n: usize) -> Option<(Vec<&str>, &str)> {
    let mut fields = Vec::with_capacity(n);
    let mut rest = line;
    for _ in 0..n {
        rest = rest.trim_start();
        let end = rest.find(char::is_whitespace)?;
        fields.push(&rest[..end]);
        rest = &rest[end..];
    }
    Some((fields, rest.trim_start()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::FtpFileEntryType;

    #[test]
    fn detect_unix() {
        let listing = "total 12\r\n-rw-r--r--   1 ftp  ftp        10 Jan  1  2020 a.txt\r\ndrwxr-xr-x   2 ftp  ftp      4096 Jun 30 10:02 sub\r\n";
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(detect_format(lines), ListingFormat::Unix);
    }

    #[test]
    fn detect_msdos() {
        let listing = "01-16-02  11:14AM       <DIR>          www\r\n01-16-02  11:14AM              1234 doc.txt\r\n";
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(detect_format(lines), ListingFormat::Msdos);
    }

    #[test]
    fn detect_unknown() {
        assert_eq!(detect_format(["what is this even"]), ListingFormat::Unknown);
    }

    #[test]
    fn parse_unix_listing() {
        let listing = "total 12\r\n-rw-r--r--   1 ftp  ftp        10 Jan  1  2020 a.txt\r\ndrwxr-xr-x   2 ftp  ftp      4096 Jun 30 10:02 sub dir\r\nlrwxrwxrwx   1 ftp  ftp         5 Jan  1  2020 link -> a.txt\r\n";
        let entries = parse_legacy_listing(listing);
        assert_eq!(entries.len(), 3);

        assert_eq!(entries[0].name(), "a.txt");
        assert_eq!(*entries[0].entry_type(), FtpFileEntryType::File);
        assert_eq!(entries[0].size(), Some(10));
        assert!(entries[0].mtime().is_some());

        assert_eq!(entries[1].name(), "sub dir");
        assert!(entries[1].entry_type().is_dir());
        // time-form dates carry no year, so no timestamp is reported
        assert!(entries[1].mtime().is_none());

        assert_eq!(entries[2].name(), "link");
        assert_eq!(*entries[2].entry_type(), FtpFileEntryType::Symlink);
    }

    #[test]
    fn parse_msdos_listing() {
        let listing =
            "01-16-02  11:14AM       <DIR>          www\r\n09-30-21  03:05PM              1234 doc.txt\r\n";
        let entries = parse_legacy_listing(listing);
        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0].name(), "www");
        assert!(entries[0].entry_type().is_dir());
        assert!(entries[0].size().is_none());

        assert_eq!(entries[1].name(), "doc.txt");
        assert_eq!(*entries[1].entry_type(), FtpFileEntryType::File);
        assert_eq!(entries[1].size(), Some(1234));
        assert!(entries[1].mtime().is_some());
    }
}
