/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the wrake project authors
 */

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use mime::Mime;

use crate::error::FtpFileFactsParseError;

mod entry_type;
pub(crate) mod time_val;

pub use entry_type::FtpFileEntryType;

/// One directory entry, either decoded from an RFC 3659 fact record or
/// reconstructed from a legacy listing line.
///
/// Facts not understood here are preserved verbatim in `extra_fact`.
#[derive(Debug, Clone, PartialEq)]
pub struct FtpFileFacts {
    name: String,
    entry_type: FtpFileEntryType,
    size: Option<u64>,
    media_type: Option<Mime>,
    modify_time: Option<DateTime<Utc>>,
    create_time: Option<DateTime<Utc>>,
    extra: HashMap<String, String>,
}

impl FtpFileFacts {
    pub(crate) fn new(name: &str) -> Self {
        FtpFileFacts {
            name: name.to_string(),
            entry_type: FtpFileEntryType::Unknown,
            size: None,
            media_type: None,
            modify_time: None,
            create_time: None,
            extra: HashMap::new(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    #[inline]
    pub fn entry_type(&self) -> &FtpFileEntryType {
        &self.entry_type
    }

    #[inline]
    pub fn maybe_file(&self) -> bool {
        self.entry_type.maybe_file()
    }

    #[inline]
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    #[inline]
    pub fn mtime(&self) -> Option<&DateTime<Utc>> {
        self.modify_time.as_ref()
    }

    #[inline]
    pub fn ctime(&self) -> Option<&DateTime<Utc>> {
        self.create_time.as_ref()
    }

    #[inline]
    pub fn media_type(&self) -> Option<&Mime> {
        self.media_type.as_ref()
    }

    /// Facts the decoder did not recognize, keyed by lowercased fact name.
    #[inline]
    pub fn extra_fact(&self, key: &str) -> Option<&str> {
        self.extra.get(key).map(String::as_str)
    }

    pub(crate) fn set_entry_type(&mut self, t: FtpFileEntryType) {
        self.entry_type = t;
    }

    pub(crate) fn set_size(&mut self, size: u64) {
        self.size = Some(size);
    }

    pub(crate) fn set_mtime(&mut self, mtime: DateTime<Utc>) {
        self.modify_time = Some(mtime);
    }

    /// Parse one `fact=value;...<SP>name` record.
    pub(crate) fn parse_line(line: &str) -> Result<Self, FtpFileFactsParseError> {
        if let Some((facts, name)) = line.trim_start().split_once(' ') {
            let mut ff = FtpFileFacts::new(name);

            for fact in facts.split(';') {
                if fact.is_empty() {
                    continue;
                }

                if let Some((key, value)) = fact.split_once('=') {
                    ff.set_fact(key, value)?;
                } else {
                    return Err(FtpFileFactsParseError::NoDelimiterInFact(fact.to_string()));
                }
            }

            Ok(ff)
        } else {
            Err(FtpFileFactsParseError::NoSpaceDelimiter)
        }
    }

    fn set_fact(&mut self, key: &str, value: &str) -> Result<(), FtpFileFactsParseError> {
        match key.to_lowercase().as_str() {
            "type" => self.entry_type = FtpFileEntryType::parse(value),
            "modify" => {
                let dt = time_val::parse_from_str(value)
                    .map_err(FtpFileFactsParseError::InvalidModifyTime)?;
                self.modify_time = Some(dt);
            }
            "create" => {
                let dt = time_val::parse_from_str(value)
                    .map_err(FtpFileFactsParseError::InvalidCreateTime)?;
                self.create_time = Some(dt);
            }
            "size" => {
                let size = u64::from_str(value).map_err(|_| FtpFileFactsParseError::InvalidSize)?;
                self.size = Some(size);
            }
            "media-type" => {
                if let Ok(mime) = value.parse() {
                    self.media_type = Some(mime);
                }
            }
            k => {
                self.extra.insert(k.to_string(), value.to_string());
            }
        }
        Ok(())
    }
}

/// Decode a whole MLSD body into entries, in server order.
///
/// In lenient mode (`strict == false`) a malformed record is skipped
/// instead of failing the decode, so a single odd line never loses the
/// rest of the listing.
pub fn parse_machine_listing(
    text: &str,
    strict: bool,
) -> Result<Vec<FtpFileFacts>, FtpFileFactsParseError> {
    let mut entries = Vec::new();
    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        match FtpFileFacts::parse_line(line) {
            Ok(ff) => entries.push(ff),
            Err(e) => {
                if strict {
                    return Err(e);
                }
            }
        }
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_line() {
        let ff = FtpFileFacts::parse_line("type=pdir;sizd=4096;modify=20210525083610;UNIX.mode=0755;UNIX.uid=0;UNIX.gid=0;unique=804g2; /").unwrap();
        assert_eq!(ff.entry_type, FtpFileEntryType::ParentDir);
        assert!(ff.size.is_none());
        assert_eq!(ff.extra_fact("unix.mode"), Some("0755"));
    }

    #[test]
    fn parse_file_line() {
        let ff = FtpFileFacts::parse_line("type=file;size=10;modify=20200101000000; a.txt").unwrap();
        assert_eq!(ff.name(), "a.txt");
        assert_eq!(ff.entry_type, FtpFileEntryType::File);
        assert_eq!(ff.size(), Some(10));
        let mtime = ff.mtime().unwrap();
        assert_eq!(mtime.timestamp(), 1577836800);
    }

    #[test]
    fn parse_symlink_line() {
        let ff = FtpFileFacts::parse_line("type=OS.unix=symlink;size=5; link").unwrap();
        assert_eq!(ff.entry_type, FtpFileEntryType::Symlink);
    }

    #[test]
    fn machine_listing_lenient() {
        let text = "type=file;size=10;modify=20200101000000; a.txt\r\ngarbage-without-space\r\ntype=dir; sub\r\n";
        let entries = parse_machine_listing(text, false).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name(), "a.txt");
        assert_eq!(entries[1].name(), "sub");
        assert!(entries[1].entry_type().is_dir());

        assert!(parse_machine_listing(text, true).is_err());
    }
}
