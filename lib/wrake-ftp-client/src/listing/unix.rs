/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the wrake project authors
 */

use std::str::FromStr;

use chrono::NaiveDate;

use super::split_fields;
use crate::facts::{FtpFileEntryType, FtpFileFacts};

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    MONTHS
        .iter()
        .position(|m| *m == lower.as_str())
        .map(|i| i as u32 + 1)
}

fn is_mode_string(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() < 10 {
        return false;
    }
    if !matches!(bytes[0], b'-' | b'd' | b'l' | b'b' | b'c' | b'p' | b's') {
        return false;
    }
    bytes[1..10]
        .iter()
        .all(|b| matches!(b, b'r' | b'w' | b'x' | b's' | b'S' | b't' | b'T' | b'-'))
}

pub(super) fn matches_line(line: &str) -> bool {
    line.split_whitespace()
        .next()
        .is_some_and(is_mode_string)
}

/// Parse one `ls -l` style line:
///
/// `-rw-r--r--   1 owner group     1024 Jan  1  2020 name`
///
/// The date is either `Mon DD YYYY` or `Mon DD HH:MM`; the time form
/// carries no year, so no modify time is reported for it.
pub(super) fn parse_line(line: &str) -> Option<FtpFileFacts> {
    let (fields, name) = split_fields(line, 8)?;
    if !is_mode_string(fields[0]) {
        return None;
    }
    if name.is_empty() {
        return None;
    }

    let entry_type = match fields[0].as_bytes()[0] {
        b'-' => FtpFileEntryType::File,
        b'd' => FtpFileEntryType::Directory,
        b'l' => FtpFileEntryType::Symlink,
        _ => FtpFileEntryType::Unknown,
    };

    let name = if entry_type == FtpFileEntryType::Symlink {
        match name.split_once(" -> ") {
            Some((link_name, _target)) => link_name,
            None => name,
        }
    } else {
        name
    };

    let mut ff = FtpFileFacts::new(name);
    ff.set_entry_type(entry_type);

    if let Ok(size) = u64::from_str(fields[4]) {
        ff.set_size(size);
    }

    if let (Some(month), Ok(day), Ok(year)) = (
        month_number(fields[5]),
        u32::from_str(fields[6]),
        i32::from_str(fields[7]),
    ) {
        // the HH:MM form fails the year parse above and is left unset
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            if let Some(dt) = date.and_hms_opt(0, 0, 0) {
                ff.set_mtime(dt.and_utc());
            }
        }
    }

    Some(ff)
}
