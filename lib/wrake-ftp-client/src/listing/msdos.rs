/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the wrake project authors
 */

use std::str::FromStr;

use chrono::NaiveDate;

use super::split_fields;
use crate::facts::{FtpFileEntryType, FtpFileFacts};

fn parse_date(s: &str) -> Option<NaiveDate> {
    let mut it = s.split('-');
    let month = u32::from_str(it.next()?).ok()?;
    let day = u32::from_str(it.next()?).ok()?;
    let year = it.next()?;
    if it.next().is_some() {
        return None;
    }
    let year = match year.len() {
        // two digit years pivot at 70, as DOS servers conventionally do
        2 => {
            let y = i32::from_str(year).ok()?;
            if y < 70 { y + 2000 } else { y + 1900 }
        }
        4 => i32::from_str(year).ok()?,
        _ => return None,
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_time(s: &str) -> Option<(u32, u32)> {
    let rest = s.strip_suffix("AM").or_else(|| s.strip_suffix("PM"))?;
    let pm = s.ends_with("PM");
    let (hour, minute) = rest.split_once(':')?;
    let hour = u32::from_str(hour).ok()?;
    let minute = u32::from_str(minute).ok()?;
    if hour > 12 || minute > 59 {
        return None;
    }
    let hour = match (hour, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, true) => h + 12,
        (h, false) => h,
    };
    Some((hour, minute))
}

pub(super) fn matches_line(line: &str) -> bool {
    let mut it = line.split_whitespace();
    let Some(date) = it.next() else {
        return false;
    };
    let Some(time) = it.next() else {
        return false;
    };
    parse_date(date).is_some() && parse_time(time).is_some()
}

/// Parse one MS-DOS `DIR` style line:
///
/// `01-16-02  11:14AM       <DIR>          www`
/// `09-30-21  03:05PM              1234 doc.txt`
pub(super) fn parse_line(line: &str) -> Option<FtpFileFacts> {
    let (fields, name) = split_fields(line, 3)?;
    if name.is_empty() {
        return None;
    }

    let date = parse_date(fields[0])?;
    let (hour, minute) = parse_time(fields[1])?;

    let mut ff = FtpFileFacts::new(name);
    if fields[2].eq_ignore_ascii_case("<DIR>") {
        ff.set_entry_type(FtpFileEntryType::Directory);
    } else {
        ff.set_entry_type(FtpFileEntryType::File);
        ff.set_size(u64::from_str(fields[2]).ok()?);
    }

    if let Some(dt) = date.and_hms_opt(hour, minute, 0) {
        ff.set_mtime(dt.and_utc());
    }

    Some(ff)
}
