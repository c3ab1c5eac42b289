/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the wrake project authors
 */

use chrono::format::Numeric::{Day, Hour, Minute, Month, Second, Year};
use chrono::format::{Fixed, Item, Pad, Parsed, parse};
use chrono::{DateTime, ParseResult, Utc};

/// RFC 3659 time-val: YYYYMMDDHHMMSS with an optional fractional part.
const RFC3659: &[Item<'static>] = &[
    Item::Numeric(Year, Pad::Zero),
    Item::Numeric(Month, Pad::Zero),
    Item::Numeric(Day, Pad::Zero),
    Item::Numeric(Hour, Pad::Zero),
    Item::Numeric(Minute, Pad::Zero),
    Item::Numeric(Second, Pad::Zero),
    Item::Fixed(Fixed::Nanosecond),
];

#[inline]
pub(crate) fn parse_from_str(s: &str) -> ParseResult<DateTime<Utc>> {
    let mut parsed = Parsed::new();
    parse(&mut parsed, s, RFC3659.iter())?;
    parsed.to_datetime_with_timezone(&Utc)
}
