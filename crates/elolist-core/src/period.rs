//! Rating periods.
//!
//! The rating list names its rating column after the period it describes,
//! e.g. `SEP24` or `jan25`. The period is stored as the first day of that
//! month.

use chrono::NaiveDate;

use crate::{Error, Result};

const MONTHS: [&str; 12] = [
  "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov",
  "dec",
];

/// True if `header` has the `mmmYY` shape of a rating-period column.
///
/// Only the shape is checked; the month abbreviation itself is resolved by
/// [`parse_period`].
pub fn looks_like_period(header: &str) -> bool {
  let bytes = header.trim().as_bytes();
  bytes.len() == 5
    && bytes[..3].iter().all(u8::is_ascii_alphabetic)
    && bytes[3..].iter().all(u8::is_ascii_digit)
}

/// Resolve a `mmmYY` header to the first day of its month in year `20YY`.
pub fn parse_period(header: &str) -> Result<NaiveDate> {
  let trimmed = header.trim();
  if !looks_like_period(trimmed) {
    return Err(Error::InvalidPeriod(header.to_owned()));
  }

  let month_abbrev = trimmed[..3].to_ascii_lowercase();
  let month = MONTHS
    .iter()
    .position(|m| *m == month_abbrev)
    .ok_or_else(|| Error::InvalidPeriod(header.to_owned()))?;
  let year: i32 = trimmed[3..]
    .parse()
    .map_err(|_| Error::InvalidPeriod(header.to_owned()))?;

  NaiveDate::from_ymd_opt(2000 + year, month as u32 + 1, 1)
    .ok_or_else(|| Error::InvalidPeriod(header.to_owned()))
}
