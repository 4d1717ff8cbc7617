// src/target.rs
//! Decomposes a date-encoded entry reference such as
//! `https://example.hatenablog.com/entry/2024/01/01/123456` into a search target.

use chrono::NaiveDate;
use once_cell::sync::OnceCell;
use regex::Regex;
use std::fmt;

use crate::error::{ResolveError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTarget {
    pub date: NaiveDate,
    /// Seconds since local midnight.
    pub time_of_day: u32,
    /// Digits exactly as they appeared in the reference (`HHMM` or `HHMMSS`).
    pub raw_time_digits: String,
}

fn reference_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| {
        Regex::new(r"/([0-9]{4})/([0-9]{2})/([0-9]{2})/([0-9]{6}|[0-9]{4})(?:[/?#]|$)").unwrap()
    })
}

impl SearchTarget {
    pub fn new(date: NaiveDate, hour: u32, minute: u32, second: u32) -> Result<Self> {
        let raw = format!("{hour:02}{minute:02}{second:02}");
        if hour > 23 || minute > 59 || second > 59 {
            return Err(ResolveError::invalid_reference(&raw, "time out of range"));
        }
        Ok(Self {
            date,
            time_of_day: hour * 3600 + minute * 60 + second,
            raw_time_digits: raw,
        })
    }

    pub fn parse(reference: &str) -> Result<Self> {
        let caps = reference_re().captures(reference).ok_or_else(|| {
            ResolveError::invalid_reference(reference, "expected /YYYY/MM/DD/HHMMSS")
        })?;

        let num = |i: usize| -> u32 { caps[i].parse().unwrap_or(u32::MAX) };
        let (year, month, day) = (num(1), num(2), num(3));
        let date = NaiveDate::from_ymd_opt(year as i32, month, day)
            .ok_or_else(|| ResolveError::invalid_reference(reference, "not a calendar date"))?;

        let raw = caps[4].to_string();
        let hour: u32 = raw[0..2].parse().unwrap_or(u32::MAX);
        let minute: u32 = raw[2..4].parse().unwrap_or(u32::MAX);
        let second: u32 = if raw.len() == 6 {
            raw[4..6].parse().unwrap_or(u32::MAX)
        } else {
            0
        };
        if hour > 23 || minute > 59 || second > 59 {
            return Err(ResolveError::invalid_reference(
                reference,
                "time of day out of range",
            ));
        }

        Ok(Self {
            date,
            time_of_day: hour * 3600 + minute * 60 + second,
            raw_time_digits: raw,
        })
    }

    /// `/YYYY/MM/DD/<raw digits>`, the substring an exact entry URL carries.
    pub fn exact_path(&self) -> String {
        format!("/{}/{}", self.date.format("%Y/%m/%d"), self.raw_time_digits)
    }
}

impl fmt::Display for SearchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.exact_path())
    }
}
