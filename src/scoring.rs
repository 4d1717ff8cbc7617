// src/scoring.rs
//! Candidate scoring against a fuzzy date/time target.
//!
//! Lower is better. `Some(0)` is an exact hit (the entry URL carries the
//! target's `/YYYY/MM/DD/HHMMSS` path). `None` means the entry is not a
//! candidate at all: no usable `published`, or outside the day/hour window.
//!
//! Date and time-of-day differences are measured independently, in the
//! entry's own UTC offset. An entry at 23:59:59 and a target at 00:00:01 the
//! next day are one calendar day and ~86398 s of clock time apart, so they do
//! not match each other through the numeric path.

use chrono::Timelike;

use crate::feed::RawEntry;
use crate::target::SearchTarget;

pub const MAX_DATE_DIFF_DAYS: u64 = 7;
pub const MAX_TIME_DIFF_SECS: u64 = 3600;
pub const SECS_PER_DAY: u64 = 86_400;

/// An admissible entry held for the duration of one resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub entry_id: String,
    pub score: u64,
    pub title: String,
}

impl Candidate {
    pub fn from_entry(entry: &RawEntry, score: u64) -> Self {
        Self {
            entry_id: entry.entry_id().to_string(),
            score,
            title: entry.title.clone().unwrap_or_default(),
        }
    }

    pub fn is_exact(&self) -> bool {
        self.score == 0
    }
}

/// URL used for the exact-path check: the alternate link, else the raw id.
fn match_url(entry: &RawEntry) -> &str {
    entry.alternate_url.as_deref().unwrap_or(&entry.id)
}

pub fn score(entry: &RawEntry, target: &SearchTarget) -> Option<u64> {
    let published = entry.published_at.as_ref()?;

    if match_url(entry).contains(&target.exact_path()) {
        return Some(0);
    }

    let date_diff = (published.date_naive() - target.date)
        .num_days()
        .unsigned_abs();
    if date_diff > MAX_DATE_DIFF_DAYS {
        return None;
    }

    let entry_secs = i64::from(published.time().num_seconds_from_midnight());
    let time_diff = (entry_secs - i64::from(target.time_of_day)).unsigned_abs();
    if time_diff > MAX_TIME_DIFF_SECS {
        return None;
    }

    Some(date_diff * SECS_PER_DAY + time_diff)
}

/// Minimum score; on ties the earliest-seen candidate wins.
pub fn best_candidate(candidates: Vec<Candidate>) -> Option<Candidate> {
    candidates.into_iter().min_by_key(|c| c.score)
}
