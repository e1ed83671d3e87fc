//! Weekly time grid spanning an observation window.
//!
//! Buckets are ISO weeks. The grid is contiguous and gap-free: every ISO week
//! between the first and the last day of the window has exactly one bucket,
//! indexed sequentially from zero.

use super::dates::start_of_day;
use crate::error::{EpochError, Result};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One ISO week of the observation window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeBucket {
    /// ISO week-numbering year.
    pub year: i32,
    /// ISO week number (1..=53).
    pub week: u32,
    /// Sequential bucket index.
    pub index: usize,
    /// First day of the window that falls in this week.
    pub start: NaiveDate,
}

impl TimeBucket {
    /// Bucket start as a timestamp at midnight.
    pub fn timestamp(&self) -> NaiveDateTime {
        start_of_day(self.start)
    }
}

/// The canonical bucket universe for an observation window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeGrid {
    buckets: Vec<TimeBucket>,
    first: NaiveDate,
    last: NaiveDate,
}

fn week_monday(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

impl TimeGrid {
    /// Build the grid covering `[first, last]` inclusive.
    pub fn span(first: NaiveDate, last: NaiveDate) -> Result<Self> {
        if first > last {
            return Err(EpochError::InvalidDate(format!(
                "window start {first} is after window end {last}"
            )));
        }

        let mut buckets = Vec::new();
        let mut start = first;
        while start <= last {
            let iso = start.iso_week();
            buckets.push(TimeBucket {
                year: iso.year(),
                week: iso.week(),
                index: buckets.len(),
                start,
            });
            start = week_monday(start) + Duration::days(7);
        }

        Ok(Self {
            buckets,
            first,
            last,
        })
    }

    /// Build the grid spanning the earliest and latest of `timestamps`.
    pub fn from_timestamps<I>(timestamps: I) -> Result<Self>
    where
        I: IntoIterator<Item = NaiveDateTime>,
    {
        let mut bounds: Option<(NaiveDateTime, NaiveDateTime)> = None;
        for ts in timestamps {
            bounds = Some(match bounds {
                None => (ts, ts),
                Some((lo, hi)) => (lo.min(ts), hi.max(ts)),
            });
        }
        let (lo, hi) = bounds.ok_or(EpochError::EmptyData)?;
        Self::span(lo.date(), hi.date())
    }

    /// Number of buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn buckets(&self) -> &[TimeBucket] {
        &self.buckets
    }

    pub fn get(&self, index: usize) -> Option<&TimeBucket> {
        self.buckets.get(index)
    }

    /// First day of the window.
    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    /// Last day of the window.
    pub fn last_day(&self) -> NaiveDate {
        self.last
    }

    /// Index of the bucket containing `date`, or `None` outside the window.
    pub fn bucket_of(&self, date: NaiveDate) -> Option<usize> {
        if date < self.first || date > self.last {
            return None;
        }
        let weeks = (week_monday(date) - week_monday(self.first)).num_days() / 7;
        Some(weeks as usize)
    }

    /// Start timestamp of the bucket at `index`.
    pub fn timestamp(&self, index: usize) -> Option<NaiveDateTime> {
        self.buckets.get(index).map(TimeBucket::timestamp)
    }
}
