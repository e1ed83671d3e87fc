//! Calendar helpers shared by the signal and epoch stages.

use crate::error::{EpochError, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Number of seconds in one week.
pub const SECONDS_PER_WEEK: f64 = 60.0 * 60.0 * 24.0 * 7.0;

/// Convert a fractional-year date (e.g. `2021.37`) to a calendar date.
///
/// The integer part is the year. The fractional part is scaled by 365 days and,
/// in leap years, shifted by one extra day before truncation; the resulting
/// day offset is added to January 1st and clamped to December 31st.
pub fn fractional_year_to_date(date: f64) -> Result<NaiveDate> {
    if !date.is_finite() {
        return Err(EpochError::InvalidDate(format!(
            "fractional year {date} is not finite"
        )));
    }

    let floor = date.floor();
    if floor < i32::MIN as f64 || floor > i32::MAX as f64 {
        return Err(EpochError::InvalidDate(format!(
            "fractional year {date} is out of range"
        )));
    }
    let year = floor as i32;
    let frac = date - floor;

    let jan1 = NaiveDate::from_ymd_opt(year, 1, 1)
        .ok_or_else(|| EpochError::InvalidDate(format!("year {year} is out of range")))?;
    let dec31 = NaiveDate::from_ymd_opt(year, 12, 31)
        .ok_or_else(|| EpochError::InvalidDate(format!("year {year} is out of range")))?;
    let leap = NaiveDate::from_ymd_opt(year, 2, 29).is_some();

    let offset = (frac * 365.0 + if leap { 1.0 } else { 0.0 }).floor() as i64;
    Ok((jan1 + Duration::days(offset)).min(dec31))
}

/// Midnight at the start of `date`.
pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Elapsed time from `start` to `end` in fractional weeks.
pub fn weeks_between(start: NaiveDateTime, end: NaiveDateTime) -> f64 {
    let delta = end - start;
    let seconds = delta.num_seconds() as f64 + delta.subsec_nanos() as f64 * 1e-9;
    seconds / SECONDS_PER_WEEK
}

/// Arithmetic mean of two timestamps.
pub fn midpoint(start: NaiveDateTime, end: NaiveDateTime) -> NaiveDateTime {
    start + (end - start) / 2
}
