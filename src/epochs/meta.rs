//! Boundary and midpoint descriptors of epochs.

use super::check_sorted;
use crate::core::midpoint;
use crate::error::{EpochError, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Boundaries of one epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochMeta {
    /// 1-based epoch index.
    pub epoch: usize,
    pub start: NaiveDateTime,
    pub mid: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Describe the epochs delimited by `changepoints` within `[first, last]`.
///
/// Returns `changepoints.len() + 1` rows: the first epoch starts at `first`,
/// the last one ends at `last`.
pub fn epoch_metadata(
    first: NaiveDateTime,
    last: NaiveDateTime,
    changepoints: &[NaiveDateTime],
) -> Result<Vec<EpochMeta>> {
    if first > last {
        return Err(EpochError::InvalidDate(format!(
            "window start {first} is after window end {last}"
        )));
    }
    check_sorted(changepoints)?;

    let starts = std::iter::once(first).chain(changepoints.iter().copied());
    let ends = changepoints.iter().copied().chain(std::iter::once(last));

    Ok(starts
        .zip(ends)
        .enumerate()
        .map(|(i, (start, end))| EpochMeta {
            epoch: i + 1,
            start,
            mid: midpoint(start, end),
            end,
        })
        .collect())
}
