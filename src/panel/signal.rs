//! Group-level weekly engagement signals.

use super::weekly::WeeklyRow;
use crate::error::{EpochError, Result};
use chrono::{Datelike, NaiveDate};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Weekly-row column that signals can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    Country,
    Name,
    Quality,
    Sector,
}

impl GroupKey {
    fn value(self, row: &WeeklyRow) -> &str {
        match self {
            GroupKey::Country => &row.country,
            GroupKey::Name => &row.name,
            GroupKey::Quality => &row.quality,
            GroupKey::Sector => row.sector.as_str(),
        }
    }
}

/// Average engagement of one group in one week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklySignalRow {
    /// Value of every grouping column.
    pub group: BTreeMap<GroupKey, String>,
    pub week_t: usize,
    /// Monday of the week.
    pub timestamp: NaiveDate,
    /// Fractional year at the middle of the ISO week.
    pub time: f64,
    /// Mean weekly post count per account.
    pub n_posts: f64,
    /// Mean of `ln(reactions_mu)`; `None` when no account has a positive value.
    pub reactions_mu: Option<f64>,
    /// Mean of `ln(reactions_rel_mu)`; `None` when no account has a positive value.
    pub reactions_rel_mu: Option<f64>,
    pub reactions_cv: f64,
    pub reactions_rel_cv: f64,
}

/// Mean of logarithms over positive values only.
#[derive(Debug, Default)]
struct LogMean {
    sum: f64,
    n: usize,
    skipped: usize,
}

impl LogMean {
    fn push(&mut self, value: f64) {
        if value > 0.0 {
            self.sum += value.ln();
            self.n += 1;
        } else {
            self.skipped += 1;
        }
    }

    fn value(&self) -> Option<f64> {
        (self.n > 0).then(|| self.sum / self.n as f64)
    }
}

#[derive(Debug)]
struct GroupWeek {
    timestamp: NaiveDate,
    n: usize,
    n_posts: f64,
    reactions_mu: LogMean,
    reactions_rel_mu: LogMean,
    reactions_cv: f64,
    reactions_rel_cv: f64,
}

impl GroupWeek {
    fn new(timestamp: NaiveDate) -> Self {
        Self {
            timestamp,
            n: 0,
            n_posts: 0.0,
            reactions_mu: LogMean::default(),
            reactions_rel_mu: LogMean::default(),
            reactions_cv: 0.0,
            reactions_rel_cv: 0.0,
        }
    }

    fn push(&mut self, row: &WeeklyRow) {
        let e = &row.engagement;
        self.n += 1;
        self.n_posts += row.n_posts as f64;
        self.reactions_mu.push(e.reactions_mu);
        self.reactions_rel_mu.push(e.reactions_rel_mu);
        self.reactions_cv += e.reactions_cv;
        self.reactions_rel_cv += e.reactions_rel_cv;
    }
}

/// Fractional year of the middle of `date`'s ISO week.
pub fn iso_week_time(date: NaiveDate) -> f64 {
    let iso = date.iso_week();
    iso.year() as f64 + iso.week() as f64 / 52.0 + 0.5 / 52.0
}

/// Average weekly rows per group and week.
///
/// Rows are grouped by the values of `groups` and by `week_t`. Each group-week
/// gets the mean post count, the means of the log engagement levels and of the
/// engagement variation. The first and last week of the input are dropped as
/// possibly incomplete. Output is ordered by group values, then week.
///
/// # Errors
/// `InvalidParameter` if a grouping column is listed twice.
pub fn weekly_signal(
    weekly: &[WeeklyRow],
    groups: &[GroupKey],
) -> Result<Vec<WeeklySignalRow>> {
    let mut unique = BTreeSet::new();
    for key in groups {
        if !unique.insert(*key) {
            return Err(EpochError::InvalidParameter(format!(
                "signal group {key:?} is listed twice"
            )));
        }
    }

    let (Some(first), Some(last)) = (
        weekly.iter().map(|r| r.week_t).min(),
        weekly.iter().map(|r| r.week_t).max(),
    ) else {
        return Ok(Vec::new());
    };

    let mut cells: BTreeMap<(Vec<&str>, usize), GroupWeek> = BTreeMap::new();
    for row in weekly.iter().filter(|r| r.week_t != first && r.week_t != last) {
        let values: Vec<&str> = groups.iter().map(|g| g.value(row)).collect();
        cells
            .entry((values, row.week_t))
            .or_insert_with(|| GroupWeek::new(row.timestamp.date()))
            .push(row);
    }

    let mut skipped = 0usize;
    let signal: Vec<WeeklySignalRow> = cells
        .into_iter()
        .map(|((values, week_t), cell)| {
            skipped += cell.reactions_mu.skipped + cell.reactions_rel_mu.skipped;
            let n = cell.n as f64;
            WeeklySignalRow {
                group: groups
                    .iter()
                    .copied()
                    .zip(values.into_iter().map(str::to_string))
                    .collect(),
                week_t,
                timestamp: cell.timestamp,
                time: iso_week_time(cell.timestamp),
                n_posts: cell.n_posts / n,
                reactions_mu: cell.reactions_mu.value(),
                reactions_rel_mu: cell.reactions_rel_mu.value(),
                reactions_cv: cell.reactions_cv / n,
                reactions_rel_cv: cell.reactions_rel_cv / n,
            }
        })
        .collect();

    if skipped > 0 {
        warn!("{skipped} non-positive engagement levels left out of log means");
    }
    info!(
        "built {} weekly signal rows from {} weekly rows",
        signal.len(),
        weekly.len()
    );
    Ok(signal)
}
