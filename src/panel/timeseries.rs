//! Alignment of weekly rows into a gap-free panel.

use super::weekly::{Sector, WeeklyRow};
use crate::error::{EpochError, Result};
use chrono::NaiveDateTime;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One account-week of the aligned panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelRow {
    pub country: String,
    pub name: String,
    pub sector: Sector,
    pub quality: String,
    pub week_t: usize,
    pub timestamp: NaiveDateTime,
    pub n_posts: usize,
    pub reactions: f64,
}

/// Build the aligned panel from weekly rows.
///
/// The first and last observed weeks are discarded as possibly incomplete.
/// Each account then covers every remaining week between its own first and
/// last active week, with zero posts and reactions in inactive weeks. Rows
/// are ordered by country, name, sector, quality and week.
///
/// # Errors
/// `InvariantViolation` if an account's weeks are not contiguous, which
/// happens when no account at all was active in some interior week.
pub fn build_panel(weekly: &[WeeklyRow]) -> Result<Vec<PanelRow>> {
    let weeks: BTreeSet<(usize, NaiveDateTime)> =
        weekly.iter().map(|r| (r.week_t, r.timestamp)).collect();
    let n_weeks = weeks.len();
    let interior: Vec<(usize, NaiveDateTime)> = weeks
        .into_iter()
        .skip(1)
        .take(n_weeks.saturating_sub(2))
        .collect();

    type Account = (String, String, Sector, String);
    let mut accounts: BTreeMap<Account, BTreeMap<usize, &WeeklyRow>> = BTreeMap::new();
    for row in weekly {
        accounts
            .entry((
                row.country.clone(),
                row.name.clone(),
                row.sector,
                row.quality.clone(),
            ))
            .or_default()
            .insert(row.week_t, row);
    }

    let mut panel = Vec::new();
    for ((country, name, sector, quality), observed) in &accounts {
        let active: Vec<usize> = interior
            .iter()
            .map(|&(w, _)| w)
            .filter(|w| observed.contains_key(w))
            .collect();
        let (Some(&first), Some(&last)) = (active.first(), active.last()) else {
            continue;
        };

        let mut previous: Option<usize> = None;
        for &(week_t, timestamp) in interior.iter().filter(|(w, _)| (first..=last).contains(w)) {
            if let Some(prev) = previous {
                if week_t != prev + 1 {
                    return Err(EpochError::InvariantViolation(format!(
                        "{country}/{name} jumps from week {prev} to week {week_t}"
                    )));
                }
            }
            previous = Some(week_t);

            let (n_posts, reactions) = observed
                .get(&week_t)
                .map_or((0, 0.0), |r| (r.n_posts, r.engagement.reactions));
            panel.push(PanelRow {
                country: country.clone(),
                name: name.clone(),
                sector: *sector,
                quality: quality.clone(),
                week_t,
                timestamp,
                n_posts,
                reactions,
            });
        }
    }

    info!(
        "built panel of {} rows for {} accounts over {} weeks",
        panel.len(),
        accounts.len(),
        interior.len()
    );
    Ok(panel)
}
