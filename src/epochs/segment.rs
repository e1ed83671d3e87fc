//! Assignment of records to epochs.

use super::check_sorted;
use crate::core::{weeks_between, PostRecord};
use crate::error::{EpochError, Result};
use chrono::NaiveDateTime;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Epoch membership of one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochRow {
    pub key: String,
    /// 1-based epoch index.
    pub epoch: usize,
    /// Time elapsed since the start of the epoch, in weeks.
    pub epoch_t: f64,
}

/// Result of [`assign_epochs`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpochAssignment {
    /// Surviving records, in input order.
    pub kept: Vec<EpochRow>,
    /// Keys of records whose account had too few posts in their epoch.
    pub dropped: Vec<String>,
}

impl EpochAssignment {
    /// Number of distinct epochs among the surviving records.
    pub fn n_epochs(&self) -> usize {
        self.kept.iter().map(|r| r.epoch).collect::<BTreeSet<_>>().len()
    }
}

/// Assign every record to the epoch delimited by `changepoints`.
///
/// A record belongs to epoch `k + 1` where `k` is the number of changepoints
/// at or before its timestamp. Records of an account whose epoch holds
/// `min_posts` records or fewer are dropped; neighbouring epochs are not
/// merged and surviving epochs keep their index.
///
/// # Errors
/// * `InvalidParameter` if `changepoints` is not chronologically sorted
/// * `DuplicateKey` if two surviving records share a key
/// * `InvariantViolation` if a surviving account epoch has `min_posts`
///   distinct keys or fewer
pub fn assign_epochs(
    records: &[PostRecord],
    changepoints: &[NaiveDateTime],
    min_posts: usize,
) -> Result<EpochAssignment> {
    check_sorted(changepoints)?;

    let Some(origin) = records.iter().map(|r| r.timestamp).min() else {
        info!("no records to assign to epochs");
        return Ok(EpochAssignment::default());
    };

    let mut order: Vec<usize> = (0..records.len()).collect();
    order.sort_by_key(|&i| records[i].timestamp);

    // Single pass with a cursor into the changepoint list.
    let mut assigned: Vec<(usize, f64)> = vec![(0, 0.0); records.len()];
    let mut cursor = 0;
    for &i in &order {
        let ts = records[i].timestamp;
        while cursor < changepoints.len() && changepoints[cursor] <= ts {
            cursor += 1;
        }
        let start = if cursor == 0 {
            origin
        } else {
            changepoints[cursor - 1]
        };
        assigned[i] = (cursor + 1, weeks_between(start, ts));
    }

    let mut counts: BTreeMap<(&str, &str, usize), usize> = BTreeMap::new();
    for (record, &(epoch, _)) in records.iter().zip(&assigned) {
        *counts
            .entry((record.country.as_str(), record.name.as_str(), epoch))
            .or_insert(0) += 1;
    }

    let mut result = EpochAssignment::default();
    let mut survivors: Vec<usize> = Vec::with_capacity(records.len());
    for (i, (record, &(epoch, epoch_t))) in records.iter().zip(&assigned).enumerate() {
        let n = counts[&(record.country.as_str(), record.name.as_str(), epoch)];
        if n > min_posts {
            survivors.push(i);
            result.kept.push(EpochRow {
                key: record.key.clone(),
                epoch,
                epoch_t,
            });
        } else {
            debug!(
                "dropping '{}': {}/{} has {} posts in epoch {}",
                record.key, record.country, record.name, n, epoch
            );
            result.dropped.push(record.key.clone());
        }
    }

    check_survivors(records, &assigned, &survivors, &result, min_posts)?;

    info!(
        "assigned {} records to {} epochs ({} changepoints, {} records dropped)",
        result.kept.len(),
        result.n_epochs(),
        changepoints.len(),
        result.dropped.len()
    );

    Ok(result)
}

fn check_survivors(
    records: &[PostRecord],
    assigned: &[(usize, f64)],
    survivors: &[usize],
    result: &EpochAssignment,
    min_posts: usize,
) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(result.kept.len());
    for row in &result.kept {
        if !seen.insert(row.key.as_str()) {
            return Err(EpochError::DuplicateKey(row.key.clone()));
        }
    }

    let mut distinct: BTreeMap<(&str, &str, usize), HashSet<&str>> = BTreeMap::new();
    for &i in survivors {
        let record = &records[i];
        distinct
            .entry((record.country.as_str(), record.name.as_str(), assigned[i].0))
            .or_default()
            .insert(record.key.as_str());
    }

    for ((country, name, epoch), keys) in distinct {
        if keys.len() <= min_posts {
            return Err(EpochError::InvariantViolation(format!(
                "{country}/{name} has {} posts in epoch {epoch}, need more than {min_posts}",
                keys.len()
            )));
        }
    }

    Ok(())
}
