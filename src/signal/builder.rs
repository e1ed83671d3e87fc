//! Per-subset signal construction.

use crate::core::{fractional_year_to_date, DetectionRecord, TimeGrid};
use crate::error::{EpochError, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Expected number of detections per time bucket for one subset.
///
/// `values[i]` belongs to bucket `i` of the grid the signal was built on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsetSignal {
    pub subset: String,
    pub values: Vec<f64>,
}

impl SubsetSignal {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn check_probability(prob: f64) -> Result<f64> {
    if prob.is_finite() && (0.0..=1.0).contains(&prob) {
        Ok(prob)
    } else {
        Err(EpochError::InvalidProbability { value: prob })
    }
}

/// Build the signal of one subset.
///
/// Records of the same run landing in the same bucket are combined with the
/// probabilistic OR `1 - Π(1 - p)`. Per-run values are then summed over runs
/// and divided by `n_runs`. Buckets without detections are zero.
///
/// # Arguments
/// * `subset` - Subset name attached to the result
/// * `records` - Detection records of this subset only
/// * `grid` - Canonical bucket universe
/// * `n_runs` - Number of runs used for normalization
///
/// # Errors
/// * `InvalidParameter` if `n_runs` is zero or a record's run index is not
///   in `1..=n_runs`. Runs are numbered from 1, so 0-based run indices must
///   be shifted before building signals.
/// * `InvalidProbability` if a probability is not in `[0, 1]`
pub fn build_signal(
    subset: &str,
    records: &[DetectionRecord],
    grid: &TimeGrid,
    n_runs: u32,
) -> Result<SubsetSignal> {
    if n_runs == 0 {
        return Err(EpochError::InvalidParameter(
            "number of runs must be positive".to_string(),
        ));
    }

    // survival[(run, bucket)] = Π(1 - p) over the run's records in the bucket
    let mut survival: BTreeMap<(u32, usize), f64> = BTreeMap::new();
    let mut skipped = 0usize;

    for record in records {
        let prob = check_probability(record.prob)?;
        if record.run == 0 || record.run > n_runs {
            return Err(EpochError::InvalidParameter(format!(
                "run index {} of subset '{subset}' is outside 1..={n_runs} (runs are numbered from 1)",
                record.run
            )));
        }
        let date = fractional_year_to_date(record.date)?;
        let Some(bucket) = grid.bucket_of(date) else {
            skipped += 1;
            debug!("subset '{subset}': detection on {date} falls outside the time grid");
            continue;
        };
        *survival.entry((record.run, bucket)).or_insert(1.0) *= 1.0 - prob;
    }

    let mut values = vec![0.0; grid.len()];
    for ((_, bucket), surv) in survival {
        values[bucket] += 1.0 - surv;
    }
    let norm = n_runs as f64;
    for v in values.iter_mut() {
        *v /= norm;
    }

    info!(
        "subset '{subset}': built signal over {} buckets from {} records ({} outside window)",
        values.len(),
        records.len(),
        skipped
    );

    Ok(SubsetSignal {
        subset: subset.to_string(),
        values,
    })
}

/// Build signals for every subset present in `records`.
///
/// Signals are normalized by the largest run index found across all subsets,
/// which equals the number of runs when runs are numbered from 1.
pub fn build_signals(
    records: &[DetectionRecord],
    grid: &TimeGrid,
) -> Result<BTreeMap<String, SubsetSignal>> {
    let mut by_subset: BTreeMap<&str, Vec<DetectionRecord>> = BTreeMap::new();
    for record in records {
        by_subset
            .entry(record.subset.as_str())
            .or_default()
            .push(record.clone());
    }

    let n_runs = records.iter().map(|r| r.run).max().unwrap_or(0);

    by_subset
        .into_iter()
        .map(|(subset, recs)| {
            build_signal(subset, &recs, grid, n_runs).map(|s| (subset.to_string(), s))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn grid_2021() -> TimeGrid {
        TimeGrid::span(
            NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2021, 12, 31).unwrap(),
        )
        .unwrap()
    }

    fn bucket_for(grid: &TimeGrid, date: f64) -> usize {
        grid.bucket_of(fractional_year_to_date(date).unwrap()).unwrap()
    }

    #[test]
    fn same_run_same_bucket_combines_with_probabilistic_or() {
        let grid = grid_2021();
        let records = vec![
            DetectionRecord::new("a", 1, 2021.3, 0.5),
            DetectionRecord::new("a", 1, 2021.3, 0.5),
        ];
        let signal = build_signal("a", &records, &grid, 1).unwrap();

        assert_relative_eq!(signal.values[bucket_for(&grid, 2021.3)], 0.75, epsilon = 1e-12);
    }

    #[test]
    fn runs_are_averaged() {
        let grid = grid_2021();
        let records = vec![
            DetectionRecord::new("a", 1, 2021.3, 0.5),
            DetectionRecord::new("a", 1, 2021.3, 0.5),
            DetectionRecord::new("a", 2, 2021.3, 0.25),
        ];
        let signal = build_signal("a", &records, &grid, 4).unwrap();

        // (0.75 + 0.25) / 4
        assert_relative_eq!(signal.values[bucket_for(&grid, 2021.3)], 0.25, epsilon = 1e-12);
    }

    #[test]
    fn empty_buckets_are_zero() {
        let grid = grid_2021();
        let records = vec![DetectionRecord::new("a", 1, 2021.3, 0.9)];
        let signal = build_signal("a", &records, &grid, 1).unwrap();

        let hit = bucket_for(&grid, 2021.3);
        assert_eq!(signal.len(), grid.len());
        for (i, &v) in signal.values.iter().enumerate() {
            if i != hit {
                assert_eq!(v, 0.0);
            }
        }
    }

    #[test]
    fn no_detections_gives_all_zero_signal() {
        let grid = grid_2021();
        let signal = build_signal("a", &[], &grid, 3).unwrap();
        assert!(signal.values.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn records_outside_window_are_skipped() {
        let grid = grid_2021();
        let records = vec![DetectionRecord::new("a", 1, 2022.5, 1.0)];
        let signal = build_signal("a", &records, &grid, 1).unwrap();
        assert!(signal.values.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn invalid_probability_is_rejected() {
        let grid = grid_2021();
        let records = vec![DetectionRecord::new("a", 1, 2021.3, 1.2)];
        let err = build_signal("a", &records, &grid, 1).unwrap_err();
        assert_eq!(err, EpochError::InvalidProbability { value: 1.2 });
    }

    #[test]
    fn run_zero_is_rejected() {
        let grid = grid_2021();
        let records = vec![DetectionRecord::new("a", 0, 2021.3, 0.2)];
        let err = build_signal("a", &records, &grid, 1).unwrap_err();
        assert!(matches!(err, EpochError::InvalidParameter(ref msg) if msg.contains("numbered from 1")));
    }

    #[test]
    fn signals_share_global_run_count() {
        let grid = grid_2021();
        let records = vec![
            DetectionRecord::new("a", 1, 2021.3, 1.0),
            DetectionRecord::new("b", 1, 2021.3, 1.0),
            DetectionRecord::new("b", 2, 2021.3, 1.0),
        ];
        let signals = build_signals(&records, &grid).unwrap();
        let bucket = bucket_for(&grid, 2021.3);

        assert_eq!(signals.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_relative_eq!(signals["a"].values[bucket], 0.5, epsilon = 1e-12);
        assert_relative_eq!(signals["b"].values[bucket], 1.0, epsilon = 1e-12);
    }
}
