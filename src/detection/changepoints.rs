//! Peaks of smoothed change-probability signals, mapped to calendar time.

use super::peaks::{find_peaks, peak_prominences, peak_widths, PeakPolicy};
use crate::core::TimeGrid;
use crate::error::{EpochError, Result};
use crate::transform::SmoothedSignal;
use chrono::{Duration, NaiveDateTime};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Days added to a peak's right edge so that it covers the whole last week.
pub const RIGHT_EDGE_GRACE_DAYS: i64 = 6;

/// Relative height at which peak windows are measured.
pub const PEAK_WINDOW_REL_HEIGHT: f64 = 0.5;

/// A detected peak of one subset's smoothed signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    pub subset: String,
    /// Bucket index of the peak.
    pub index: usize,
    /// Start of the peak's bucket.
    pub timestamp: NaiveDateTime,
    pub height: f64,
    /// Width at half prominence, in buckets.
    pub width: f64,
    /// Start of the bucket at the left half-prominence crossing.
    pub left: NaiveDateTime,
    /// Start of the bucket at the right crossing plus the grace period.
    pub right: NaiveDateTime,
}

fn bucket_timestamp(grid: &TimeGrid, position: f64) -> Result<NaiveDateTime> {
    let index = position.round_ties_even().max(0.0) as usize;
    grid.timestamp(index).ok_or(EpochError::IndexOutOfBounds {
        index,
        size: grid.len(),
    })
}

/// Detect the peaks of one smoothed signal.
///
/// Candidates are selected under `policy`; each one's window is then measured
/// at half prominence and mapped to bucket start dates.
pub fn detect_peaks(
    signal: &SmoothedSignal,
    grid: &TimeGrid,
    policy: &PeakPolicy,
) -> Result<Vec<Peak>> {
    if signal.len() != grid.len() {
        return Err(EpochError::DimensionMismatch {
            expected: grid.len(),
            got: signal.len(),
        });
    }

    let x = &signal.values;
    let found = find_peaks(x, policy)?;
    let index: Vec<usize> = found.iter().map(|p| p.index).collect();
    let proms = peak_prominences(x, &index, None)?;
    let widths = peak_widths(x, &index, PEAK_WINDOW_REL_HEIGHT, &proms)?;

    let peaks = found
        .iter()
        .zip(widths)
        .map(|(p, w)| {
            let timestamp = grid.timestamp(p.index).ok_or(EpochError::IndexOutOfBounds {
                index: p.index,
                size: grid.len(),
            })?;
            Ok(Peak {
                subset: signal.subset.clone(),
                index: p.index,
                timestamp,
                height: p.height,
                width: w.width,
                left: bucket_timestamp(grid, w.left_ip)?,
                right: bucket_timestamp(grid, w.right_ip)? + Duration::days(RIGHT_EDGE_GRACE_DAYS),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    info!("subset '{}': {} peaks detected", signal.subset, peaks.len());
    Ok(peaks)
}

/// Detect peaks for every subset, concatenated in subset order.
pub fn detect_all_peaks(
    signals: &BTreeMap<String, SmoothedSignal>,
    grid: &TimeGrid,
    policy: &PeakPolicy,
) -> Result<Vec<Peak>> {
    let mut all = Vec::new();
    for signal in signals.values() {
        all.extend(detect_peaks(signal, grid, policy)?);
    }
    Ok(all)
}

/// Changepoint timestamps of `subset`, in chronological order.
pub fn changepoints_for(peaks: &[Peak], subset: &str) -> Vec<NaiveDateTime> {
    let mut changepoints: Vec<NaiveDateTime> = peaks
        .iter()
        .filter(|p| p.subset == subset)
        .map(|p| p.timestamp)
        .collect();
    changepoints.sort();
    changepoints
}
