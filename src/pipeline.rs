//! End-to-end changepoint and epoch pipeline.
//!
//! Stages run in sequence, each one consuming the full output of the previous
//! one: signals, smoothing, peaks, epoch assignment and epoch metadata. Any
//! failure aborts the run.

use crate::config::PipelineConfig;
use crate::core::{DetectionRecord, PostRecord, TimeGrid};
use crate::detection::{changepoints_for, detect_all_peaks, Peak};
use crate::epochs::{assign_epochs, epoch_metadata, EpochAssignment, EpochMeta};
use crate::error::{EpochError, Result};
use crate::panel::{
    build_panel, weekly_activity, weekly_signal, PanelRow, SocialPost, WeeklyRow, WeeklySignalRow,
};
use crate::signal::build_signals;
use crate::storage::DatasetStore;
use crate::transform::{smooth, SmoothedSignal};
use chrono::NaiveDateTime;
use log::{info, warn};
use std::collections::BTreeMap;

/// Everything produced by one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// Smoothed signal per subset.
    pub signals: BTreeMap<String, SmoothedSignal>,
    /// Peaks of every subset.
    pub peaks: Vec<Peak>,
    /// Changepoints of the selected subset.
    pub changepoints: Vec<NaiveDateTime>,
    pub assignment: EpochAssignment,
    pub meta: Vec<EpochMeta>,
}

/// Run all stages on in-memory inputs.
pub fn run(
    config: &PipelineConfig,
    detections: &[DetectionRecord],
    records: &[PostRecord],
) -> Result<PipelineOutput> {
    config.validate()?;
    let window = config.window()?;

    let first = records.iter().map(|r| r.timestamp).min();
    let last = records.iter().map(|r| r.timestamp).max();
    let (Some(first), Some(last)) = (first, last) else {
        return Err(EpochError::EmptyData);
    };
    let grid = TimeGrid::span(first.date(), last.date())?;
    info!(
        "observation window {} .. {} ({} weeks)",
        grid.first_day(),
        grid.last_day(),
        grid.len()
    );

    let signals = build_signals(detections, &grid)?
        .values()
        .map(|s| smooth(s, window).map(|sm| (s.subset.clone(), sm)))
        .collect::<Result<BTreeMap<_, _>>>()?;

    let peaks = detect_all_peaks(&signals, &grid, &config.changepoints.peaks)?;

    let subset = config.changepoints.use_subset.as_str();
    if !signals.contains_key(subset) {
        warn!("subset '{subset}' has no detections; using a single epoch");
    }
    let changepoints = changepoints_for(&peaks, subset);
    info!("subset '{subset}': {} changepoints", changepoints.len());

    let assignment = assign_epochs(records, &changepoints, config.epochs.min_posts)?;
    let meta = epoch_metadata(first, last, &changepoints)?;

    Ok(PipelineOutput {
        signals,
        peaks,
        changepoints,
        assignment,
        meta,
    })
}

/// Read inputs from `store`, run all stages and write the peaks, epoch
/// assignments and epoch metadata back.
pub fn run_with_store<S: DatasetStore>(
    config: &PipelineConfig,
    store: &mut S,
) -> Result<PipelineOutput> {
    let names = &config.datasets;
    let detections: Vec<DetectionRecord> = store.read(&names.detections)?;

    let mut records: Vec<PostRecord> = Vec::new();
    for name in &names.records {
        records.extend(store.read::<PostRecord>(name)?);
    }
    info!(
        "read {} detections and {} records",
        detections.len(),
        records.len()
    );

    let output = run(config, &detections, &records)?;

    store.write(&names.changepoints, &output.peaks)?;
    store.write(&names.epochs, &output.assignment.kept)?;
    store.write(&names.epoch_meta, &output.meta)?;
    Ok(output)
}

/// Weekly tables built from social posts.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelOutput {
    pub weekly: Vec<WeeklyRow>,
    /// Gap-free per-account series.
    pub panel: Vec<PanelRow>,
    /// Per-group engagement signal.
    pub signal: Vec<WeeklySignalRow>,
}

/// Build weekly activity, the aligned panel and the group signal from posts.
pub fn run_panel(config: &PipelineConfig, posts: &[SocialPost]) -> Result<PanelOutput> {
    let grid = TimeGrid::from_timestamps(posts.iter().map(|p| p.timestamp))?;
    let weekly = weekly_activity(posts, &grid)?;
    let panel = build_panel(&weekly)?;
    let signal = weekly_signal(&weekly, &config.signal.groups)?;
    Ok(PanelOutput {
        weekly,
        panel,
        signal,
    })
}

/// Read social posts from `store`, build the weekly tables and write them back.
pub fn run_panel_with_store<S: DatasetStore>(
    config: &PipelineConfig,
    store: &mut S,
) -> Result<PanelOutput> {
    let names = &config.datasets;
    let posts: Vec<SocialPost> = store.read(&names.social_posts)?;
    let output = run_panel(config, &posts)?;
    store.write(&names.weekly, &output.weekly)?;
    store.write(&names.timeseries, &output.panel)?;
    store.write(&names.signal, &output.signal)?;
    Ok(output)
}
