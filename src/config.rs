//! Pipeline configuration.
//!
//! Configuration is plain data: it deserializes from JSON with every field
//! optional, and can be built in code with chained setters.
//!
//! ```
//! use changepoint_epochs::config::PipelineConfig;
//!
//! let config = PipelineConfig::from_json_str(r#"{
//!     "changepoints": {
//!         "timescale": 4,
//!         "peaks": { "height": 0.5, "distance": 8 },
//!         "use": "bocpd-reactions"
//!     },
//!     "epochs": { "min_posts": 10 }
//! }"#).unwrap();
//!
//! assert_eq!(config.window().unwrap(), 4);
//! assert_eq!(config.epochs.min_posts, 10);
//! ```

use crate::detection::PeakPolicy;
use crate::panel::GroupKey;
use crate::error::{EpochError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings of the signal, smoothing and peak stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangepointsConfig {
    /// Smoothing window in weeks; rounded to whole buckets.
    pub timescale: f64,
    /// Peak selection policy.
    pub peaks: PeakPolicy,
    /// Subset whose peaks define the changepoints.
    #[serde(rename = "use")]
    pub use_subset: String,
}

impl Default for ChangepointsConfig {
    fn default() -> Self {
        Self {
            timescale: 4.0,
            peaks: PeakPolicy::default().min_height(0.5),
            use_subset: String::new(),
        }
    }
}

/// Settings of the epoch stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EpochsConfig {
    /// Accounts need more than this many posts in an epoch to keep it.
    pub min_posts: usize,
}

/// Settings of the weekly engagement signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Columns the weekly rows are grouped by.
    pub groups: Vec<GroupKey>,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            groups: vec![GroupKey::Country, GroupKey::Sector],
        }
    }
}

/// Logical names of the datasets read and written by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetNames {
    pub detections: String,
    /// Post record datasets, concatenated in order.
    pub records: Vec<String>,
    pub changepoints: String,
    pub epochs: String,
    pub epoch_meta: String,
    pub social_posts: String,
    pub weekly: String,
    pub timeseries: String,
    pub signal: String,
}

impl Default for DatasetNames {
    fn default() -> Self {
        Self {
            detections: "beast".to_string(),
            records: vec!["dataset".to_string(), "nonnews".to_string()],
            changepoints: "changepoints".to_string(),
            epochs: "epochs".to_string(),
            epoch_meta: "epochmeta".to_string(),
            social_posts: "posts".to_string(),
            weekly: "weekly".to_string(),
            timeseries: "timeseries".to_string(),
            signal: "signal".to_string(),
        }
    }
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub changepoints: ChangepointsConfig,
    pub epochs: EpochsConfig,
    pub signal: SignalConfig,
    pub datasets: DatasetNames,
}

impl PipelineConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| EpochError::Storage(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }

    /// Set the smoothing timescale in weeks.
    pub fn timescale(mut self, timescale: f64) -> Self {
        self.changepoints.timescale = timescale;
        self
    }

    /// Set the peak selection policy.
    pub fn peaks(mut self, policy: PeakPolicy) -> Self {
        self.changepoints.peaks = policy;
        self
    }

    /// Set the subset whose peaks become changepoints.
    pub fn use_subset(mut self, subset: impl Into<String>) -> Self {
        self.changepoints.use_subset = subset.into();
        self
    }

    /// Set the per-epoch minimum post count.
    pub fn min_posts(mut self, min_posts: usize) -> Self {
        self.epochs.min_posts = min_posts;
        self
    }

    /// Set the columns weekly signals are grouped by.
    pub fn signal_groups(mut self, groups: Vec<GroupKey>) -> Self {
        self.signal.groups = groups;
        self
    }

    /// Set the dataset names.
    pub fn datasets(mut self, datasets: DatasetNames) -> Self {
        self.datasets = datasets;
        self
    }

    /// Smoothing window in buckets, with halves rounded to even.
    pub fn window(&self) -> Result<usize> {
        let window = self.changepoints.timescale.round_ties_even();
        if !window.is_finite() || window < 1.0 {
            return Err(EpochError::InvalidParameter(format!(
                "timescale {} rounds to fewer than one bucket",
                self.changepoints.timescale
            )));
        }
        Ok(window as usize)
    }

    /// Check that every setting is usable.
    pub fn validate(&self) -> Result<()> {
        self.window()?;
        self.changepoints.peaks.validate()?;
        if self.changepoints.use_subset.is_empty() {
            return Err(EpochError::InvalidParameter(
                "changepoints.use must name a subset".to_string(),
            ));
        }
        let mut groups = self.signal.groups.clone();
        groups.sort();
        groups.dedup();
        if groups.len() != self.signal.groups.len() {
            return Err(EpochError::InvalidParameter(
                "signal.groups must not repeat a column".to_string(),
            ));
        }
        Ok(())
    }
}
