//! # changepoint-epochs
//!
//! Changepoint detection and epoch segmentation for panels of social-media
//! posts.
//!
//! Per-run detection probabilities are turned into weekly change-probability
//! signals, smoothed with a rolling probabilistic OR and searched for peaks.
//! The peaks of one selected subset become changepoints that split the
//! observation window into epochs; every post is then assigned to its epoch
//! together with the time elapsed since the epoch started.
//!
//! ```
//! use changepoint_epochs::prelude::*;
//! use chrono::{Duration, NaiveDate};
//!
//! let origin = NaiveDate::from_ymd_opt(2021, 1, 4).unwrap().and_hms_opt(9, 0, 0).unwrap();
//! let records: Vec<PostRecord> = (0..70)
//!     .map(|d| PostRecord::new(format!("p{d}"), "pl", "outlet", origin + Duration::days(d)))
//!     .collect();
//! let detections = vec![DetectionRecord::new("bocpd", 1, 2021.1, 0.9)];
//!
//! let config = PipelineConfig::default().use_subset("bocpd").timescale(1.0);
//! let output = run(&config, &detections, &records).unwrap();
//!
//! assert_eq!(output.changepoints.len(), 1);
//! assert_eq!(output.meta.len(), 2);
//! ```

#![allow(clippy::needless_range_loop)]

pub mod config;
pub mod core;
pub mod detection;
pub mod epochs;
pub mod error;
pub mod panel;
pub mod pipeline;
pub mod report;
pub mod signal;
pub mod storage;
pub mod transform;

pub use error::{EpochError, Result};

pub mod prelude {
    pub use crate::config::PipelineConfig;
    pub use crate::core::{DetectionRecord, PostRecord, TimeGrid};
    pub use crate::detection::{detect_peaks, find_peaks, Peak, PeakPolicy};
    pub use crate::epochs::{assign_epochs, epoch_metadata, EpochAssignment, EpochMeta, EpochRow};
    pub use crate::error::{EpochError, Result};
    pub use crate::pipeline::{run, PipelineOutput};
    pub use crate::signal::{build_signals, SubsetSignal};
    pub use crate::storage::{DatasetStore, JsonDirStore, MemoryStore};
    pub use crate::transform::{smooth, SmoothedSignal};
}
