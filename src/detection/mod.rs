//! Peak detection on smoothed change-probability signals.
//!
//! - [`find_peaks`]: local maxima under height, threshold, distance,
//!   prominence, width and plateau constraints
//! - [`detect_peaks`]: peaks mapped to calendar windows on a [`TimeGrid`](crate::core::TimeGrid)
//!
//! # Example
//!
//! ```
//! use changepoint_epochs::detection::{find_peaks, PeakPolicy};
//!
//! let x = vec![0.0, 0.1, 0.9, 0.1, 0.0, 0.3, 0.0];
//! let peaks = find_peaks(&x, &PeakPolicy::default().min_height(0.5)).unwrap();
//! assert_eq!(peaks.len(), 1);
//! assert_eq!(peaks[0].index, 2);
//! ```

mod changepoints;
mod peaks;

pub use changepoints::{
    changepoints_for, detect_all_peaks, detect_peaks, Peak, PEAK_WINDOW_REL_HEIGHT,
    RIGHT_EDGE_GRACE_DAYS,
};
pub use peaks::{
    find_peaks, local_maxima, peak_prominences, peak_widths, Bound, PeakInfo, PeakPolicy, Plateau,
    Prominence, Width,
};
