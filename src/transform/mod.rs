//! Signal transformations.
//!
//! Provides the rolling probabilistic OR used to denoise change-probability
//! signals before peak detection.
//!
//! # Example
//!
//! ```
//! use changepoint_epochs::transform::{prob_or, rolling_prob_or};
//!
//! assert!((prob_or(&[0.5, 0.5]) - 0.75).abs() < 1e-12);
//!
//! let rolled = rolling_prob_or(&[0.0, 0.0, 0.0, 1.0], 3);
//! assert!(rolled[0].is_nan());
//! assert_eq!(rolled[3], 1.0);
//! ```

pub mod smooth;
pub mod window;

pub use smooth::{smooth, SmoothedSignal};
pub use window::{backfill, prob_or, rolling_prob_or};
