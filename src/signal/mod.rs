//! Change-probability signals.
//!
//! Turns per-run detection probabilities into one weekly expected-detection
//! series per subset.
//!
//! # Example
//!
//! ```
//! use changepoint_epochs::core::{DetectionRecord, TimeGrid};
//! use changepoint_epochs::signal::build_signals;
//! use chrono::NaiveDate;
//!
//! let grid = TimeGrid::span(
//!     NaiveDate::from_ymd_opt(2021, 1, 4).unwrap(),
//!     NaiveDate::from_ymd_opt(2021, 3, 28).unwrap(),
//! )
//! .unwrap();
//! let records = vec![
//!     DetectionRecord::new("bocpd-reactions", 1, 2021.1, 0.5),
//!     DetectionRecord::new("bocpd-reactions", 1, 2021.1, 0.5),
//!     DetectionRecord::new("bocpd-reactions", 2, 2021.1, 0.0),
//! ];
//!
//! let signals = build_signals(&records, &grid).unwrap();
//! let signal = &signals["bocpd-reactions"];
//! assert_eq!(signal.len(), grid.len());
//! ```

mod builder;

pub use builder::{build_signal, build_signals, SubsetSignal};
