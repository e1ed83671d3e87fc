//! Smoothing of subset signals.

use super::window::{backfill, rolling_prob_or};
use crate::error::{EpochError, Result};
use crate::signal::SubsetSignal;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// A subset signal after the rolling probabilistic OR and back-fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmoothedSignal {
    pub subset: String,
    /// Window width in buckets.
    pub window: usize,
    pub values: Vec<f64>,
}

impl SmoothedSignal {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Smooth a signal with a trailing probabilistic OR of width `window`.
///
/// Positions before the first full window take the value at `window - 1`.
/// A signal shorter than the window has no defined value and smooths to zeros.
pub fn smooth(signal: &SubsetSignal, window: usize) -> Result<SmoothedSignal> {
    if window == 0 {
        return Err(EpochError::InvalidParameter(
            "smoothing window must be positive".to_string(),
        ));
    }

    let mut values = rolling_prob_or(&signal.values, window);
    backfill(&mut values);

    if values.iter().any(|v| v.is_nan()) {
        warn!(
            "subset '{}': signal of {} buckets is shorter than window {}; using zeros",
            signal.subset,
            signal.len(),
            window
        );
        values.iter_mut().for_each(|v| *v = 0.0);
    }

    debug!("subset '{}': smoothed with window {}", signal.subset, window);

    Ok(SmoothedSignal {
        subset: signal.subset.clone(),
        window,
        values,
    })
}
