//! Epoch segmentation.
//!
//! Changepoints split the observation window into consecutive half-open
//! epochs `[start, end)`. Epochs are numbered from 1; epoch `k` starts at the
//! `(k - 1)`-th changepoint, or at the earliest record for `k = 1`.
//!
//! # Example
//!
//! ```
//! use changepoint_epochs::core::PostRecord;
//! use changepoint_epochs::epochs::assign_epochs;
//! use chrono::NaiveDate;
//!
//! let day = |d: u32| NaiveDate::from_ymd_opt(2021, 3, d).unwrap().and_hms_opt(12, 0, 0).unwrap();
//! let records: Vec<PostRecord> = (1..=6)
//!     .map(|d| PostRecord::new(format!("p{d}"), "pl", "outlet", day(d)))
//!     .collect();
//!
//! let result = assign_epochs(&records, &[day(4)], 0).unwrap();
//! assert_eq!(result.kept.len(), 6);
//! assert_eq!(result.kept[0].epoch, 1);
//! assert_eq!(result.kept[5].epoch, 2);
//! ```

mod meta;
mod segment;

pub use meta::{epoch_metadata, EpochMeta};
pub use segment::{assign_epochs, EpochAssignment, EpochRow};

use crate::error::{EpochError, Result};
use chrono::NaiveDateTime;

fn check_sorted(changepoints: &[NaiveDateTime]) -> Result<()> {
    match changepoints.windows(2).find(|w| w[1] < w[0]) {
        Some(w) => Err(EpochError::InvalidParameter(format!(
            "changepoints must be in chronological order ({} comes after {})",
            w[1], w[0]
        ))),
        None => Ok(()),
    }
}
