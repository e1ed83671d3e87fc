//! Input records consumed by the pipeline.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One candidate detection's estimated probability in one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    /// Subset (method/metric combination) that produced the detection.
    pub subset: String,
    /// 1-based run index.
    pub run: u32,
    /// Fractional-year date, e.g. `2021.37`.
    pub date: f64,
    /// Posterior probability of a change at `date`.
    pub prob: f64,
}

impl DetectionRecord {
    pub fn new(subset: impl Into<String>, run: u32, date: f64, prob: f64) -> Self {
        Self {
            subset: subset.into(),
            run,
            date,
            prob,
        }
    }
}

/// A canonical post record: a unique key, the account it belongs to and when it was published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub key: String,
    pub country: String,
    pub name: String,
    pub timestamp: NaiveDateTime,
}

impl PostRecord {
    pub fn new(
        key: impl Into<String>,
        country: impl Into<String>,
        name: impl Into<String>,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            key: key.into(),
            country: country.into(),
            name: name.into(),
            timestamp,
        }
    }

    /// Identity of the account, i.e. the key columns excluding time.
    pub fn account(&self) -> (&str, &str) {
        (&self.country, &self.name)
    }
}
