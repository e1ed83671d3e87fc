//! Core data structures: input records, calendar helpers and the weekly time grid.

mod dates;
mod records;
mod time_grid;

pub use dates::{fractional_year_to_date, midpoint, start_of_day, weeks_between, SECONDS_PER_WEEK};
pub use records::{DetectionRecord, PostRecord};
pub use time_grid::{TimeBucket, TimeGrid};
