//! Weekly account activity, aligned panel time series and group signals.
//!
//! Posts are aggregated per account and ISO week, then aligned on a common
//! weekly grid so that every account has a gap-free series between its first
//! and last active week. Weekly rows can also be averaged per group into
//! engagement signals.

mod signal;
mod timeseries;
mod weekly;

pub use signal::{iso_week_time, weekly_signal, GroupKey, WeeklySignalRow};
pub use timeseries::{build_panel, PanelRow};
pub use weekly::{weekly_activity, Engagement, Sector, SocialPost, WeeklyRow, NON_NEWS};
