//! Per-account weekly aggregation of posts.

use crate::core::{start_of_day, TimeGrid};
use crate::error::{EpochError, Result};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Quality label marking accounts outside the news sector.
pub const NON_NEWS: &str = "non-news";

/// Broad account category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Sector {
    News,
    NonNews,
}

impl Sector {
    pub fn from_quality(quality: &str) -> Self {
        if quality == NON_NEWS {
            Sector::NonNews
        } else {
            Sector::News
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Sector::News => "news",
            Sector::NonNews => NON_NEWS,
        }
    }
}

/// Engagement measures of a post, or of an account over a day or week.
///
/// `reactions_mu` and `reactions_cv` describe the account's reaction
/// distribution around the post; the `_rel_` variants are the same measures
/// relative to the account's baseline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Engagement {
    pub reactions: f64,
    pub reactions_mu: f64,
    pub reactions_cv: f64,
    pub reactions_rel_mu: f64,
    pub reactions_rel_cv: f64,
}

impl Engagement {
    fn values(&self) -> [f64; 5] {
        [
            self.reactions,
            self.reactions_mu,
            self.reactions_cv,
            self.reactions_rel_mu,
            self.reactions_rel_cv,
        ]
    }

    fn from_values(v: [f64; 5]) -> Self {
        Self {
            reactions: v[0],
            reactions_mu: v[1],
            reactions_cv: v[2],
            reactions_rel_mu: v[3],
            reactions_rel_cv: v[4],
        }
    }

    pub fn is_finite(&self) -> bool {
        self.values().iter().all(|v| v.is_finite())
    }

    /// Field-wise mean of `items`; zero when empty.
    pub fn mean<'a, I>(items: I) -> Self
    where
        I: IntoIterator<Item = &'a Engagement>,
    {
        let mut sum = [0.0; 5];
        let mut n = 0usize;
        for item in items {
            for (s, v) in sum.iter_mut().zip(item.values()) {
                *s += v;
            }
            n += 1;
        }
        if n == 0 {
            return Self::default();
        }
        Self::from_values(sum.map(|s| s / n as f64))
    }
}

/// A post with its engagement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialPost {
    pub key: String,
    pub country: String,
    pub name: String,
    pub quality: String,
    pub timestamp: NaiveDateTime,
    #[serde(flatten)]
    pub engagement: Engagement,
}

/// Activity of one account in one week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyRow {
    pub country: String,
    pub name: String,
    pub quality: String,
    pub sector: Sector,
    /// Bucket index of the week on the time grid.
    pub week_t: usize,
    /// Monday of the week.
    pub timestamp: NaiveDateTime,
    pub n_posts: usize,
    /// Mean over active days of the daily mean engagement.
    #[serde(flatten)]
    pub engagement: Engagement,
}

fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Aggregate posts into weekly rows ordered by account and week.
///
/// Engagement is first averaged per day and the daily means are then
/// averaged per week; `n_posts` counts all posts of the week.
pub fn weekly_activity(posts: &[SocialPost], grid: &TimeGrid) -> Result<Vec<WeeklyRow>> {
    type AccountWeek = (String, String, String, usize);
    // daily[(account, week)][day] = engagement of the day's posts
    let mut daily: BTreeMap<AccountWeek, BTreeMap<NaiveDate, Vec<Engagement>>> = BTreeMap::new();
    let mut skipped = 0usize;

    for post in posts {
        if !post.engagement.is_finite() {
            return Err(EpochError::InvalidParameter(format!(
                "post '{}' has non-finite engagement",
                post.key
            )));
        }
        let date = post.timestamp.date();
        let Some(week_t) = grid.bucket_of(date) else {
            skipped += 1;
            continue;
        };
        daily
            .entry((
                post.country.clone(),
                post.name.clone(),
                post.quality.clone(),
                week_t,
            ))
            .or_default()
            .entry(date)
            .or_default()
            .push(post.engagement);
    }

    if skipped > 0 {
        warn!("{skipped} posts fall outside the time grid and were ignored");
    }

    let rows: Vec<WeeklyRow> = daily
        .into_iter()
        .map(|((country, name, quality, week_t), days)| {
            let n_posts: usize = days.values().map(Vec::len).sum();
            let daily_means: Vec<Engagement> =
                days.values().map(|day| Engagement::mean(day)).collect();
            WeeklyRow {
                sector: Sector::from_quality(&quality),
                country,
                name,
                quality,
                week_t,
                timestamp: start_of_day(monday_of(grid.buckets()[week_t].start)),
                n_posts,
                engagement: Engagement::mean(&daily_means),
            }
        })
        .collect();

    info!("aggregated {} posts into {} weekly rows", posts.len(), rows.len());
    Ok(rows)
}
