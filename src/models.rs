//! Data models for feed entries and the emitted snapshot document.
//!
//! This module defines the core data structures used throughout the pipeline:
//! - [`FeedSource`]: A compile-time `(name, url)` pair
//! - [`FeedDate`]: A parsed publication date, with or without a zone
//! - [`RawEntry`]: One `item`/`entry` as read from a feed
//! - [`NormalizedItem`]: An entry that survived filtering, with a zoned date
//! - [`OutputDocument`]: The JSON document written once per run
//!
//! The output views use camelCase field names to match the JSON schema read
//! by the front end.

use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// A syndication source defined at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedSource {
    /// Human-readable label copied onto every entry from this feed.
    pub name: &'static str,
    /// The feed URL, before the proxy prefix is applied.
    pub url: &'static str,
}

/// A publication date as recovered from a feed.
///
/// Feeds mix strings that carry an offset (`+0000`, `GMT`) with strings that
/// carry none. The distinction is kept until normalization so that floating
/// values can be pinned to UTC in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedDate {
    /// The string carried an explicit offset or zone name.
    Zoned(DateTime<FixedOffset>),
    /// The string carried no zone information.
    Floating(NaiveDateTime),
}

impl FeedDate {
    /// Attach UTC to a floating value. Zoned values are returned unchanged.
    pub fn assume_utc(self) -> DateTime<FixedOffset> {
        match self {
            FeedDate::Zoned(dt) => dt,
            FeedDate::Floating(naive) => naive.and_utc().fixed_offset(),
        }
    }
}

/// A feed entry straight out of the parser.
///
/// `title` and `summary` already have placeholders applied and the summary
/// has been stripped of markup and truncated.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEntry {
    pub title: String,
    /// May be empty; such entries are dropped by the normalizer.
    pub link: String,
    pub source: String,
    /// `None` when the feed had no date or none of the formats matched.
    pub published_at: Option<FeedDate>,
    pub summary: String,
}

/// An entry that passed normalization.
///
/// Invariant: `link` is non-empty and `date` is timezone-aware.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedItem {
    pub title: String,
    pub link: String,
    pub source: String,
    pub date: DateTime<FixedOffset>,
    pub summary: String,
}

impl NormalizedItem {
    /// UTC calendar day of `date`, as `YYYY-MM-DD`.
    pub fn day_key(&self) -> String {
        self.date.with_timezone(&Utc).date_naive().to_string()
    }

    /// Full ISO-8601 rendering with offset, e.g. `2024-01-15T10:30:00+00:00`.
    pub fn iso_date(&self) -> String {
        self.date.to_rfc3339_opts(SecondsFormat::AutoSi, false)
    }

    /// Minute-precision rendering in the item's own offset.
    pub fn display_time(&self) -> String {
        self.date.format("%Y-%m-%d %H:%M").to_string()
    }
}

/// One element of the flat `items` list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemView {
    pub title: String,
    pub link: String,
    pub source: String,
    pub date: String,
    pub summary: String,
}

impl From<&NormalizedItem> for ItemView {
    fn from(item: &NormalizedItem) -> Self {
        Self {
            title: item.title.clone(),
            link: item.link.clone(),
            source: item.source.clone(),
            date: item.iso_date(),
            summary: item.summary.clone(),
        }
    }
}

/// One element of a per-day snapshot bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotView {
    pub title: String,
    pub link: String,
    pub source: String,
    pub time: String,
    pub summary: String,
}

impl From<&NormalizedItem> for SnapshotView {
    fn from(item: &NormalizedItem) -> Self {
        Self {
            title: item.title.clone(),
            link: item.link.clone(),
            source: item.source.clone(),
            time: item.display_time(),
            summary: item.summary.clone(),
        }
    }
}

/// All items that fall on one UTC calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayBucket {
    /// `YYYY-MM-DD`.
    pub day: String,
    pub items: Vec<SnapshotView>,
}

/// The document written at the end of every run.
///
/// `snapshots` is kept as an ordered list of buckets and serialized as a JSON
/// object, so key order in the file follows the descending date sort.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputDocument {
    pub generated_at: String,
    pub items: Vec<ItemView>,
    #[serde(serialize_with = "serialize_buckets")]
    pub snapshots: Vec<DayBucket>,
}

fn serialize_buckets<S>(buckets: &[DayBucket], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(buckets.len()))?;
    for bucket in buckets {
        map.serialize_entry(&bucket.day, &bucket.items)?;
    }
    map.end()
}
