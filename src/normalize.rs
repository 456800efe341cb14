//! Entry normalization and the trailing time window.
//!
//! The window is anchored to the newest entry actually retrieved rather than
//! to the wall clock, so a run where every feed is stale still produces
//! output. The wall clock is only used when nothing survives.

use chrono::{DateTime, Duration, FixedOffset, Utc};
use tracing::{debug, info, instrument};

use crate::models::{NormalizedItem, RawEntry};

/// Width of the trailing window, in days.
pub const DAYS_BACK: i64 = 7;

/// Drop incomplete entries, apply the window and sort newest first.
///
/// # Steps
///
/// 1. Entries with an empty link or no parsed date are dropped
/// 2. Floating dates get UTC attached
/// 3. Anchor = newest remaining date, or `now` when none remain
/// 4. Entries older than `anchor - DAYS_BACK` are dropped (the boundary is kept)
/// 5. Stable sort by date, descending
#[instrument(level = "info", skip_all, fields(input = entries.len()))]
pub fn normalize(entries: Vec<RawEntry>, now: DateTime<Utc>) -> Vec<NormalizedItem> {
    let input = entries.len();
    let complete: Vec<NormalizedItem> = entries
        .into_iter()
        .filter_map(|entry| {
            if entry.link.is_empty() {
                debug!(title = %entry.title, source = %entry.source, "Dropping entry without link");
                return None;
            }
            let Some(published_at) = entry.published_at else {
                debug!(link = %entry.link, source = %entry.source, "Dropping entry without date");
                return None;
            };
            Some(NormalizedItem {
                title: entry.title,
                link: entry.link,
                source: entry.source,
                date: published_at.assume_utc(),
                summary: entry.summary,
            })
        })
        .collect();

    let anchor = anchor_time(&complete, now);
    // None when the anchor is too close to the earliest representable date
    let cutoff = anchor.checked_sub_signed(Duration::days(DAYS_BACK));

    let mut items: Vec<NormalizedItem> = complete
        .into_iter()
        .filter(|item| cutoff.is_none_or(|cutoff| item.date >= cutoff))
        .collect();
    items.sort_by(|a, b| b.date.cmp(&a.date));

    info!(
        input,
        kept = items.len(),
        %anchor,
        ?cutoff,
        "Normalized entries"
    );
    items
}

/// Newest date among `items`, falling back to `now`.
pub fn anchor_time(items: &[NormalizedItem], now: DateTime<Utc>) -> DateTime<FixedOffset> {
    items
        .iter()
        .map(|item| item.date)
        .max()
        .unwrap_or_else(|| now.fixed_offset())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FeedDate;
    use chrono::{NaiveDate, TimeZone};

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<FixedOffset> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap().fixed_offset()
    }

    fn entry(link: &str, date: Option<FeedDate>) -> RawEntry {
        RawEntry {
            title: format!("title {link}"),
            link: link.to_string(),
            source: "Test".to_string(),
            published_at: date,
            summary: "summary".to_string(),
        }
    }

    fn zoned(dt: DateTime<FixedOffset>) -> Option<FeedDate> {
        Some(FeedDate::Zoned(dt))
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_entries_without_link_are_dropped() {
        let entries = vec![
            entry("", zoned(utc(2024, 1, 15, 10, 0, 0))),
            entry("", zoned(utc(2024, 1, 14, 10, 0, 0))),
        ];
        assert!(normalize(entries, now()).is_empty());
    }

    #[test]
    fn test_entries_without_date_are_dropped() {
        let entries = vec![
            entry("https://example.com/a", None),
            entry("https://example.com/b", zoned(utc(2024, 1, 15, 10, 0, 0))),
        ];
        let items = normalize(entries, now());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].link, "https://example.com/b");
    }

    #[test]
    fn test_floating_dates_become_utc() {
        let naive = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        let items = normalize(
            vec![entry("https://example.com/a", Some(FeedDate::Floating(naive)))],
            now(),
        );
        assert_eq!(items[0].date, utc(2024, 1, 15, 10, 30, 0));
        assert_eq!(items[0].date.offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_window_boundary_is_inclusive() {
        let anchor = utc(2024, 1, 15, 12, 0, 0);
        let boundary = anchor - Duration::days(7);
        let just_outside = boundary - Duration::seconds(1);
        let entries = vec![
            entry("https://example.com/anchor", zoned(anchor)),
            entry("https://example.com/boundary", zoned(boundary)),
            entry("https://example.com/outside", zoned(just_outside)),
        ];

        let links: Vec<_> = normalize(entries, now())
            .into_iter()
            .map(|item| item.link)
            .collect();
        assert_eq!(
            links,
            ["https://example.com/anchor", "https://example.com/boundary"]
        );
    }

    #[test]
    fn test_anchor_ignores_wall_clock_when_entries_exist() {
        // all entries are years older than `now`, none are dropped
        let entries = vec![
            entry("https://example.com/a", zoned(utc(2020, 5, 1, 0, 0, 0))),
            entry("https://example.com/b", zoned(utc(2020, 4, 28, 0, 0, 0))),
        ];
        assert_eq!(normalize(entries, now()).len(), 2);
    }

    #[test]
    fn test_window_near_earliest_date_keeps_everything() {
        let earliest = DateTime::<Utc>::MIN_UTC.fixed_offset();
        let entries = vec![
            entry("https://example.com/min", zoned(earliest)),
            entry("https://example.com/next", zoned(earliest + Duration::hours(1))),
        ];
        let links: Vec<_> = normalize(entries, now())
            .into_iter()
            .map(|item| item.link)
            .collect();
        assert_eq!(links, ["https://example.com/next", "https://example.com/min"]);
    }

    #[test]
    fn test_anchor_falls_back_to_now() {
        assert_eq!(anchor_time(&[], now()), now().fixed_offset());
    }

    #[test]
    fn test_sorted_descending_across_offsets() {
        let plus8 = FixedOffset::east_opt(8 * 3600).unwrap();
        let entries = vec![
            entry("https://example.com/old", zoned(utc(2024, 1, 13, 0, 0, 0))),
            // 2024-01-15 02:00 UTC
            entry(
                "https://example.com/tz",
                zoned(plus8.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap()),
            ),
            entry("https://example.com/mid", zoned(utc(2024, 1, 14, 0, 0, 0))),
            entry("https://example.com/new", zoned(utc(2024, 1, 15, 3, 0, 0))),
        ];

        let items = normalize(entries, now());
        let links: Vec<_> = items.iter().map(|item| item.link.as_str()).collect();
        assert_eq!(
            links,
            [
                "https://example.com/new",
                "https://example.com/tz",
                "https://example.com/mid",
                "https://example.com/old"
            ]
        );
        assert!(items.windows(2).all(|pair| pair[0].date >= pair[1].date));
    }

    #[test]
    fn test_ties_keep_input_order() {
        let same = utc(2024, 1, 15, 10, 0, 0);
        let entries = vec![
            entry("https://example.com/first", zoned(same)),
            entry("https://example.com/second", zoned(same)),
            entry("https://example.com/third", zoned(same)),
        ];
        let links: Vec<_> = normalize(entries, now())
            .into_iter()
            .map(|item| item.link)
            .collect();
        assert_eq!(
            links,
            [
                "https://example.com/first",
                "https://example.com/second",
                "https://example.com/third"
            ]
        );
    }
}
