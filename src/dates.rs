//! Publication date parsing across RSS and Atom dialects.
//!
//! RSS uses RFC 822 dates (`Mon, 15 Jan 2024 10:30:00 +0000`, sometimes with
//! a zone name such as `GMT`), Atom uses ISO 8601 / RFC 3339. Real feeds
//! stray from both, so parsing is an ordered list of attempts where the first
//! success wins and every failure falls through to the next.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::models::FeedDate;

/// Attempts that expect an explicit offset or zone.
const ZONED_FORMATS: &[&str] = &["%a, %d %b %Y %H:%M:%S %z", "%Y-%m-%dT%H:%M:%S%z"];

/// RFC 822 once the weekday has been stripped.
const RFC822_NO_WEEKDAY: &str = "%d %b %Y %H:%M:%S %z";

/// Attempts where the trailing `Z` is matched literally.
const LITERAL_Z_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%SZ", "%Y-%m-%dT%H:%M:%S%.fZ"];

/// Naive ISO 8601 shapes accepted by the fallback.
const NAIVE_ISO_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a raw date string from a feed.
///
/// Returns `None` for empty input or when no attempt matches; never panics.
///
/// # Order of attempts
///
/// 1. RFC 822 with a numeric offset
/// 2. RFC 2822, which also covers named zones (`GMT`, `UT`, `EST`, ...)
/// 3. Both of the above again without the weekday, which chrono would
///    otherwise check against the calendar day
/// 4. ISO 8601 with a numeric offset
/// 5. ISO 8601 with a literal `Z`, with and without fractional seconds
/// 6. Generic ISO 8601 after rewriting `Z` to `+00:00`
pub fn parse_date(raw: &str) -> Option<FeedDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let parsed = parse_zoned(raw, ZONED_FORMATS[0])
        .or_else(|| parse_rfc2822(raw))
        .or_else(|| {
            let rest = strip_weekday(raw)?;
            parse_zoned(rest, RFC822_NO_WEEKDAY).or_else(|| parse_rfc2822(rest))
        })
        .or_else(|| parse_zoned(raw, ZONED_FORMATS[1]))
        .or_else(|| {
            LITERAL_Z_FORMATS
                .iter()
                .find_map(|fmt| parse_floating(raw, fmt))
        })
        .or_else(|| parse_iso_fallback(&raw.replace('Z', "+00:00")));

    if parsed.is_none() {
        debug!(raw, "Unrecognized date format");
    }
    parsed
}

/// Drop a leading `Www, ` so a wrong weekday does not reject the date.
fn strip_weekday(raw: &str) -> Option<&str> {
    let (day, rest) = raw.split_once(',')?;
    let day = day.trim();
    (day.len() == 3 && day.chars().all(|c| c.is_ascii_alphabetic())).then(|| rest.trim_start())
}

fn parse_rfc2822(raw: &str) -> Option<FeedDate> {
    DateTime::parse_from_rfc2822(raw).ok().map(FeedDate::Zoned)
}

fn parse_zoned(raw: &str, fmt: &str) -> Option<FeedDate> {
    DateTime::parse_from_str(raw, fmt).ok().map(FeedDate::Zoned)
}

fn parse_floating(raw: &str, fmt: &str) -> Option<FeedDate> {
    NaiveDateTime::parse_from_str(raw, fmt)
        .ok()
        .map(FeedDate::Floating)
}

/// Generic ISO 8601: full RFC 3339 first, then naive date-times, then a bare date.
fn parse_iso_fallback(raw: &str) -> Option<FeedDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(FeedDate::Zoned(dt));
    }
    if let Some(parsed) = NAIVE_ISO_FORMATS
        .iter()
        .find_map(|fmt| parse_floating(raw, fmt))
    {
        return Some(parsed);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(FeedDate::Floating)
}
