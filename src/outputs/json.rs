//! JSON snapshot generation.
//!
//! The document has two views of the same items:
//! - `items`: a flat list, newest first, with full ISO-8601 dates
//! - `snapshots`: the same items bucketed by UTC calendar day, with
//!   minute-precision display times
//!
//! The file at the destination is replaced on every run.

use chrono::{DateTime, SecondsFormat, Utc};
use itertools::Itertools;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

use crate::models::{DayBucket, ItemView, NormalizedItem, OutputDocument, SnapshotView};

/// Project sorted items into an [`OutputDocument`].
///
/// `items` must already be sorted by date, descending. Because of that
/// ordering every UTC day forms one contiguous run, so buckets are built by
/// chunking consecutive items rather than through a map.
pub fn build_document(items: &[NormalizedItem], generated_at: DateTime<Utc>) -> OutputDocument {
    let days = items.iter().chunk_by(|item| item.day_key());
    let snapshots = days
        .into_iter()
        .map(|(day, group)| DayBucket {
            day,
            items: group.map(SnapshotView::from).collect(),
        })
        .collect();

    OutputDocument {
        generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Micros, false),
        items: items.iter().map(ItemView::from).collect(),
        snapshots,
    }
}

/// Serialize `document` and write it to `path`, replacing any previous file.
///
/// Non-ASCII text is written as-is and the JSON is pretty-printed. Missing
/// parent directories are created.
///
/// # Errors
///
/// Returns an error if serialization, directory creation or the write fails.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_document(document: &OutputDocument, path: &Path) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(document)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    fs::write(path, json).await?;
    info!(
        items = document.items.len(),
        days = document.snapshots.len(),
        "Wrote news snapshot"
    );
    Ok(())
}
