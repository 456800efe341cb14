//! # AI News Digest
//!
//! Collects recent entries from a fixed list of AI news feeds (RSS and Atom),
//! normalizes their metadata, keeps the trailing week, and writes a JSON
//! snapshot for the front end.
//!
//! ## Usage
//!
//! ```sh
//! ai_news_digest            # writes data/news.json
//! ai_news_digest -o out.json
//! ```
//!
//! ## Architecture
//!
//! The run is a single linear pass:
//! 1. **Fetching**: Download each feed through the proxy, one at a time
//! 2. **Parsing**: Turn RSS `item` / Atom `entry` elements into raw entries
//! 3. **Normalizing**: Drop incomplete entries, window to 7 days, sort
//! 4. **Output**: Build the flat list and per-day snapshots, write JSON
//!
//! A failing feed is skipped. Only a failed write ends the process with an
//! error.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod dates;
mod fetcher;
mod models;
mod normalize;
mod outputs;
mod parser;
mod pipeline;
mod sources;
mod utils;

use cli::Cli;
use fetcher::{PACING_DELAY, ProxyFetcher};
use outputs::json;
use sources::FEED_SOURCES;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("ai_news_digest starting up");

    let args = Cli::parse();
    debug!(output = %args.output.display(), "Parsed CLI arguments");

    let document = pipeline::run_or_empty(ProxyFetcher::new(), FEED_SOURCES, PACING_DELAY).await;

    if let Err(e) = json::write_document(&document, &args.output).await {
        error!(path = %args.output.display(), error = %e, "Failed to write news snapshot");
        return Err(e);
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        items = document.items.len(),
        days = document.snapshots.len(),
        path = %args.output.display(),
        "Execution complete"
    );

    Ok(())
}
