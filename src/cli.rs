//! Command-line interface definitions for AI News Digest.
//!
//! The feed list, proxy and time window are fixed at build time. The only
//! option is where the snapshot is written; with no arguments the binary
//! writes to [`DEFAULT_OUTPUT_PATH`].

use clap::Parser;
use std::path::PathBuf;

/// Where the snapshot goes when `--output` is not given.
pub const DEFAULT_OUTPUT_PATH: &str = "data/news.json";

/// Command-line arguments for the AI News Digest application.
///
/// # Examples
///
/// ```sh
/// # Write to the default location
/// ai_news_digest
///
/// # Write somewhere else
/// ai_news_digest -o /srv/site/data/news.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path of the JSON snapshot to write (replaced on every run)
    #[arg(short, long, default_value = DEFAULT_OUTPUT_PATH)]
    pub output: PathBuf,
}
