//! Output generation for the JSON snapshot.
//!
//! # Submodules
//!
//! - [`json`]: Builds the [`OutputDocument`](crate::models::OutputDocument) and writes it to disk
//!
//! # Output Structure
//!
//! ```text
//! data/
//! └── news.json   # replaced on every run
//! ```

pub mod json;
