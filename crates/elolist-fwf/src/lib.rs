//! Fixed-width codec for the monthly rating list.
//!
//! Decodes one monthly flat file into raw, untyped rows. Pure synchronous;
//! no database dependencies. Cleaning and typing the rows is the pipeline's
//! job.
//!
//! # Quick start
//!
//! ```no_run
//! use elolist_fwf::{RatingList, parse_path};
//!
//! let list: RatingList = parse_path("standard_sep24frl.txt").unwrap();
//! println!("{} rows for {}", list.rows.len(), list.period);
//! ```

pub mod error;
pub mod layout;
mod parse;

use std::path::Path;

use chrono::NaiveDate;
pub use error::{Error, Result};
pub use layout::{LAYOUT_V1, Layout};

// ─── Public types
// ─────────────────────────────────────────────────────────────

/// One data line of the list, restricted to the retained columns.
///
/// Every field is the trimmed cell text, or `None` if the cell was blank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
  /// 1-based line number in the source file.
  pub line:       usize,
  pub id:         Option<String>,
  pub name:       Option<String>,
  pub federation: Option<String>,
  pub sex:        Option<String>,
  pub title:      Option<String>,
  pub games:      Option<String>,
  pub birth_year: Option<String>,
  pub flag:       Option<String>,
  pub rating:     Option<String>,
}

/// A decoded rating list.
#[derive(Debug, Clone)]
pub struct RatingList {
  pub layout:        Layout,
  /// First day of the month named by the rating column.
  pub period:        NaiveDate,
  /// Header of the rating column, e.g. `SEP24`.
  pub rating_column: String,
  pub rows:          Vec<RawRow>,
}

// ─── Public API
// ───────────────────────────────────────────────────────────────

/// Parse a rating list held in memory, using [`LAYOUT_V1`].
pub fn parse(input: &str) -> Result<RatingList> {
  parse_bytes(input.as_bytes())
}

/// Parse raw file bytes. Non-UTF-8 bytes are replaced, never rejected.
pub fn parse_bytes(input: &[u8]) -> Result<RatingList> {
  parse_with_layout(LAYOUT_V1, input)
}

/// Parse with an explicit layout.
pub fn parse_with_layout(layout: Layout, input: &[u8]) -> Result<RatingList> {
  parse::parse_list(layout, input)
}

/// Read and parse the file at `path`.
pub fn parse_path(path: impl AsRef<Path>) -> Result<RatingList> {
  let path = path.as_ref();
  let bytes = std::fs::read(path).map_err(|source| Error::Io {
    path: path.display().to_string(),
    source,
  })?;
  parse_bytes(&bytes)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
