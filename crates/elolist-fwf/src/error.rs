//! Error types for the fixed-width rating-list codec.
//!
//! Every variant is structural: the file cannot be mapped onto the declared
//! layout, so ingestion must stop rather than risk misaligned columns.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("rating list is empty")]
  Empty,

  #[error(
    "line {line} is {found} bytes wide but the layout declares {expected}; \
     the file does not tokenize into {columns} columns"
  )]
  LayoutMismatch {
    line:     usize,
    expected: usize,
    found:    usize,
    columns:  usize,
  },

  #[error("required column {0:?} not found in header")]
  MissingColumn(&'static str),

  #[error("no rating-period column (e.g. \"SEP24\") found in header")]
  MissingRatingColumn,

  #[error("several rating-period columns found in header: {0:?}")]
  AmbiguousRatingColumn(Vec<String>),

  #[error("invalid rating period: {0}")]
  Period(#[from] elolist_core::Error),

  #[error("failed to read {path}: {source}")]
  Io {
    path:   String,
    #[source]
    source: std::io::Error,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
