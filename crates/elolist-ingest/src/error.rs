//! Error type for the ingestion pipeline.
//!
//! Only structural failures are errors. Field-level anomalies are reported
//! through [`crate::validate::ValidationReport`], and a failed table merge is
//! recorded in [`crate::merge::TableMerge`] so later steps still run.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("configuration error: {0}")]
  Config(#[from] config::ConfigError),

  #[error("database_url is not set (config key `database_url` or ELOLIST_DATABASE_URL)")]
  MissingDatabaseUrl,

  #[error(
    "database_url {0:?} is malformed; expected `sqlite://<path>` or `sqlite::memory:`"
  )]
  InvalidDatabaseUrl(String),

  #[error("top_n must be at least 1")]
  InvalidTopN,

  #[error("invalid federation alias table: {0}")]
  Aliases(#[from] toml::de::Error),

  #[error("rating list error: {0}")]
  Parse(#[from] elolist_fwf::Error),

  #[error("no rating list (.zip or .txt) found in {0}")]
  NoInput(PathBuf),

  #[error("expected one rating list in {dir}, found {found:?}")]
  AmbiguousInput { dir: PathBuf, found: Vec<String> },

  #[error("archive {archive} did not contain {expected}")]
  MissingExtractedFile { archive: PathBuf, expected: PathBuf },

  #[error("archive destination {0} does not exist")]
  MissingDestination(PathBuf),

  #[error("zip error: {0}")]
  Zip(#[from] zip::result::ZipError),

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("i/o error on {path}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error(
    "validation failed under strict policy: {issues} field issue(s), \
     {unresolved} unresolved federation code(s)"
  )]
  ValidationFailed { issues: usize, unresolved: usize },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Self::Io { path: path.into(), source }
  }

  pub(crate) fn store<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
