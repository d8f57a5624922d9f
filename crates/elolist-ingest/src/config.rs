//! Runtime configuration.
//!
//! Settings are read once at startup from an optional TOML file and
//! `ELOLIST_*` environment variables, then passed by value into the pipeline.
//! Nothing in the pipeline reads the environment on its own.

use std::{
  path::{Path, PathBuf},
  str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Database URL ────────────────────────────────────────────────────────────

const SQLITE_SCHEME: &str = "sqlite://";
const SQLITE_MEMORY: &str = "sqlite::memory:";

/// A validated database location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseUrl {
  File(PathBuf),
  Memory,
}

impl FromStr for DatabaseUrl {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    if s == SQLITE_MEMORY {
      return Ok(Self::Memory);
    }
    match s.strip_prefix(SQLITE_SCHEME) {
      Some(path) if !path.is_empty() && !path.chars().any(char::is_whitespace) => {
        Ok(Self::File(PathBuf::from(path)))
      }
      _ => Err(Error::InvalidDatabaseUrl(s.to_owned())),
    }
  }
}

// ─── Validation policy ───────────────────────────────────────────────────────

/// What to do when validation finds anomalies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationPolicy {
  /// Log every anomaly and continue with the load.
  #[default]
  Warn,
  /// Abort before any write if there is a single anomaly.
  Strict,
}

// ─── Settings ────────────────────────────────────────────────────────────────

fn default_staging_dir() -> PathBuf { PathBuf::from("data/current") }
fn default_raw_archive_dir() -> PathBuf { PathBuf::from("data/raw") }
fn default_text_archive_dir() -> PathBuf { PathBuf::from("data/txt") }
fn default_top_n() -> usize { 100 }

/// Pipeline settings, deserialised from `elolist.toml` and the environment.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  /// `sqlite://<path>` or `sqlite::memory:`. Checked by [`Settings::database`].
  #[serde(default)]
  pub database_url:      Option<String>,
  /// Where the monthly download is dropped.
  #[serde(default = "default_staging_dir")]
  pub staging_dir:       PathBuf,
  /// Long-term home of processed `.zip` downloads.
  #[serde(default = "default_raw_archive_dir")]
  pub raw_archive_dir:   PathBuf,
  /// Long-term home of processed `.txt` lists.
  #[serde(default = "default_text_archive_dir")]
  pub text_archive_dir:  PathBuf,
  /// If set, each run writes the selected batch here as CSV.
  #[serde(default)]
  pub export_dir:        Option<PathBuf>,
  /// Overrides the built-in federation alias table.
  #[serde(default)]
  pub aliases_path:      Option<PathBuf>,
  /// Players kept per federation.
  #[serde(default = "default_top_n")]
  pub top_n:             usize,
  #[serde(default)]
  pub validation_policy: ValidationPolicy,
}

impl Settings {
  /// Layer the optional TOML file at `path` under `ELOLIST_*` environment
  /// variables and validate the result.
  pub fn load(path: Option<&Path>) -> Result<Self> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
      builder = builder.add_source(config::File::from(path).required(false));
    }
    let settings: Settings = builder
      .add_source(config::Environment::with_prefix("ELOLIST").try_parsing(true))
      .build()?
      .try_deserialize()?;

    settings.check()?;
    Ok(settings)
  }

  /// Fail fast on settings that would only break later in the run.
  pub fn check(&self) -> Result<()> {
    self.database()?;
    if self.top_n == 0 {
      return Err(Error::InvalidTopN);
    }
    Ok(())
  }

  /// The validated database location.
  pub fn database(&self) -> Result<DatabaseUrl> {
    self
      .database_url
      .as_deref()
      .ok_or(Error::MissingDatabaseUrl)?
      .parse()
  }

  /// Settings for a run against `database_url` with every other key at its
  /// default.
  pub fn with_database(database_url: impl Into<String>) -> Self {
    Self {
      database_url:      Some(database_url.into()),
      staging_dir:       default_staging_dir(),
      raw_archive_dir:   default_raw_archive_dir(),
      text_archive_dir:  default_text_archive_dir(),
      export_dir:        None,
      aliases_path:      None,
      top_n:             default_top_n(),
      validation_policy: ValidationPolicy::default(),
    }
  }
}
