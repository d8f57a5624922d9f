//! Error types for `elolist-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown activity status: {0:?}")]
  UnknownActivityStatus(String),

  #[error("unknown age group: {0:?}")]
  UnknownAgeGroup(String),

  #[error("not a rating period header: {0:?}")]
  InvalidPeriod(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
