//! Age buckets used by the derived age-group view.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Age bucket of a player in a given rating period.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum AgeGroup {
  #[serde(rename = "Less than 19")]
  Under19,
  #[serde(rename = "19-30")]
  From19To30,
  #[serde(rename = "31-40")]
  From31To40,
  #[serde(rename = "41-50")]
  From41To50,
  #[serde(rename = "51-65")]
  From51To65,
  #[serde(rename = "More than 66")]
  Over65,
}

impl AgeGroup {
  pub const ALL: [AgeGroup; 6] = [
    Self::Under19,
    Self::From19To30,
    Self::From31To40,
    Self::From41To50,
    Self::From51To65,
    Self::Over65,
  ];

  pub fn from_age(age: i32) -> Self {
    match age {
      ..19 => Self::Under19,
      19..=30 => Self::From19To30,
      31..=40 => Self::From31To40,
      41..=50 => Self::From41To50,
      51..=65 => Self::From51To65,
      _ => Self::Over65,
    }
  }

  /// The label stored in the `age_category` column.
  pub fn label(self) -> &'static str {
    match self {
      Self::Under19 => "Less than 19",
      Self::From19To30 => "19-30",
      Self::From31To40 => "31-40",
      Self::From41To50 => "41-50",
      Self::From51To65 => "51-65",
      Self::Over65 => "More than 66",
    }
  }
}

impl fmt::Display for AgeGroup {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

impl FromStr for AgeGroup {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    Self::ALL
      .into_iter()
      .find(|g| g.label() == s)
      .ok_or_else(|| Error::UnknownAgeGroup(s.to_owned()))
  }
}

/// One row of the age-group summary for a rating period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeGroupCount {
  pub group:   AgeGroup,
  pub players: u32,
}
