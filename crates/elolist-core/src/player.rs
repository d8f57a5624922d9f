//! Player types: the immutable identity and the monthly snapshot.
//!
//! An identity is written once, the first time a player id is seen, and is
//! never updated afterwards. Snapshots accumulate one row per player per
//! observation month and are likewise never mutated once written.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Title ───────────────────────────────────────────────────────────────────

/// A chess title as carried in the `Tit` column of the rating list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Title {
  Gm,
  Im,
  Fm,
  Cm,
  Wgm,
  Wim,
  Wfm,
  Wcm,
  Wh,
  /// The "no title" sentinel (`NT`).
  #[default]
  Untitled,
  /// A code the list carried that is not one of the recognised titles.
  Other(String),
}

impl Title {
  /// Sentinel stored for players without a title.
  pub const NO_TITLE: &'static str = "NT";

  /// Parse a raw `Tit` cell; blank cells map to [`Title::Untitled`].
  pub fn from_code(raw: &str) -> Self {
    match raw.trim() {
      "" | Self::NO_TITLE => Self::Untitled,
      "GM" => Self::Gm,
      "IM" => Self::Im,
      "FM" => Self::Fm,
      "CM" => Self::Cm,
      "WGM" => Self::Wgm,
      "WIM" => Self::Wim,
      "WFM" => Self::Wfm,
      "WCM" => Self::Wcm,
      "WH" => Self::Wh,
      other => Self::Other(other.to_owned()),
    }
  }

  /// The code stored in the `title` column.
  pub fn code(&self) -> &str {
    match self {
      Self::Gm => "GM",
      Self::Im => "IM",
      Self::Fm => "FM",
      Self::Cm => "CM",
      Self::Wgm => "WGM",
      Self::Wim => "WIM",
      Self::Wfm => "WFM",
      Self::Wcm => "WCM",
      Self::Wh => "WH",
      Self::Untitled => Self::NO_TITLE,
      Self::Other(code) => code,
    }
  }

  pub fn is_recognised(&self) -> bool { !matches!(self, Self::Other(_)) }
}

impl fmt::Display for Title {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.code())
  }
}

impl Serialize for Title {
  fn serialize<S: serde::Serializer>(
    &self,
    serializer: S,
  ) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(self.code())
  }
}

impl<'de> Deserialize<'de> for Title {
  fn deserialize<D: serde::Deserializer<'de>>(
    deserializer: D,
  ) -> std::result::Result<Self, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Ok(Self::from_code(&raw))
  }
}

// ─── Activity ────────────────────────────────────────────────────────────────

/// Whether the player was active in the rating period.
///
/// The list's `Flag` column mixes activity with other markers (`w` marks a
/// woman player); those aliases collapse onto these two values.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub enum ActivityStatus {
  #[default]
  #[serde(rename = "a")]
  Active,
  #[serde(rename = "i")]
  Inactive,
}

impl ActivityStatus {
  /// Resolve a raw `Flag` cell. Blank means active.
  pub fn from_flag(raw: &str) -> Result<Self> {
    match raw.trim() {
      "" | "a" | "w" => Ok(Self::Active),
      "i" | "wi" => Ok(Self::Inactive),
      other => Err(Error::UnknownActivityStatus(other.to_owned())),
    }
  }

  pub fn code(self) -> &'static str {
    match self {
      Self::Active => "a",
      Self::Inactive => "i",
    }
  }
}

impl FromStr for ActivityStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::from_flag(s) }
}

// ─── Identity ────────────────────────────────────────────────────────────────

/// The static, per-person row (`players` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerIdentity {
  /// Federation-issued numeric identifier (6–9 digits).
  pub id:         u32,
  pub name:       String,
  pub sex:        String,
  pub birth_year: u16,
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// Composite key of a [`MonthlySnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SnapshotKey {
  pub id:          u32,
  pub observed_on: NaiveDate,
}

/// One player's standing in one rating period (`monthlyupdates` table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySnapshot {
  pub id:          u32,
  /// Canonical three-letter federation code.
  pub federation:  String,
  pub title:       Title,
  pub games:       u16,
  pub activity:    ActivityStatus,
  pub rating:      u16,
  /// Always the first day of the rating period's month.
  pub observed_on: NaiveDate,
}

impl MonthlySnapshot {
  pub fn key(&self) -> SnapshotKey {
    SnapshotKey { id: self.id, observed_on: self.observed_on }
  }
}

// ─── Normalized row ──────────────────────────────────────────────────────────

/// A fully normalized rating-list row: identity and snapshot fields together.
///
/// This is the unit the selector ranks and the merge splits into the two
/// persisted tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
  pub id:          u32,
  pub name:        String,
  pub federation:  String,
  pub sex:         String,
  pub title:       Title,
  pub games:       u16,
  pub birth_year:  u16,
  pub activity:    ActivityStatus,
  pub rating:      u16,
  pub observed_on: NaiveDate,
}

impl PlayerRecord {
  pub fn identity(&self) -> PlayerIdentity {
    PlayerIdentity {
      id:         self.id,
      name:       self.name.clone(),
      sex:        self.sex.clone(),
      birth_year: self.birth_year,
    }
  }

  pub fn snapshot(&self) -> MonthlySnapshot {
    MonthlySnapshot {
      id:          self.id,
      federation:  self.federation.clone(),
      title:       self.title.clone(),
      games:       self.games,
      activity:    self.activity,
      rating:      self.rating,
      observed_on: self.observed_on,
    }
  }
}
