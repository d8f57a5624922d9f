//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Observation dates are stored as `YYYY-MM-DD` strings so that `strftime`
//! and lexical ordering both work on them.

use chrono::NaiveDate;
use elolist_core::{
  age::{AgeGroup, AgeGroupCount},
  player::{ActivityStatus, MonthlySnapshot, Title},
};

use crate::{Error, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `monthlyupdates` row.
pub struct RawSnapshot {
  pub id:              u32,
  pub fed:             String,
  pub title:           String,
  pub number_of_games: u16,
  pub activity_status: String,
  pub rating:          u16,
  pub ongoing_date:    String,
}

impl RawSnapshot {
  pub fn into_snapshot(self) -> Result<MonthlySnapshot> {
    Ok(MonthlySnapshot {
      id:          self.id,
      federation:  self.fed,
      title:       Title::from_code(&self.title),
      games:       self.number_of_games,
      activity:    self.activity_status.parse::<ActivityStatus>()?,
      rating:      self.rating,
      observed_on: decode_date(&self.ongoing_date)?,
    })
  }
}

/// Raw `(age_category, count)` pair read from the age-group table.
pub struct RawAgeGroupCount {
  pub age_category: String,
  pub players:      u32,
}

impl RawAgeGroupCount {
  pub fn into_count(self) -> Result<AgeGroupCount> {
    Ok(AgeGroupCount {
      group:   self.age_category.parse::<AgeGroup>()?,
      players: self.players,
    })
  }
}
