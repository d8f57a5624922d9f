//! CSV export of the selected batch.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use elolist_core::player::PlayerRecord;
use serde::Serialize;

use crate::{Error, Result};

#[derive(Serialize)]
struct ExportRow<'a> {
  #[serde(rename = "ID")]
  id:              u32,
  #[serde(rename = "Name")]
  name:            &'a str,
  #[serde(rename = "Fed")]
  federation:      &'a str,
  #[serde(rename = "Sex")]
  sex:             &'a str,
  #[serde(rename = "Title")]
  title:           &'a str,
  #[serde(rename = "Number_of_games")]
  games:           u16,
  #[serde(rename = "B-day")]
  birth_year:      u16,
  activity_status: &'a str,
  #[serde(rename = "Rating")]
  rating:          u16,
  #[serde(rename = "Date")]
  date:            String,
}

impl<'a> From<&'a PlayerRecord> for ExportRow<'a> {
  fn from(r: &'a PlayerRecord) -> Self {
    Self {
      id:              r.id,
      name:            &r.name,
      federation:      &r.federation,
      sex:             &r.sex,
      title:           r.title.code(),
      games:           r.games,
      birth_year:      r.birth_year,
      activity_status: r.activity.code(),
      rating:          r.rating,
      date:            r.observed_on.format("%Y-%m-%d").to_string(),
    }
  }
}

/// `open_<YYYY-MM>.csv`
pub fn export_file_name(period: NaiveDate) -> String {
  format!("open_{}.csv", period.format("%Y-%m"))
}

/// Write `records` to any writer, header first.
pub fn write_csv<W: std::io::Write>(writer: W, records: &[PlayerRecord]) -> Result<()> {
  let mut csv = csv::Writer::from_writer(writer);
  for record in records {
    csv.serialize(ExportRow::from(record))?;
  }
  csv.flush().map_err(|e| Error::io("<csv writer>", e))?;
  Ok(())
}

/// Write `records` to `<dir>/open_<YYYY-MM>.csv` and return the path.
pub fn export_batch(dir: &Path, period: NaiveDate, records: &[PlayerRecord]) -> Result<PathBuf> {
  let path = dir.join(export_file_name(period));
  let file = std::fs::File::create(&path).map_err(|e| Error::io(&path, e))?;
  write_csv(file, records)?;
  tracing::info!(path = %path.display(), rows = records.len(), "batch exported");
  Ok(path)
}
