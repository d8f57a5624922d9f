//! Row normalization: raw rating-list cells → [`PlayerRecord`]s.
//!
//! Steps run in a fixed order; each assumes the previous ones are done.
//!
//! 1. drop rows missing a required field (or with an unusable id/rating)
//! 2. fill defaults: title `NT`, activity active, games 0
//! 3. clean names
//! 4. impute invalid birth years with the dataset median
//! 5. remap legacy federation codes

use std::collections::BTreeMap;

use chrono::NaiveDate;
use elolist_core::player::{ActivityStatus, PlayerRecord, Title};
use elolist_fwf::{RatingList, RawRow};
use serde::Serialize;

use crate::aliases::FederationAliases;

// ─── Report ──────────────────────────────────────────────────────────────────

/// Why a row was excluded from the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
  MissingId,
  MissingName,
  MissingFederation,
  MissingSex,
  MissingBirthYear,
  MissingRating,
  MalformedId,
  MalformedRating,
  EmptyName,
  NoValidBirthYear,
}

/// What normalization did to the batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NormalizeReport {
  pub input_rows:          usize,
  pub kept_rows:           usize,
  pub dropped:             BTreeMap<DropReason, usize>,
  pub median_birth_year:   Option<u16>,
  pub imputed_birth_years: usize,
  /// Legacy code → canonical code, for every alias that actually occurred.
  pub remapped_codes:      BTreeMap<String, String>,
  /// Flag values that were neither an activity marker nor a known alias.
  pub unknown_flags:       BTreeMap<String, usize>,
  pub defaulted_games:     usize,
}

impl NormalizeReport {
  pub fn dropped_total(&self) -> usize { self.dropped.values().sum() }

  fn drop_row(&mut self, row: &RawRow, reason: DropReason) {
    tracing::debug!(line = row.line, ?reason, "row dropped");
    *self.dropped.entry(reason).or_default() += 1;
  }
}

// ─── Intermediate row ────────────────────────────────────────────────────────

/// A row that survived step 1; birth year and federation are still raw.
struct Draft {
  id:         u32,
  name:       String,
  federation: String,
  sex:        String,
  title:      Title,
  games:      u16,
  birth_year: Option<u16>,
  activity:   ActivityStatus,
  rating:     u16,
}

// ─── Steps ───────────────────────────────────────────────────────────────────

fn required<'a>(
  field: &'a Option<String>,
  reason: DropReason,
) -> Result<&'a str, DropReason> {
  field.as_deref().ok_or(reason)
}

/// Step 1: reject rows missing a required field.
fn check_required(row: &RawRow) -> Result<(u32, u16), DropReason> {
  let id = required(&row.id, DropReason::MissingId)?;
  required(&row.name, DropReason::MissingName)?;
  required(&row.federation, DropReason::MissingFederation)?;
  required(&row.sex, DropReason::MissingSex)?;
  required(&row.birth_year, DropReason::MissingBirthYear)?;
  let rating = required(&row.rating, DropReason::MissingRating)?;

  let id = id.parse::<u32>().map_err(|_| DropReason::MalformedId)?;
  let rating = rating
    .parse::<u16>()
    .map_err(|_| DropReason::MalformedRating)?;
  Ok((id, rating))
}

/// Step 3: keep the part of the name before any disambiguation number or
/// parenthetical, then trim stray punctuation.
pub fn clean_name(raw: &str) -> String {
  let cut = raw
    .find(|c: char| c.is_ascii_digit() || c == '(')
    .unwrap_or(raw.len());
  raw[..cut]
    .trim_matches(|c: char| c.is_whitespace() || matches!(c, '-' | '`' | '/'))
    .to_owned()
}

/// A birth year is usable only if its numeric value has exactly four digits;
/// the `0000` placeholder is not.
fn parse_birth_year(raw: &str) -> Option<u16> {
  raw
    .parse::<u16>()
    .ok()
    .filter(|y| (1000..=9999).contains(y))
}

/// Lower median of `years`, or `None` if empty.
pub fn median_birth_year(years: &mut [u16]) -> Option<u16> {
  if years.is_empty() {
    return None;
  }
  years.sort_unstable();
  Some(years[(years.len() - 1) / 2])
}

// ─── Entry point ─────────────────────────────────────────────────────────────

/// Normalize every row of `list`. Deterministic: the same list and alias
/// table always produce the same records in the same order.
pub fn normalize(
  list: &RatingList,
  aliases: &FederationAliases,
) -> (Vec<PlayerRecord>, NormalizeReport) {
  normalize_rows(&list.rows, list.period, aliases)
}

pub fn normalize_rows(
  rows: &[RawRow],
  observed_on: NaiveDate,
  aliases: &FederationAliases,
) -> (Vec<PlayerRecord>, NormalizeReport) {
  let mut report = NormalizeReport {
    input_rows: rows.len(),
    ..Default::default()
  };

  let mut drafts: Vec<(&RawRow, Draft)> = Vec::with_capacity(rows.len());
  for row in rows {
    // 1. required fields
    let (id, rating) = match check_required(row) {
      Ok(parsed) => parsed,
      Err(reason) => {
        report.drop_row(row, reason);
        continue;
      }
    };

    // 2. defaults
    let title = Title::from_code(row.title.as_deref().unwrap_or(""));
    let flag = row.flag.as_deref().unwrap_or("");
    let activity = ActivityStatus::from_flag(flag).unwrap_or_else(|_| {
      *report.unknown_flags.entry(flag.to_owned()).or_default() += 1;
      ActivityStatus::Active
    });
    let games = match row.games.as_deref().map(str::parse::<u16>) {
      Some(Ok(games)) => games,
      _ => {
        report.defaulted_games += 1;
        0
      }
    };

    // 3. names
    let name = clean_name(row.name.as_deref().unwrap_or(""));
    if name.is_empty() {
      report.drop_row(row, DropReason::EmptyName);
      continue;
    }

    drafts.push((row, Draft {
      id,
      name,
      federation: row.federation.clone().unwrap_or_default(),
      sex: row.sex.clone().unwrap_or_default(),
      title,
      games,
      birth_year: row.birth_year.as_deref().and_then(parse_birth_year),
      activity,
      rating,
    }));
  }

  // 4. birth years
  let mut valid_years: Vec<u16> =
    drafts.iter().filter_map(|(_, d)| d.birth_year).collect();
  report.median_birth_year = median_birth_year(&mut valid_years);

  let mut records = Vec::with_capacity(drafts.len());
  for (row, draft) in drafts {
    let birth_year = match (draft.birth_year, report.median_birth_year) {
      (Some(year), _) => year,
      (None, Some(median)) => {
        report.imputed_birth_years += 1;
        median
      }
      (None, None) => {
        report.drop_row(row, DropReason::NoValidBirthYear);
        continue;
      }
    };

    // 5. federation codes
    let federation = aliases.resolve(&draft.federation);
    if federation != draft.federation {
      report
        .remapped_codes
        .entry(draft.federation.clone())
        .or_insert_with(|| federation.clone());
    }

    records.push(PlayerRecord {
      id: draft.id,
      name: draft.name,
      federation,
      sex: draft.sex,
      title: draft.title,
      games: draft.games,
      birth_year,
      activity: draft.activity,
      rating: draft.rating,
      observed_on,
    });
  }

  report.kept_rows = records.len();

  for (flag, count) in &report.unknown_flags {
    tracing::warn!(flag = %flag, count, "unrecognised activity flag treated as active");
  }
  tracing::info!(
    input = report.input_rows,
    kept = report.kept_rows,
    dropped = report.dropped_total(),
    imputed_birth_years = report.imputed_birth_years,
    remapped_codes = report.remapped_codes.len(),
    "rows normalized"
  );

  (records, report)
}
