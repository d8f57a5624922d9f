//! Advisory shape checks over a normalized batch.
//!
//! Validation never mutates or drops rows. Each violated rule is reported
//! once per column with a count and a sample value; what happens next is
//! decided by [`crate::config::ValidationPolicy`].

use std::collections::{BTreeSet, HashSet};

use elolist_core::player::PlayerRecord;
use serde::Serialize;

// ─── Rules ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
  Id,
  Name,
  Federation,
  Sex,
  Title,
  Games,
  BirthYear,
  Activity,
  Rating,
}

impl Column {
  fn cell(self, r: &PlayerRecord) -> String {
    match self {
      Self::Id => r.id.to_string(),
      Self::Name => r.name.clone(),
      Self::Federation => r.federation.clone(),
      Self::Sex => r.sex.clone(),
      Self::Title => r.title.code().to_owned(),
      Self::Games => r.games.to_string(),
      Self::BirthYear => r.birth_year.to_string(),
      Self::Activity => r.activity.code().to_owned(),
      Self::Rating => r.rating.to_string(),
    }
  }
}

/// Expected shape of one column.
#[derive(Debug, Clone, Copy)]
pub struct ColumnRule {
  pub column:    Column,
  /// Every value must consist of ASCII digits only.
  pub numeric:   bool,
  /// No value may contain a digit.
  pub no_digits: bool,
  pub min_len:   Option<usize>,
  pub max_len:   Option<usize>,
}

const fn rule(
  column: Column,
  numeric: bool,
  no_digits: bool,
  min_len: Option<usize>,
  max_len: Option<usize>,
) -> ColumnRule {
  ColumnRule { column, numeric, no_digits, min_len, max_len }
}

pub const RULES: [ColumnRule; 9] = [
  rule(Column::Id, true, false, Some(6), Some(9)),
  rule(Column::Name, false, true, None, None),
  rule(Column::Federation, false, true, Some(3), Some(3)),
  rule(Column::Sex, false, true, Some(1), Some(1)),
  rule(Column::Title, false, true, Some(2), Some(3)),
  rule(Column::Games, true, false, Some(1), Some(2)),
  rule(Column::BirthYear, true, false, Some(4), Some(4)),
  rule(Column::Activity, false, true, Some(1), Some(3)),
  rule(Column::Rating, true, false, Some(4), Some(4)),
];

/// The kind of violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Violation {
  NotNumeric,
  ContainsDigits,
  TooShort { min: usize },
  TooLong { max: usize },
  /// A title code outside the recognised set.
  UnrecognisedTitle,
}

/// One violated rule on one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
  pub column:    Column,
  pub violation: Violation,
  /// Rows that break the rule.
  pub offending: usize,
  /// The first offending value, for the operator's benefit.
  pub sample:    String,
}

// ─── Report ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
  pub rows:             usize,
  pub issues:           Vec<FieldIssue>,
  /// Federation codes with no row in the countries reference table.
  pub unresolved_codes: Vec<String>,
}

impl ValidationReport {
  pub fn is_clean(&self) -> bool {
    self.issues.is_empty() && self.unresolved_codes.is_empty()
  }

  /// Emit one log line per finding.
  pub fn log(&self) {
    for issue in &self.issues {
      tracing::warn!(
        column = ?issue.column,
        violation = ?issue.violation,
        offending = issue.offending,
        sample = %issue.sample,
        "verify values in column"
      );
    }
    if !self.unresolved_codes.is_empty() {
      tracing::warn!(
        codes = ?self.unresolved_codes,
        "federation codes missing from the countries table; extend the alias table or the reference data"
      );
    }
    if self.is_clean() {
      tracing::info!(rows = self.rows, "validation passed");
    }
  }
}

// ─── Checks ──────────────────────────────────────────────────────────────────

fn violations(rule: &ColumnRule, value: &str) -> Vec<Violation> {
  let mut found = Vec::new();
  if rule.numeric && (value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit())) {
    found.push(Violation::NotNumeric);
  }
  if rule.no_digits && value.chars().any(|c| c.is_ascii_digit()) {
    found.push(Violation::ContainsDigits);
  }
  let len = value.chars().count();
  if let Some(min) = rule.min_len
    && len < min
  {
    found.push(Violation::TooShort { min });
  }
  if let Some(max) = rule.max_len
    && len > max
  {
    found.push(Violation::TooLong { max });
  }
  found
}

/// Check one column against its rule.
pub fn check_column(rule: &ColumnRule, records: &[PlayerRecord]) -> Vec<FieldIssue> {
  let mut issues: Vec<FieldIssue> = Vec::new();
  for record in records {
    let value = rule.column.cell(record);
    let mut found = violations(rule, &value);
    if rule.column == Column::Title && !record.title.is_recognised() {
      found.push(Violation::UnrecognisedTitle);
    }
    for violation in found {
      match issues.iter_mut().find(|i| i.violation == violation) {
        Some(issue) => issue.offending += 1,
        None => issues.push(FieldIssue {
          column: rule.column,
          violation,
          offending: 1,
          sample: value.clone(),
        }),
      }
    }
  }
  issues
}

/// Federation codes in `records` that are not in `known`, sorted.
pub fn unresolved_codes(records: &[PlayerRecord], known: &HashSet<String>) -> Vec<String> {
  records
    .iter()
    .filter(|r| !known.contains(&r.federation))
    .map(|r| r.federation.clone())
    .collect::<BTreeSet<_>>()
    .into_iter()
    .collect()
}

/// Run every column rule and the country-code check.
pub fn validate(records: &[PlayerRecord], known_codes: &HashSet<String>) -> ValidationReport {
  ValidationReport {
    rows:             records.len(),
    issues:           RULES.iter().flat_map(|r| check_column(r, records)).collect(),
    unresolved_codes: unresolved_codes(records, known_codes),
  }
}
