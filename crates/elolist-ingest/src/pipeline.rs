//! The monthly run: staging → parse → normalize → select → validate → merge
//! → refresh → archive → export.
//!
//! Structural failures (bad input, strict-policy validation) return an error
//! before anything is written. From the merge on, every step records its
//! outcome in [`RunSummary`] and the run carries on.

use std::{
  fmt,
  path::{Path, PathBuf},
};

use chrono::NaiveDate;
use elolist_core::{age::AgeGroupCount, player::PlayerRecord, store::RatingStore};
use elolist_fwf::RatingList;
use serde::Serialize;

use crate::{
  Error, Result,
  aliases::FederationAliases,
  archive::{self, StagedInput},
  config::{Settings, ValidationPolicy},
  export,
  merge::{MergeOutcome, merge_batch},
  normalize::{NormalizeReport, normalize},
  reference,
  select::top_n_per_federation,
  validate::{ValidationReport, validate},
};

// ─── Summaries ───────────────────────────────────────────────────────────────

/// Everything known about a batch before it touches the store.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
  pub period:        NaiveDate,
  pub rating_column: String,
  pub parsed_rows:   usize,
  pub normalize:     NormalizeReport,
  pub selected:      usize,
  pub validation:    ValidationReport,
}

/// A batch ready to merge.
#[derive(Debug, Clone)]
pub struct PreparedBatch {
  pub summary: BatchSummary,
  pub records: Vec<PlayerRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
  #[serde(flatten)]
  pub batch:           BatchSummary,
  pub merge:           MergeOutcome,
  pub view_refreshed:  bool,
  pub archived:        Vec<PathBuf>,
  /// Set when a failed merge kept the staged files out of the archive.
  pub archive_skipped: bool,
  pub archive_errors:  Vec<String>,
  pub exported:        Option<PathBuf>,
}

impl fmt::Display for BatchSummary {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(
      f,
      "list {} (column {}): {} rows parsed, {} kept, {} dropped, {} selected",
      self.period.format("%Y-%m"),
      self.rating_column,
      self.parsed_rows,
      self.normalize.kept_rows,
      self.normalize.dropped_total(),
      self.selected,
    )?;
    if let Some(median) = self.normalize.median_birth_year {
      writeln!(
        f,
        "birth years imputed: {} (median {median})",
        self.normalize.imputed_birth_years
      )?;
    }
    write!(
      f,
      "validation: {} issue(s), unresolved codes {:?}",
      self.validation.issues.len(),
      self.validation.unresolved_codes
    )
  }
}

impl fmt::Display for RunSummary {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "{}", self.batch)?;
    for table in [&self.merge.players, &self.merge.snapshots] {
      write!(
        f,
        "{}: {} candidate(s), {} present, {} inserted",
        table.table, table.candidates, table.already_present, table.inserted
      )?;
      match &table.failure {
        Some(failure) => writeln!(f, " (failed: {failure})")?,
        None => writeln!(f)?,
      }
    }
    writeln!(f, "age-group view refreshed: {}", self.view_refreshed)?;
    for path in &self.archived {
      writeln!(f, "archived {}", path.display())?;
    }
    if self.archive_skipped {
      writeln!(f, "archive skipped: merge incomplete, staged files kept")?;
    }
    for error in &self.archive_errors {
      writeln!(f, "archive failed: {error}")?;
    }
    match &self.exported {
      Some(path) => write!(f, "exported {}", path.display()),
      None => write!(f, "no export"),
    }
  }
}

// ─── Pipeline ────────────────────────────────────────────────────────────────

pub struct Pipeline<S> {
  store:    S,
  settings: Settings,
  aliases:  FederationAliases,
}

impl<S: RatingStore> Pipeline<S> {
  pub fn new(store: S, settings: Settings, aliases: FederationAliases) -> Self {
    Self { store, settings, aliases }
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn settings(&self) -> &Settings { &self.settings }

  /// Normalize, select, and validate `list` against the store's country
  /// codes. Reads from the store but never writes.
  pub async fn prepare(&self, list: &RatingList) -> Result<PreparedBatch> {
    let (records, normalize) = normalize(list, &self.aliases);
    let records = top_n_per_federation(records, self.settings.top_n);

    let known = self.store.country_codes().await.map_err(Error::store)?;
    let validation = validate(&records, &known);
    validation.log();

    Ok(PreparedBatch {
      summary: BatchSummary {
        period: list.period,
        rating_column: list.rating_column.clone(),
        parsed_rows: list.rows.len(),
        normalize,
        selected: records.len(),
        validation,
      },
      records,
    })
  }

  fn enforce_policy(&self, validation: &ValidationReport) -> Result<()> {
    match self.settings.validation_policy {
      ValidationPolicy::Strict if !validation.is_clean() => Err(Error::ValidationFailed {
        issues:     validation.issues.len(),
        unresolved: validation.unresolved_codes.len(),
      }),
      _ => Ok(()),
    }
  }

  /// Prepare, merge, and refresh the derived view. No archive, no export.
  async fn load(&self, list: &RatingList) -> Result<(RunSummary, Vec<PlayerRecord>)> {
    let PreparedBatch { summary, records } = self.prepare(list).await?;
    self.enforce_policy(&summary.validation)?;

    let merge = merge_batch(&self.store, &records).await;

    let view_refreshed = match self.store.refresh_age_groups().await {
      Ok(()) => {
        tracing::info!("age-group view refreshed");
        true
      }
      Err(e) => {
        tracing::error!(error = %e, "age-group view refresh failed; view is stale");
        false
      }
    };

    let run = RunSummary {
      batch: summary,
      merge,
      view_refreshed,
      archived: Vec::new(),
      archive_skipped: false,
      archive_errors: Vec::new(),
      exported: None,
    };
    Ok((run, records))
  }

  fn export(&self, run: &mut RunSummary, records: &[PlayerRecord]) {
    let Some(dir) = &self.settings.export_dir else { return };
    match export::export_batch(dir, run.batch.period, records) {
      Ok(path) => run.exported = Some(path),
      Err(e) => tracing::warn!(error = %e, "export failed"),
    }
  }

  /// Load an already-parsed list, then export it.
  pub async fn ingest_list(&self, list: &RatingList) -> Result<RunSummary> {
    let (mut run, records) = self.load(list).await?;
    self.export(&mut run, &records);
    Ok(run)
  }

  /// Ingest an explicit text file. The file is left where it is.
  pub async fn run_file(&self, path: &Path) -> Result<RunSummary> {
    tracing::info!(path = %path.display(), "ingesting rating list");
    let list = elolist_fwf::parse_path(path)?;
    self.ingest_list(&list).await
  }

  /// Ingest the monthly download from the staging directory and archive it.
  pub async fn run(&self) -> Result<RunSummary> {
    let staging = &self.settings.staging_dir;
    let input = self.stage(staging)?;
    tracing::info!(path = %input.text().display(), "ingesting rating list");
    let list = elolist_fwf::parse_path(input.text())?;

    let (mut run, records) = self.load(&list).await?;

    if !run.merge.is_complete() {
      tracing::warn!("merge incomplete; staged files left in place for a re-run");
      run.archive_skipped = true;
      self.export(&mut run, &records);
      return Ok(run);
    }

    let targets = [
      (&self.settings.raw_archive_dir, "zip"),
      (&self.settings.text_archive_dir, "txt"),
    ];
    for (destination, extension) in targets {
      match archive::move_files(staging, destination, list.period, extension) {
        Ok(moved) => run.archived.extend(moved),
        Err(e) => {
          tracing::warn!(extension, error = %e, "archiving failed; files left in staging");
          run.archive_errors.push(e.to_string());
        }
      }
    }

    self.export(&mut run, &records);
    Ok(run)
  }

  /// Find the staged list and unpack it if it came zipped.
  fn stage(&self, staging: &Path) -> Result<StagedInput> {
    let input = archive::discover(staging)?;
    if let StagedInput::Zip { archive: zip, text } = &input {
      archive::extract_zip(zip, staging, text)?;
    }
    Ok(input)
  }

  /// Dry run: everything up to validation, nothing written to the store.
  /// A staged zip is still extracted so its list can be read.
  pub async fn check(&self, file: Option<&Path>) -> Result<BatchSummary> {
    let list = match file {
      Some(path) => elolist_fwf::parse_path(path)?,
      None => {
        let input = self.stage(&self.settings.staging_dir)?;
        elolist_fwf::parse_path(input.text())?
      }
    };
    Ok(self.prepare(&list).await?.summary)
  }

  /// Insert or update country reference rows from a CSV file.
  pub async fn load_countries(&self, path: &Path) -> Result<usize> {
    let countries = reference::read_countries_csv(path)?;
    let n = self
      .store
      .load_countries(&countries)
      .await
      .map_err(Error::store)?;
    tracing::info!(rows = n, "countries loaded");
    Ok(n)
  }

  /// Age-group counts for `month`, or for the latest observed month.
  /// `None` when the store holds no snapshots.
  pub async fn age_summary(
    &self,
    month: Option<NaiveDate>,
  ) -> Result<Option<(NaiveDate, Vec<AgeGroupCount>)>> {
    let month = match month {
      Some(month) => month,
      None => match self.store.latest_observation().await.map_err(Error::store)? {
        Some(latest) => latest,
        None => return Ok(None),
      },
    };
    let counts = self
      .store
      .age_group_summary(month)
      .await
      .map_err(Error::store)?;
    Ok(Some((month, counts)))
  }
}
