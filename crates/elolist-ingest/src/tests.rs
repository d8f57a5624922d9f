//! End-to-end pipeline tests over synthetic rating lists and an in-memory
//! store.

use std::{collections::HashSet, fs, path::Path};

use chrono::NaiveDate;
use elolist_core::{
  age::{AgeGroup, AgeGroupCount},
  country::CountryReference,
  player::{MonthlySnapshot, PlayerIdentity, SnapshotKey},
  store::RatingStore,
};
use elolist_fwf::LAYOUT_V1;
use elolist_store_sqlite::SqliteStore;

use crate::{Error, FederationAliases, Pipeline, Settings, ValidationPolicy};

// ─── Failing store ───────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub(crate) enum FlakyError {
  #[error("injected failure in {0}")]
  Injected(&'static str),
  #[error(transparent)]
  Store(#[from] elolist_store_sqlite::Error),
}

/// An in-memory store whose writes can be made to fail on demand.
pub(crate) struct FlakyStore {
  pub(crate) inner:                SqliteStore,
  pub(crate) fail_player_insert:   bool,
  pub(crate) fail_snapshot_insert: bool,
  pub(crate) fail_refresh:         bool,
}

impl FlakyStore {
  pub(crate) async fn new() -> Self {
    Self {
      inner:                SqliteStore::open_in_memory().await.unwrap(),
      fail_player_insert:   false,
      fail_snapshot_insert: false,
      fail_refresh:         false,
    }
  }
}

impl RatingStore for FlakyStore {
  type Error = FlakyError;

  async fn player_ids(&self) -> Result<HashSet<u32>, FlakyError> {
    Ok(self.inner.player_ids().await?)
  }

  async fn insert_players(&self, players: &[PlayerIdentity]) -> Result<usize, FlakyError> {
    if self.fail_player_insert {
      return Err(FlakyError::Injected("insert_players"));
    }
    Ok(self.inner.insert_players(players).await?)
  }

  async fn snapshot_keys(
    &self,
    months: &[NaiveDate],
  ) -> Result<HashSet<SnapshotKey>, FlakyError> {
    Ok(self.inner.snapshot_keys(months).await?)
  }

  async fn insert_snapshots(&self, snapshots: &[MonthlySnapshot]) -> Result<usize, FlakyError> {
    if self.fail_snapshot_insert {
      return Err(FlakyError::Injected("insert_snapshots"));
    }
    Ok(self.inner.insert_snapshots(snapshots).await?)
  }

  async fn snapshots_for(&self, month: NaiveDate) -> Result<Vec<MonthlySnapshot>, FlakyError> {
    Ok(self.inner.snapshots_for(month).await?)
  }

  async fn latest_observation(&self) -> Result<Option<NaiveDate>, FlakyError> {
    Ok(self.inner.latest_observation().await?)
  }

  async fn country_codes(&self) -> Result<HashSet<String>, FlakyError> {
    Ok(self.inner.country_codes().await?)
  }

  async fn load_countries(&self, countries: &[CountryReference]) -> Result<usize, FlakyError> {
    Ok(self.inner.load_countries(countries).await?)
  }

  async fn refresh_age_groups(&self) -> Result<(), FlakyError> {
    if self.fail_refresh {
      return Err(FlakyError::Injected("refresh_age_groups"));
    }
    Ok(self.inner.refresh_age_groups().await?)
  }

  async fn age_group_summary(&self, month: NaiveDate) -> Result<Vec<AgeGroupCount>, FlakyError> {
    Ok(self.inner.age_group_summary(month).await?)
  }

  async fn count_players(&self) -> Result<u64, FlakyError> {
    Ok(self.inner.count_players().await?)
  }

  async fn count_snapshots(&self) -> Result<u64, FlakyError> {
    Ok(self.inner.count_snapshots().await?)
  }
}

const HEADER: [&str; 13] = [
  "ID Number", "Name", "Fed", "Sex", "Tit", "WTit", "OTit", "FOA", "SEP24", "Gms",
  "K", "B-day", "Flag",
];

/// `(id, name, fed, sex, title, rating, games, birth year, flag)`
type Row<'a> = (&'a str, &'a str, &'a str, &'a str, &'a str, &'a str, &'a str, &'a str, &'a str);

fn render_list(rows: &[Row]) -> String {
  let mut out = LAYOUT_V1.render(&HEADER);
  out.push('\n');
  for &(id, name, fed, sex, tit, rating, gms, bday, flag) in rows {
    out.push_str(&LAYOUT_V1.render(&[
      id, name, fed, sex, tit, "", "", "", rating, gms, "20", bday, flag,
    ]));
    out.push('\n');
  }
  out
}

fn usa_list() -> String {
  render_list(&[
    ("2000001", "Alpha, Ann", "USA", "F", "IM", "2400", "5", "1995", ""),
    ("2000002", "Bravo, Bob", "USA", "M", "GM", "2600", "7", "1988", ""),
    ("2000003", "Charlie, Cy", "USA", "M", "GM", "2600", "", "1979", "i"),
  ])
}

fn country(code: &str) -> CountryReference {
  CountryReference {
    code:      code.into(),
    country:   code.into(),
    subregion: "Somewhere".into(),
    continent: "Earth".into(),
  }
}

async fn pipeline(settings: Settings) -> Pipeline<SqliteStore> {
  let store = SqliteStore::open_in_memory().await.unwrap();
  Pipeline::new(store, settings, FederationAliases::embedded().unwrap())
}

fn settings(top_n: usize) -> Settings {
  let mut settings = Settings::with_database("sqlite::memory:");
  settings.top_n = top_n;
  settings
}

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
  let path = dir.join(name);
  fs::write(&path, contents).unwrap();
  path
}

// ─── Ingest ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn top_two_keeps_both_tied_leaders_and_reingest_is_a_no_op() {
  let p = pipeline(settings(2)).await;
  let list = elolist_fwf::parse(&usa_list()).unwrap();

  let first = p.ingest_list(&list).await.unwrap();
  assert_eq!(first.batch.parsed_rows, 3);
  assert_eq!(first.batch.selected, 2);
  assert_eq!(first.merge.players.inserted, 2);
  assert_eq!(first.merge.snapshots.inserted, 2);
  assert!(first.view_refreshed);

  let sept = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
  let stored = p.store().snapshots_for(sept).await.unwrap();
  let mut ids: Vec<u32> = stored.iter().map(|s| s.id).collect();
  ids.sort_unstable();
  assert_eq!(ids, vec![2000002, 2000003]);
  assert!(stored.iter().all(|s| s.rating == 2600));

  let second = p.ingest_list(&list).await.unwrap();
  assert_eq!(second.merge.players.inserted, 0);
  assert_eq!(second.merge.snapshots.inserted, 0);
  assert_eq!(p.store().count_snapshots().await.unwrap(), 2);
}

#[tokio::test]
async fn defaults_are_filled_before_storage() {
  let p = pipeline(settings(100)).await;
  let list = elolist_fwf::parse(&usa_list()).unwrap();
  p.ingest_list(&list).await.unwrap();

  let sept = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
  let charlie = p
    .store()
    .snapshots_for(sept)
    .await
    .unwrap()
    .into_iter()
    .find(|s| s.id == 2000003)
    .unwrap();
  assert_eq!(charlie.games, 0);
  assert_eq!(charlie.activity.code(), "i");
}

#[tokio::test]
async fn legacy_codes_are_remapped_and_unknown_codes_reported() {
  let p = pipeline(settings(100)).await;
  p.store()
    .load_countries(&[country("DEU"), country("USA")])
    .await
    .unwrap();

  let list = elolist_fwf::parse(&render_list(&[
    ("4600001", "Keller, Kai", "GER", "M", "", "2450", "3", "1990", ""),
    ("2000001", "Alpha, Ann", "USA", "F", "", "2400", "5", "1995", ""),
    ("9900001", "Zed, Zoe", "XKX", "F", "", "2100", "1", "2001", ""),
  ]))
  .unwrap();

  let run = p.ingest_list(&list).await.unwrap();
  assert_eq!(run.batch.normalize.remapped_codes.get("GER").map(String::as_str), Some("DEU"));
  assert_eq!(run.batch.validation.unresolved_codes, vec!["XKX"]);
  // Warn policy: the batch is still loaded.
  assert_eq!(run.merge.snapshots.inserted, 3);

  let sept = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
  let feds: Vec<String> = p
    .store()
    .snapshots_for(sept)
    .await
    .unwrap()
    .into_iter()
    .map(|s| s.federation)
    .collect();
  assert!(feds.contains(&"DEU".to_owned()));
  assert!(!feds.contains(&"GER".to_owned()));
}

#[tokio::test]
async fn strict_policy_aborts_before_any_write() {
  let mut strict = settings(100);
  strict.validation_policy = ValidationPolicy::Strict;
  let p = pipeline(strict).await;
  p.store().load_countries(&[country("USA")]).await.unwrap();

  let list = elolist_fwf::parse(&render_list(&[
    ("2000001", "Alpha, Ann", "USA", "F", "", "2400", "5", "1995", ""),
    ("9900001", "Zed, Zoe", "XKX", "F", "", "2100", "1", "2001", ""),
  ]))
  .unwrap();

  let err = p.ingest_list(&list).await.unwrap_err();
  assert!(matches!(
    err,
    Error::ValidationFailed { issues: 0, unresolved: 1 }
  ));
  assert_eq!(p.store().count_players().await.unwrap(), 0);
  assert_eq!(p.store().count_snapshots().await.unwrap(), 0);
}

#[tokio::test]
async fn strict_policy_passes_a_clean_batch() {
  let mut strict = settings(100);
  strict.validation_policy = ValidationPolicy::Strict;
  let p = pipeline(strict).await;
  p.store().load_countries(&[country("USA")]).await.unwrap();

  let list = elolist_fwf::parse(&usa_list()).unwrap();
  let run = p.ingest_list(&list).await.unwrap();
  assert!(run.batch.validation.is_clean(), "{:?}", run.batch.validation);
  assert_eq!(run.merge.players.inserted, 3);
}

#[tokio::test]
async fn age_groups_follow_the_latest_month() {
  let p = pipeline(settings(100)).await;
  let list = elolist_fwf::parse(&usa_list()).unwrap();
  p.ingest_list(&list).await.unwrap();

  let (month, counts) = p.age_summary(None).await.unwrap().unwrap();
  assert_eq!(month, NaiveDate::from_ymd_opt(2024, 9, 1).unwrap());
  // Born 1995, 1988 and 1979, observed in 2024.
  let groups: Vec<(AgeGroup, u32)> = counts.into_iter().map(|c| (c.group, c.players)).collect();
  assert_eq!(
    groups,
    vec![(AgeGroup::From19To30, 1), (AgeGroup::From31To40, 1), (AgeGroup::From41To50, 1)]
  );
}

#[tokio::test]
async fn empty_store_has_no_summary() {
  let p = pipeline(settings(100)).await;
  assert!(p.age_summary(None).await.unwrap().is_none());
}

#[test]
fn overlong_line_is_fatal() {
  let mut text = usa_list();
  text.push_str(&"9".repeat(LAYOUT_V1.total_width() + 4));
  text.push('\n');
  let err = elolist_fwf::parse(&text).unwrap_err();
  assert!(matches!(err, elolist_fwf::Error::LayoutMismatch { .. }));
}

// ─── Staging ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn run_archives_staged_files_and_exports() {
  let root = tempfile::tempdir().unwrap();
  let staging = root.path().join("current");
  let raw = root.path().join("raw");
  let txt = root.path().join("txt");
  let out = root.path().join("out");
  for dir in [&staging, &raw, &txt, &out] {
    fs::create_dir(dir).unwrap();
  }
  write(&staging, "standard_sep24frl.txt", &usa_list());

  let mut s = settings(100);
  s.staging_dir = staging.clone();
  s.raw_archive_dir = raw;
  s.text_archive_dir = txt.clone();
  s.export_dir = Some(out.clone());
  let p = pipeline(s).await;

  let run = p.run().await.unwrap();
  assert_eq!(run.merge.snapshots.inserted, 3);
  assert!(run.archive_errors.is_empty(), "{:?}", run.archive_errors);
  assert_eq!(run.archived, vec![txt.join("2024-09").join("standard_sep24frl.txt")]);
  assert!(!staging.join("standard_sep24frl.txt").exists());

  let exported = run.exported.unwrap();
  assert_eq!(exported, out.join("open_2024-09.csv"));
  assert_eq!(fs::read_to_string(exported).unwrap().lines().count(), 4);
}

#[tokio::test]
async fn run_extracts_a_staged_zip() {
  use std::io::Write as _;

  let root = tempfile::tempdir().unwrap();
  let staging = root.path().join("current");
  let raw = root.path().join("raw");
  let txt = root.path().join("txt");
  for dir in [&staging, &raw, &txt] {
    fs::create_dir(dir).unwrap();
  }
  {
    let file = fs::File::create(staging.join("standard_sep24frl.zip")).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    zip
      .start_file("standard_sep24frl.txt", zip::write::SimpleFileOptions::default())
      .unwrap();
    zip.write_all(usa_list().as_bytes()).unwrap();
    zip.finish().unwrap();
  }

  let mut s = settings(100);
  s.staging_dir = staging.clone();
  s.raw_archive_dir = raw.clone();
  s.text_archive_dir = txt.clone();
  let p = pipeline(s).await;

  let run = p.run().await.unwrap();
  assert_eq!(run.merge.players.inserted, 3);
  assert!(raw.join("2024-09").join("standard_sep24frl.zip").is_file());
  assert!(txt.join("2024-09").join("standard_sep24frl.txt").is_file());
  assert!(run.exported.is_none());
}

#[tokio::test]
async fn missing_archive_destination_does_not_fail_the_run() {
  let root = tempfile::tempdir().unwrap();
  let staging = root.path().join("current");
  fs::create_dir(&staging).unwrap();
  write(&staging, "list.txt", &usa_list());

  let mut s = settings(100);
  s.staging_dir = staging.clone();
  s.raw_archive_dir = root.path().join("missing-raw");
  s.text_archive_dir = root.path().join("missing-txt");
  let p = pipeline(s).await;

  let run = p.run().await.unwrap();
  assert_eq!(run.merge.snapshots.inserted, 3);
  assert_eq!(run.archive_errors.len(), 2);
  assert!(staging.join("list.txt").exists());
}

#[tokio::test]
async fn empty_staging_fails_before_writes() {
  let root = tempfile::tempdir().unwrap();
  let mut s = settings(100);
  s.staging_dir = root.path().to_path_buf();
  let p = pipeline(s).await;

  assert!(matches!(p.run().await, Err(Error::NoInput(_))));
  assert_eq!(p.store().count_players().await.unwrap(), 0);
}

#[tokio::test]
async fn check_writes_nothing() {
  let root = tempfile::tempdir().unwrap();
  let file = write(root.path(), "list.txt", &usa_list());
  let p = pipeline(settings(2)).await;

  let batch = p.check(Some(&file)).await.unwrap();
  assert_eq!(batch.parsed_rows, 3);
  assert_eq!(batch.selected, 2);
  assert_eq!(p.store().count_players().await.unwrap(), 0);
  assert!(file.exists());
}

#[tokio::test]
async fn run_file_leaves_the_file_in_place() {
  let root = tempfile::tempdir().unwrap();
  let file = write(root.path(), "list.txt", &usa_list());
  let p = pipeline(settings(100)).await;

  let run = p.run_file(&file).await.unwrap();
  assert_eq!(run.merge.players.inserted, 3);
  assert!(run.archived.is_empty());
  assert!(file.exists());
}

#[tokio::test]
async fn countries_load_from_csv() {
  let root = tempfile::tempdir().unwrap();
  let csv = write(
    root.path(),
    "countries.csv",
    "code,country,subregion,continent\nNOR,Norway,Northern Europe,Europe\n",
  );
  let p = pipeline(settings(100)).await;

  assert_eq!(p.load_countries(&csv).await.unwrap(), 1);
  assert!(p.store().country_codes().await.unwrap().contains("NOR"));
}

// ─── Failures ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn failed_refresh_is_reported_not_fatal() {
  let mut store = FlakyStore::new().await;
  store.fail_refresh = true;
  let p = Pipeline::new(store, settings(100), FederationAliases::embedded().unwrap());

  let list = elolist_fwf::parse(&usa_list()).unwrap();
  let run = p.ingest_list(&list).await.unwrap();
  assert!(!run.view_refreshed);
  assert!(run.merge.is_complete());
  assert_eq!(run.merge.snapshots.inserted, 3);
}

#[tokio::test]
async fn failed_player_insert_still_attempts_snapshots_and_refresh() {
  let mut store = FlakyStore::new().await;
  store.fail_player_insert = true;
  let p = Pipeline::new(store, settings(100), FederationAliases::embedded().unwrap());

  let list = elolist_fwf::parse(&usa_list()).unwrap();
  let run = p.ingest_list(&list).await.unwrap();

  assert_eq!(
    run.merge.players.failure.as_deref(),
    Some("injected failure in insert_players")
  );
  // The snapshot insert reached the database and was rejected there.
  let snapshot_failure = run.merge.snapshots.failure.as_deref().unwrap();
  assert!(!snapshot_failure.contains("injected"), "{snapshot_failure}");
  assert!(run.view_refreshed);
  assert_eq!(p.store().count_snapshots().await.unwrap(), 0);
}

#[tokio::test]
async fn failed_merge_keeps_staged_files() {
  let root = tempfile::tempdir().unwrap();
  let staging = root.path().join("current");
  let txt = root.path().join("txt");
  for dir in [&staging, &txt] {
    fs::create_dir(dir).unwrap();
  }
  write(&staging, "standard_sep24frl.txt", &usa_list());

  let mut s = settings(100);
  s.staging_dir = staging.clone();
  s.raw_archive_dir = txt.clone();
  s.text_archive_dir = txt.clone();
  let mut store = FlakyStore::new().await;
  store.fail_snapshot_insert = true;
  let p = Pipeline::new(store, s, FederationAliases::embedded().unwrap());

  let run = p.run().await.unwrap();
  assert!(run.merge.snapshots.failure.is_some());
  assert_eq!(run.merge.players.inserted, 3);
  assert!(run.archive_skipped);
  assert!(run.archived.is_empty());
  assert!(staging.join("standard_sep24frl.txt").is_file());
  assert!(!txt.join("2024-09").exists());
}
