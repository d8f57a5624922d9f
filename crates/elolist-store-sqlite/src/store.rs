//! [`SqliteStore`], the SQLite implementation of [`RatingStore`].

use std::{collections::HashSet, path::Path};

use chrono::NaiveDate;
use elolist_core::{
  age::AgeGroupCount,
  country::CountryReference,
  player::{MonthlySnapshot, PlayerIdentity, SnapshotKey},
  store::RatingStore,
};

use crate::{
  Result,
  encode::{RawAgeGroupCount, RawSnapshot, decode_date, encode_date},
  schema::{AGE_GROUP_VIEW, REFRESH_AGE_GROUPS, SCHEMA},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A rating store backed by a single SQLite file.
///
/// Clones share the inner connection. The pipeline
/// opens one store per run and drops it when the run ends.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn count(&self, table: &'static str) -> Result<u64> {
    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| {
          r.get(0)
        })?)
      })
      .await?;
    Ok(n.max(0) as u64)
  }
}

// ─── RatingStore impl ────────────────────────────────────────────────────────

impl RatingStore for SqliteStore {
  type Error = crate::Error;

  // ── Identities ────────────────────────────────────────────────────────────

  async fn player_ids(&self) -> Result<HashSet<u32>> {
    let ids = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT id FROM players")?;
        let ids = stmt
          .query_map([], |row| row.get::<_, u32>(0))?
          .collect::<rusqlite::Result<HashSet<_>>>()?;
        Ok(ids)
      })
      .await?;
    Ok(ids)
  }

  async fn insert_players(&self, players: &[PlayerIdentity]) -> Result<usize> {
    let rows = players.to_vec();

    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO players (id, name, sex, b_day) VALUES (?1, ?2, ?3, ?4)",
          )?;
          for p in &rows {
            stmt.execute(rusqlite::params![p.id, p.name, p.sex, p.birth_year])?;
          }
        }
        tx.commit()?;
        Ok(rows.len())
      })
      .await?;

    tracing::debug!(rows = written, "players inserted");
    Ok(written)
  }

  // ── Snapshots ─────────────────────────────────────────────────────────────

  async fn snapshot_keys(&self, months: &[NaiveDate]) -> Result<HashSet<SnapshotKey>> {
    let encoded: Vec<(NaiveDate, String)> =
      months.iter().map(|m| (*m, encode_date(*m))).collect();

    let keys = self
      .conn
      .call(move |conn| {
        let mut stmt =
          conn.prepare("SELECT id FROM monthlyupdates WHERE ongoing_date = ?1")?;
        let mut keys = HashSet::new();
        for (month, month_str) in &encoded {
          let ids = stmt
            .query_map(rusqlite::params![month_str], |row| row.get::<_, u32>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          keys.extend(ids.into_iter().map(|id| SnapshotKey {
            id,
            observed_on: *month,
          }));
        }
        Ok(keys)
      })
      .await?;
    Ok(keys)
  }

  async fn insert_snapshots(&self, snapshots: &[MonthlySnapshot]) -> Result<usize> {
    let rows: Vec<(MonthlySnapshot, String)> = snapshots
      .iter()
      .map(|s| (s.clone(), encode_date(s.observed_on)))
      .collect();

    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO monthlyupdates (
               id, fed, title, number_of_games, activity_status, rating, ongoing_date
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          )?;
          for (s, date) in &rows {
            stmt.execute(rusqlite::params![
              s.id,
              s.federation,
              s.title.code(),
              s.games,
              s.activity.code(),
              s.rating,
              date,
            ])?;
          }
        }
        tx.commit()?;
        Ok(rows.len())
      })
      .await?;

    tracing::debug!(rows = written, "snapshots inserted");
    Ok(written)
  }

  async fn snapshots_for(&self, month: NaiveDate) -> Result<Vec<MonthlySnapshot>> {
    let month_str = encode_date(month);

    let raws: Vec<RawSnapshot> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, fed, title, number_of_games, activity_status, rating, ongoing_date
           FROM monthlyupdates
           WHERE ongoing_date = ?1
           ORDER BY fed ASC, rating DESC, id ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![month_str], |row| {
            Ok(RawSnapshot {
              id:              row.get(0)?,
              fed:             row.get(1)?,
              title:           row.get(2)?,
              number_of_games: row.get(3)?,
              activity_status: row.get(4)?,
              rating:          row.get(5)?,
              ongoing_date:    row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSnapshot::into_snapshot).collect()
  }

  async fn latest_observation(&self) -> Result<Option<NaiveDate>> {
    let latest: Option<String> = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(
          "SELECT MAX(ongoing_date) FROM monthlyupdates",
          [],
          |r| r.get(0),
        )?)
      })
      .await?;

    latest.as_deref().map(decode_date).transpose()
  }

  // ── Reference data ────────────────────────────────────────────────────────

  async fn country_codes(&self) -> Result<HashSet<String>> {
    let codes = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT DISTINCT code FROM countries")?;
        let codes = stmt
          .query_map([], |row| row.get::<_, String>(0))?
          .collect::<rusqlite::Result<HashSet<_>>>()?;
        Ok(codes)
      })
      .await?;
    Ok(codes)
  }

  async fn load_countries(&self, countries: &[CountryReference]) -> Result<usize> {
    let rows = countries.to_vec();

    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO countries (code, country, subregion, continent)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (code) DO UPDATE SET
               country   = excluded.country,
               subregion = excluded.subregion,
               continent = excluded.continent",
          )?;
          for c in &rows {
            stmt.execute(rusqlite::params![c.code, c.country, c.subregion, c.continent])?;
          }
        }
        tx.commit()?;
        Ok(rows.len())
      })
      .await?;
    Ok(written)
  }

  // ── Derived view ──────────────────────────────────────────────────────────

  async fn refresh_age_groups(&self) -> Result<()> {
    let rows = self
      .conn
      .call(|conn| {
        let tx = conn.transaction()?;
        tx.execute_batch(REFRESH_AGE_GROUPS)?;
        let rows: i64 = tx.query_row(
          &format!("SELECT COUNT(*) FROM {AGE_GROUP_VIEW}"),
          [],
          |r| r.get(0),
        )?;
        tx.commit()?;
        Ok(rows)
      })
      .await?;

    tracing::debug!(rows, view = AGE_GROUP_VIEW, "age-group view rebuilt");
    Ok(())
  }

  async fn age_group_summary(&self, month: NaiveDate) -> Result<Vec<AgeGroupCount>> {
    let month_str = encode_date(month);

    let raws: Vec<RawAgeGroupCount> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT age_category, COUNT(*)
           FROM {AGE_GROUP_VIEW}
           WHERE ongoing_date = ?1
           GROUP BY age_category"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![month_str], |row| {
            Ok(RawAgeGroupCount {
              age_category: row.get(0)?,
              players:      row.get(1)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut counts = raws
      .into_iter()
      .map(RawAgeGroupCount::into_count)
      .collect::<Result<Vec<_>>>()?;
    counts.sort_by_key(|c| c.group);
    Ok(counts)
  }

  // ── Cardinalities ─────────────────────────────────────────────────────────

  async fn count_players(&self) -> Result<u64> { self.count("players").await }

  async fn count_snapshots(&self) -> Result<u64> {
    self.count("monthlyupdates").await
  }
}
