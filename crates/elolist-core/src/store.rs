//! The `RatingStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `elolist-store-sqlite`).
//! The ingestion pipeline depends on this abstraction, not on any concrete
//! backend.

use std::{collections::HashSet, future::Future};

use chrono::NaiveDate;

use crate::{
  age::AgeGroupCount,
  country::CountryReference,
  player::{MonthlySnapshot, PlayerIdentity, SnapshotKey},
};

/// Abstraction over an elolist store backend.
///
/// Player identities and monthly snapshots are insert-only: no method updates
/// or deletes a row once written. Set-difference against existing keys is the
/// caller's job; the `insert_*` methods write exactly what they are given,
/// each call in its own transaction.
///
/// All methods return `Send` futures so the trait can be used from a
/// multi-threaded tokio runtime.
pub trait RatingStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Identities ────────────────────────────────────────────────────────

  /// Every player id already persisted.
  fn player_ids(
    &self,
  ) -> impl Future<Output = Result<HashSet<u32>, Self::Error>> + Send + '_;

  /// Insert `players` in one transaction and return the number written.
  /// Any failure rolls back the whole batch.
  fn insert_players<'a>(
    &'a self,
    players: &'a [PlayerIdentity],
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;

  // ── Snapshots ─────────────────────────────────────────────────────────

  /// Existing snapshot keys whose observation date is one of `months`.
  fn snapshot_keys<'a>(
    &'a self,
    months: &'a [NaiveDate],
  ) -> impl Future<Output = Result<HashSet<SnapshotKey>, Self::Error>> + Send + 'a;

  /// Insert `snapshots` in one transaction and return the number written.
  fn insert_snapshots<'a>(
    &'a self,
    snapshots: &'a [MonthlySnapshot],
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;

  /// Every snapshot observed on `month`, ordered by federation then
  /// descending rating.
  fn snapshots_for(
    &self,
    month: NaiveDate,
  ) -> impl Future<Output = Result<Vec<MonthlySnapshot>, Self::Error>> + Send + '_;

  /// Most recent observation date, or `None` for an empty store.
  fn latest_observation(
    &self,
  ) -> impl Future<Output = Result<Option<NaiveDate>, Self::Error>> + Send + '_;

  // ── Reference data ────────────────────────────────────────────────────

  /// Every known country code.
  fn country_codes(
    &self,
  ) -> impl Future<Output = Result<HashSet<String>, Self::Error>> + Send + '_;

  /// Insert or replace reference rows. Operator command only; the monthly
  /// pipeline never writes reference data.
  fn load_countries<'a>(
    &'a self,
    countries: &'a [CountryReference],
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;

  // ── Derived view ──────────────────────────────────────────────────────

  /// Recompute the age-group view from scratch. Blocking, full refresh.
  fn refresh_age_groups(
    &self,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Player counts per age group for one observation month, read from the
  /// derived view. Groups with no players are omitted.
  fn age_group_summary(
    &self,
    month: NaiveDate,
  ) -> impl Future<Output = Result<Vec<AgeGroupCount>, Self::Error>> + Send + '_;

  // ── Cardinalities ─────────────────────────────────────────────────────

  fn count_players(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  fn count_snapshots(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
