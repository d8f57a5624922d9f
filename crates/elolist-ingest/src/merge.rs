//! Idempotent two-table merge of a normalized batch.
//!
//! Identities and snapshots are merged independently. Each table is a
//! set-difference against what the store already holds followed by one
//! transactional insert, so a second run over the same batch writes nothing.

use std::collections::HashSet;

use chrono::NaiveDate;
use elolist_core::{
  player::{MonthlySnapshot, PlayerIdentity, PlayerRecord},
  store::RatingStore,
};
use serde::Serialize;

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// What happened to one table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableMerge {
  pub table:           &'static str,
  /// Distinct keys offered by the batch.
  pub candidates:      usize,
  pub already_present: usize,
  pub inserted:        usize,
  /// Set when the read or the insert failed; nothing was written.
  pub failure:         Option<String>,
}

impl TableMerge {
  fn new(table: &'static str) -> Self {
    Self { table, ..Default::default() }
  }

  fn fail(&mut self, error: &dyn std::error::Error) {
    tracing::error!(
      table = self.table,
      rows = self.candidates - self.already_present,
      error = %error,
      "merge failed; batch rolled back"
    );
    self.failure = Some(error.to_string());
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeOutcome {
  pub players:   TableMerge,
  pub snapshots: TableMerge,
}

impl MergeOutcome {
  pub fn is_complete(&self) -> bool {
    self.players.failure.is_none() && self.snapshots.failure.is_none()
  }
}

// ─── Merge ───────────────────────────────────────────────────────────────────

/// Merge `batch` into `store`. Never returns an error: a failing table is
/// recorded in its [`TableMerge`] and the other table is still attempted.
pub async fn merge_batch<S: RatingStore>(store: &S, batch: &[PlayerRecord]) -> MergeOutcome {
  MergeOutcome {
    players:   merge_players(store, batch).await,
    snapshots: merge_snapshots(store, batch).await,
  }
}

async fn merge_players<S: RatingStore>(store: &S, batch: &[PlayerRecord]) -> TableMerge {
  let mut merge = TableMerge::new("players");

  let mut seen = HashSet::new();
  let identities: Vec<PlayerIdentity> = batch
    .iter()
    .filter(|r| seen.insert(r.id))
    .map(PlayerRecord::identity)
    .collect();
  merge.candidates = identities.len();

  let existing = match store.player_ids().await {
    Ok(ids) => ids,
    Err(e) => {
      merge.fail(&e);
      return merge;
    }
  };
  let fresh: Vec<PlayerIdentity> = identities
    .into_iter()
    .filter(|p| !existing.contains(&p.id))
    .collect();
  merge.already_present = merge.candidates - fresh.len();

  if fresh.is_empty() {
    tracing::info!(table = merge.table, "no new players");
    return merge;
  }
  match store.insert_players(&fresh).await {
    Ok(n) => {
      merge.inserted = n;
      tracing::info!(table = merge.table, rows = n, "players inserted");
    }
    Err(e) => merge.fail(&e),
  }
  merge
}

async fn merge_snapshots<S: RatingStore>(store: &S, batch: &[PlayerRecord]) -> TableMerge {
  let mut merge = TableMerge::new("monthlyupdates");

  let mut seen = HashSet::new();
  let snapshots: Vec<MonthlySnapshot> = batch
    .iter()
    .filter(|r| seen.insert((r.id, r.observed_on)))
    .map(PlayerRecord::snapshot)
    .collect();
  merge.candidates = snapshots.len();

  let mut months: Vec<NaiveDate> = snapshots.iter().map(|s| s.observed_on).collect();
  months.sort_unstable();
  months.dedup();

  let existing = match store.snapshot_keys(&months).await {
    Ok(keys) => keys,
    Err(e) => {
      merge.fail(&e);
      return merge;
    }
  };
  let fresh: Vec<MonthlySnapshot> = snapshots
    .into_iter()
    .filter(|s| !existing.contains(&s.key()))
    .collect();
  merge.already_present = merge.candidates - fresh.len();

  if fresh.is_empty() {
    tracing::info!(table = merge.table, "no new monthly snapshots");
    return merge;
  }
  match store.insert_snapshots(&fresh).await {
    Ok(n) => {
      merge.inserted = n;
      tracing::info!(table = merge.table, rows = n, "monthly snapshots inserted");
    }
    Err(e) => merge.fail(&e),
  }
  merge
}
