//! Top-N selection per federation.

use std::collections::BTreeMap;

use elolist_core::player::PlayerRecord;

/// Keep the `n` highest-rated records of every federation.
///
/// Groups come out in ascending federation order, each sorted by descending
/// rating. The sort is stable, so players with equal ratings keep their input
/// order and re-runs select the same rows.
pub fn top_n_per_federation(records: Vec<PlayerRecord>, n: usize) -> Vec<PlayerRecord> {
  let mut groups: BTreeMap<String, Vec<PlayerRecord>> = BTreeMap::new();
  for record in records {
    groups.entry(record.federation.clone()).or_default().push(record);
  }

  let mut selected = Vec::new();
  for (federation, mut group) in groups {
    let available = group.len();
    group.sort_by(|a, b| b.rating.cmp(&a.rating));
    group.truncate(n);
    tracing::trace!(%federation, available, kept = group.len(), "federation ranked");
    selected.extend(group);
  }

  tracing::info!(rows = selected.len(), per_federation = n, "top players selected");
  selected
}
