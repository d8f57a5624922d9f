//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use elolist_core::{
  age::AgeGroup,
  country::CountryReference,
  player::{ActivityStatus, MonthlySnapshot, PlayerIdentity, SnapshotKey, Title},
  store::RatingStore,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn month(y: i32, m: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, 1).unwrap() }

fn player(id: u32, birth_year: u16) -> PlayerIdentity {
  PlayerIdentity {
    id,
    name: format!("Player {id}"),
    sex: "M".into(),
    birth_year,
  }
}

fn snapshot(id: u32, federation: &str, rating: u16, observed_on: NaiveDate) -> MonthlySnapshot {
  MonthlySnapshot {
    id,
    federation: federation.into(),
    title: Title::Gm,
    games: 4,
    activity: ActivityStatus::Active,
    rating,
    observed_on,
  }
}

// ─── Identities ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_store_has_no_ids() {
  let s = store().await;
  assert!(s.player_ids().await.unwrap().is_empty());
  assert_eq!(s.count_players().await.unwrap(), 0);
  assert_eq!(s.latest_observation().await.unwrap(), None);
}

#[tokio::test]
async fn insert_and_list_player_ids() {
  let s = store().await;
  let n = s
    .insert_players(&[player(1503014, 1990), player(2016192, 1987)])
    .await
    .unwrap();
  assert_eq!(n, 2);

  let ids = s.player_ids().await.unwrap();
  assert_eq!(ids.len(), 2);
  assert!(ids.contains(&1503014));
  assert!(ids.contains(&2016192));
}

#[tokio::test]
async fn duplicate_player_rolls_back_whole_batch() {
  let s = store().await;
  s.insert_players(&[player(100001, 1990)]).await.unwrap();

  let result = s
    .insert_players(&[player(100002, 1991), player(100001, 1990)])
    .await;
  assert!(result.is_err());

  // 100002 was in the failed transaction and must not have landed.
  let ids = s.player_ids().await.unwrap();
  assert_eq!(ids.len(), 1);
  assert!(!ids.contains(&100002));
}

// ─── Snapshots ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn snapshot_keys_are_scoped_to_months() {
  let s = store().await;
  s.insert_players(&[player(100001, 1990), player(100002, 1985)])
    .await
    .unwrap();
  s.insert_snapshots(&[
    snapshot(100001, "NOR", 2800, month(2024, 8)),
    snapshot(100001, "NOR", 2810, month(2024, 9)),
    snapshot(100002, "USA", 2700, month(2024, 9)),
  ])
  .await
  .unwrap();

  let sep = s.snapshot_keys(&[month(2024, 9)]).await.unwrap();
  assert_eq!(sep.len(), 2);
  assert!(sep.contains(&SnapshotKey { id: 100001, observed_on: month(2024, 9) }));
  assert!(!sep.contains(&SnapshotKey { id: 100001, observed_on: month(2024, 8) }));

  let both = s
    .snapshot_keys(&[month(2024, 8), month(2024, 9)])
    .await
    .unwrap();
  assert_eq!(both.len(), 3);

  assert_eq!(s.latest_observation().await.unwrap(), Some(month(2024, 9)));
}

#[tokio::test]
async fn snapshot_requires_known_player() {
  let s = store().await;
  let result = s
    .insert_snapshots(&[snapshot(999999, "NOR", 2500, month(2024, 9))])
    .await;
  assert!(result.is_err());
  assert_eq!(s.count_snapshots().await.unwrap(), 0);
}

#[tokio::test]
async fn snapshot_fields_round_trip() {
  let s = store().await;
  s.insert_players(&[player(100001, 1990)]).await.unwrap();

  let mut original = snapshot(100001, "DEU", 2612, month(2025, 1));
  original.title = Title::Other("AGM".into());
  original.activity = ActivityStatus::Inactive;
  s.insert_snapshots(std::slice::from_ref(&original)).await.unwrap();

  let stored = s.snapshots_for(month(2025, 1)).await.unwrap();
  assert_eq!(stored, vec![original]);
}

#[tokio::test]
async fn snapshots_for_orders_by_federation_then_rating() {
  let s = store().await;
  s.insert_players(&[player(1, 1990), player(2, 1990), player(3, 1990)])
    .await
    .unwrap();
  s.insert_snapshots(&[
    snapshot(1, "USA", 2500, month(2024, 9)),
    snapshot(2, "USA", 2700, month(2024, 9)),
    snapshot(3, "ARM", 2600, month(2024, 9)),
  ])
  .await
  .unwrap();

  let ids: Vec<u32> = s
    .snapshots_for(month(2024, 9))
    .await
    .unwrap()
    .into_iter()
    .map(|s| s.id)
    .collect();
  assert_eq!(ids, vec![3, 2, 1]);
}

// ─── Reference data ──────────────────────────────────────────────────────────

#[tokio::test]
async fn load_countries_upserts() {
  let s = store().await;
  let deu = CountryReference {
    code:      "DEU".into(),
    country:   "Germany".into(),
    subregion: "Western Europe".into(),
    continent: "Europe".into(),
  };
  assert_eq!(s.load_countries(std::slice::from_ref(&deu)).await.unwrap(), 1);

  let renamed = CountryReference { country: "Deutschland".into(), ..deu };
  s.load_countries(&[renamed]).await.unwrap();

  let codes = s.country_codes().await.unwrap();
  assert_eq!(codes.len(), 1);
  assert!(codes.contains("DEU"));
}

// ─── Derived view ────────────────────────────────────────────────────────────

#[tokio::test]
async fn refresh_buckets_players_by_age() {
  let s = store().await;
  s.insert_players(&[
    player(1, 2010), // 14
    player(2, 1995), // 29
    player(3, 1958), // 66
    player(4, 1990), // 34
  ])
  .await
  .unwrap();
  s.insert_snapshots(&[
    snapshot(1, "IND", 2400, month(2024, 9)),
    snapshot(2, "IND", 2500, month(2024, 9)),
    snapshot(3, "IND", 2450, month(2024, 9)),
    snapshot(4, "IND", 2550, month(2024, 8)),
  ])
  .await
  .unwrap();

  // Nothing is visible before the refresh.
  assert!(s.age_group_summary(month(2024, 9)).await.unwrap().is_empty());

  s.refresh_age_groups().await.unwrap();

  let summary = s.age_group_summary(month(2024, 9)).await.unwrap();
  let groups: Vec<(AgeGroup, u32)> =
    summary.iter().map(|c| (c.group, c.players)).collect();
  assert_eq!(
    groups,
    vec![
      (AgeGroup::Under19, 1),
      (AgeGroup::From19To30, 1),
      (AgeGroup::Over65, 1),
    ]
  );
}

#[tokio::test]
async fn refresh_is_a_full_recompute() {
  let s = store().await;
  s.insert_players(&[player(1, 1990)]).await.unwrap();
  s.insert_snapshots(&[snapshot(1, "FRA", 2400, month(2024, 9))])
    .await
    .unwrap();

  s.refresh_age_groups().await.unwrap();
  s.refresh_age_groups().await.unwrap();

  let summary = s.age_group_summary(month(2024, 9)).await.unwrap();
  assert_eq!(summary.len(), 1);
  assert_eq!(summary[0].group, AgeGroup::From31To40);
  assert_eq!(summary[0].players, 1);
}
