//! Country reference data.

use serde::{Deserialize, Serialize};

/// A row of the read-only `countries` table.
///
/// Federation codes in snapshots are expected to resolve to one of these
/// codes once legacy aliases have been remapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryReference {
  pub code:      String,
  pub country:   String,
  pub subregion: String,
  pub continent: String,
}
