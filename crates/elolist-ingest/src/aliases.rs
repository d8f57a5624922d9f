//! Federation alias table.
//!
//! The rating list still uses a number of legacy or sporting-body codes
//! (`GER`, `NED`, `SUI`, …) that differ from the codes in the countries
//! reference table. The mapping is versioned reference data kept in
//! `data/federation_aliases.toml`; a copy is compiled in and an operator can
//! point `aliases_path` at a newer file without rebuilding.

use std::{collections::BTreeMap, path::Path};

use serde::Deserialize;

use crate::{Error, Result};

const EMBEDDED: &str = include_str!("../data/federation_aliases.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct FederationAliases {
  pub version: u32,
  aliases:     BTreeMap<String, String>,
}

impl FederationAliases {
  /// The table shipped with this build.
  pub fn embedded() -> Result<Self> { Self::from_toml(EMBEDDED) }

  pub fn from_toml(raw: &str) -> Result<Self> { Ok(toml::from_str(raw)?) }

  pub fn from_path(path: &Path) -> Result<Self> {
    let raw = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    Self::from_toml(&raw)
  }

  /// Load from `path` if given, otherwise fall back to the embedded table.
  pub fn load(path: Option<&Path>) -> Result<Self> {
    let table = match path {
      Some(path) => Self::from_path(path)?,
      None => Self::embedded()?,
    };
    tracing::debug!(
      version = table.version,
      aliases = table.aliases.len(),
      "federation alias table loaded"
    );
    Ok(table)
  }

  pub fn len(&self) -> usize { self.aliases.len() }

  pub fn is_empty(&self) -> bool { self.aliases.is_empty() }

  /// Canonical code for `raw`. Lookup is a single step: the target of an
  /// alias is never itself looked up again.
  pub fn resolve(&self, raw: &str) -> String {
    let code = raw.trim().to_ascii_uppercase();
    match self.aliases.get(&code) {
      Some(canonical) => canonical.clone(),
      None => code,
    }
  }
}
