//! Country reference data loading.

use std::path::Path;

use elolist_core::country::CountryReference;

use crate::{Error, Result};

/// Read `code,country,subregion,continent` rows from any reader. The header
/// row is required. Codes are trimmed and uppercased.
pub fn read_countries<R: std::io::Read>(reader: R) -> Result<Vec<CountryReference>> {
  let mut csv = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
  let mut countries = Vec::new();
  for row in csv.deserialize() {
    let mut country: CountryReference = row?;
    country.code = country.code.to_ascii_uppercase();
    countries.push(country);
  }
  Ok(countries)
}

pub fn read_countries_csv(path: &Path) -> Result<Vec<CountryReference>> {
  let file = std::fs::File::open(path).map_err(|e| Error::io(path, e))?;
  let countries = read_countries(file)?;
  tracing::debug!(path = %path.display(), rows = countries.len(), "countries read");
  Ok(countries)
}
