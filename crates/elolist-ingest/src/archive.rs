//! Staging directory handling: input discovery, zip extraction, archiving.

use std::{
  fs,
  path::{Path, PathBuf},
};

use chrono::NaiveDate;

use crate::{Error, Result};

// ─── Discovery ───────────────────────────────────────────────────────────────

/// The monthly download found in the staging directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagedInput {
  /// A zip archive and the text list it unpacks to.
  Zip { archive: PathBuf, text: PathBuf },
  /// A bare text list.
  Text(PathBuf),
}

impl StagedInput {
  /// The file the parser reads.
  pub fn text(&self) -> &Path {
    match self {
      Self::Zip { text, .. } => text,
      Self::Text(text) => text,
    }
  }
}

fn has_extension(path: &Path, extension: &str) -> bool {
  path
    .extension()
    .and_then(|e| e.to_str())
    .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

/// Regular files in `dir` with `extension`, sorted by name.
fn files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
  let mut found = Vec::new();
  for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
    let path = entry.map_err(|e| Error::io(dir, e))?.path();
    if path.is_file() && has_extension(&path, extension) {
      found.push(path);
    }
  }
  found.sort();
  Ok(found)
}

fn names(paths: &[PathBuf]) -> Vec<String> {
  paths
    .iter()
    .map(|p| p.file_name().unwrap_or_default().to_string_lossy().into_owned())
    .collect()
}

/// Find the single rating list in `staging`.
///
/// One `.zip` wins over any `.txt` files (the text is expected to be its
/// extracted content). Without a zip there must be exactly one `.txt`.
pub fn discover(staging: &Path) -> Result<StagedInput> {
  let zips = files_with_extension(staging, "zip")?;
  match zips.as_slice() {
    [archive] => {
      let stem = archive.file_stem().unwrap_or_default();
      let text = staging.join(stem).with_extension("txt");
      return Ok(StagedInput::Zip { archive: archive.clone(), text });
    }
    [] => {}
    _ => {
      return Err(Error::AmbiguousInput {
        dir:   staging.to_path_buf(),
        found: names(&zips),
      });
    }
  }

  let texts = files_with_extension(staging, "txt")?;
  match texts.as_slice() {
    [text] => Ok(StagedInput::Text(text.clone())),
    [] => Err(Error::NoInput(staging.to_path_buf())),
    _ => Err(Error::AmbiguousInput {
      dir:   staging.to_path_buf(),
      found: names(&texts),
    }),
  }
}

// ─── Extraction ──────────────────────────────────────────────────────────────

/// Unpack `archive` into `dir` and check that `expected` now exists.
pub fn extract_zip(archive: &Path, dir: &Path, expected: &Path) -> Result<()> {
  let file = fs::File::open(archive).map_err(|e| Error::io(archive, e))?;
  let mut zip = zip::ZipArchive::new(file)?;
  let entries = zip.len();
  zip.extract(dir)?;
  tracing::info!(archive = %archive.display(), entries, "archive extracted");

  if !expected.is_file() {
    return Err(Error::MissingExtractedFile {
      archive:  archive.to_path_buf(),
      expected: expected.to_path_buf(),
    });
  }
  Ok(())
}

// ─── Archiving ───────────────────────────────────────────────────────────────

/// `<base>/<YYYY-MM>` for the list observed on `period`.
pub fn dated_dir(base: &Path, period: NaiveDate) -> PathBuf {
  base.join(period.format("%Y-%m").to_string())
}

fn move_file(from: &Path, to: &Path) -> Result<()> {
  if fs::rename(from, to).is_ok() {
    return Ok(());
  }
  // Rename fails across filesystems.
  fs::copy(from, to).map_err(|e| Error::io(to, e))?;
  fs::remove_file(from).map_err(|e| Error::io(from, e))
}

/// Move every `extension` file from `source` into `<destination>/<YYYY-MM>`
/// and return the new paths.
///
/// `destination` itself must already exist; the dated folder under it is
/// created on demand. An existing file of the same name is overwritten.
pub fn move_files(
  source: &Path,
  destination: &Path,
  period: NaiveDate,
  extension: &str,
) -> Result<Vec<PathBuf>> {
  if !destination.is_dir() {
    return Err(Error::MissingDestination(destination.to_path_buf()));
  }
  let files = files_with_extension(source, extension)?;
  if files.is_empty() {
    return Ok(Vec::new());
  }

  let target = dated_dir(destination, period);
  fs::create_dir_all(&target).map_err(|e| Error::io(&target, e))?;

  let mut moved = Vec::with_capacity(files.len());
  for file in files {
    let to = target.join(file.file_name().unwrap_or_default());
    move_file(&file, &to)?;
    tracing::info!(from = %file.display(), to = %to.display(), "file archived");
    moved.push(to);
  }
  Ok(moved)
}
