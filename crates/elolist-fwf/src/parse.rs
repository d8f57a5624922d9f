//! Fixed-width rating-list parser.
//!
//! Pipeline:
//!   raw bytes
//!     └─ split_lines()       → Vec<(line number, &[u8])>
//!          └─ resolve_header()  → HeaderMap (retained column indices)
//!               └─ slice_line()    → Vec<Option<String>>
//!                    └─ RawRow

use elolist_core::period::{looks_like_period, parse_period};

use crate::{
  RatingList, RawRow,
  error::{Error, Result},
  layout::{
    COL_BIRTH_YEAR, COL_FED, COL_FLAG, COL_GAMES, COL_ID, COL_NAME, COL_SEX,
    COL_TITLE, Layout, RETAINED,
  },
};

// ─── Header ──────────────────────────────────────────────────────────────────

/// Column indices of the retained fields, resolved from the header line.
struct HeaderMap {
  id:            usize,
  name:          usize,
  federation:    usize,
  sex:           usize,
  title:         usize,
  games:         usize,
  birth_year:    usize,
  flag:          usize,
  rating:        usize,
  rating_header: String,
}

fn resolve_header(cells: &[Option<String>]) -> Result<HeaderMap> {
  let find = |name: &'static str| -> Result<usize> {
    cells
      .iter()
      .position(|c| c.as_deref() == Some(name))
      .ok_or(Error::MissingColumn(name))
  };

  // Fail on the first missing column in declaration order.
  for name in RETAINED {
    find(name)?;
  }

  let period_columns: Vec<(usize, String)> = cells
    .iter()
    .enumerate()
    .filter_map(|(i, c)| c.as_ref().map(|c| (i, c)))
    .filter(|(_, c)| looks_like_period(c))
    .map(|(i, c)| (i, c.clone()))
    .collect();

  let (rating, rating_header) = match period_columns.as_slice() {
    [] => return Err(Error::MissingRatingColumn),
    [single] => single.clone(),
    many => {
      return Err(Error::AmbiguousRatingColumn(
        many.iter().map(|(_, h)| h.clone()).collect(),
      ));
    }
  };

  Ok(HeaderMap {
    id: find(COL_ID)?,
    name: find(COL_NAME)?,
    federation: find(COL_FED)?,
    sex: find(COL_SEX)?,
    title: find(COL_TITLE)?,
    games: find(COL_GAMES)?,
    birth_year: find(COL_BIRTH_YEAR)?,
    flag: find(COL_FLAG)?,
    rating,
    rating_header,
  })
}

// ─── Low-level helpers
// ────────────────────────────────────────────────────────

/// Split on LF, strip a trailing CR, drop blank lines. Line numbers are
/// 1-based and count blank lines.
pub(crate) fn split_lines(input: &[u8]) -> Vec<(usize, &[u8])> {
  input
    .split(|b| *b == b'\n')
    .enumerate()
    .map(|(i, line)| (i + 1, line.strip_suffix(b"\r").unwrap_or(line)))
    .filter(|(_, line)| !line.iter().all(u8::is_ascii_whitespace))
    .collect()
}

fn content_width(line: &[u8]) -> usize {
  line
    .iter()
    .rposition(|b| !b.is_ascii_whitespace())
    .map_or(0, |p| p + 1)
}

/// Cut `line` into the layout's columns. Bytes past the end of a short line
/// are blank; blank cells become `None`.
fn slice_line(
  layout: &Layout,
  line_no: usize,
  line: &[u8],
) -> Result<Vec<Option<String>>> {
  let width = content_width(line);
  if width > layout.total_width() {
    return Err(Error::LayoutMismatch {
      line:     line_no,
      expected: layout.total_width(),
      found:    width,
      columns:  layout.columns(),
    });
  }

  Ok(
    layout
      .spans()
      .into_iter()
      .map(|(start, end)| {
        let start = start.min(line.len());
        let end = end.min(line.len());
        let cell = String::from_utf8_lossy(&line[start..end]);
        let cell = cell.trim();
        (!cell.is_empty()).then(|| cell.to_owned())
      })
      .collect(),
  )
}

// ─── Parser ──────────────────────────────────────────────────────────────────

pub(crate) fn parse_list(layout: Layout, input: &[u8]) -> Result<RatingList> {
  let lines = split_lines(input);
  let Some(((header_no, header_line), body)) = lines.split_first() else {
    return Err(Error::Empty);
  };

  let header_cells = slice_line(&layout, *header_no, header_line)?;
  let header = resolve_header(&header_cells)?;
  let period = parse_period(&header.rating_header)?;

  let mut rows = Vec::with_capacity(body.len());
  for (line_no, line) in body {
    let mut cells = slice_line(&layout, *line_no, line)?;
    let mut take = |i: usize| cells[i].take();
    rows.push(RawRow {
      line:       *line_no,
      id:         take(header.id),
      name:       take(header.name),
      federation: take(header.federation),
      sex:        take(header.sex),
      title:      take(header.title),
      games:      take(header.games),
      birth_year: take(header.birth_year),
      flag:       take(header.flag),
      rating:     take(header.rating),
    });
  }

  tracing::debug!(
    rows = rows.len(),
    rating_column = %header.rating_header,
    %period,
    "rating list parsed"
  );

  Ok(RatingList {
    layout,
    period,
    rating_column: header.rating_header,
    rows,
  })
}
