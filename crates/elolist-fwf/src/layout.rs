//! Column layouts of the monthly rating list.

/// A fixed-width layout: the byte width of every column, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
  pub version: u32,
  pub widths:  &'static [usize],
}

/// The 13-column layout of the standard rating list.
///
/// ```text
/// ID Number | Name | Fed | Sex | Tit | WTit | OTit | FOA | <mmmYY> | Gms | K | B-day | Flag
///        15 |   61 |   4 |   3 |   6 |    4 |   15 |   5 |       6 |   4 | 3 |     5 |    7
/// ```
pub const LAYOUT_V1: Layout = Layout {
  version: 1,
  widths:  &[15, 61, 4, 3, 6, 4, 15, 5, 6, 4, 3, 5, 7],
};

impl Layout {
  pub fn columns(&self) -> usize { self.widths.len() }

  /// Total line width in bytes.
  pub fn total_width(&self) -> usize { self.widths.iter().sum() }

  /// Byte ranges of every column.
  pub fn spans(&self) -> Vec<(usize, usize)> {
    let mut start = 0;
    self
      .widths
      .iter()
      .map(|w| {
        let span = (start, start + w);
        start += w;
        span
      })
      .collect()
  }

  /// Render `cells` as one fixed-width line, padding each cell to its column
  /// width and cutting anything longer. Missing trailing cells are blank;
  /// trailing whitespace is trimmed.
  pub fn render(&self, cells: &[&str]) -> String {
    let mut line = String::with_capacity(self.total_width());
    for (i, width) in self.widths.iter().enumerate() {
      let cell = cells.get(i).copied().unwrap_or("");
      let mut used = 0;
      for c in cell.chars() {
        if used + c.len_utf8() > *width {
          break;
        }
        line.push(c);
        used += c.len_utf8();
      }
      line.extend(std::iter::repeat_n(' ', width - used));
    }
    line.truncate(line.trim_end().len());
    line
  }
}

// Header names of the retained columns.
pub const COL_ID: &str = "ID Number";
pub const COL_NAME: &str = "Name";
pub const COL_FED: &str = "Fed";
pub const COL_SEX: &str = "Sex";
pub const COL_TITLE: &str = "Tit";
pub const COL_GAMES: &str = "Gms";
pub const COL_BIRTH_YEAR: &str = "B-day";
pub const COL_FLAG: &str = "Flag";

/// Retained columns other than the rating column, which is found by shape.
pub const RETAINED: [&str; 8] = [
  COL_ID,
  COL_NAME,
  COL_FED,
  COL_SEX,
  COL_TITLE,
  COL_GAMES,
  COL_BIRTH_YEAR,
  COL_FLAG,
];
