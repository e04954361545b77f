//! Column sizing and horizontal scrolling for tabular views.
//!
//! Columns are laid out left to right separated by a single space, so a
//! column `i` spans `[start_i, start_i + width_i)` in the virtual row.

pub const COLUMN_SEPARATOR: usize = 1;
pub const ELLIPSIS: char = '…';

/// Per-column display widths, one entry per header.
pub type ColumnWidthPlan = Vec<usize>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
  pub min_width: usize,
  pub max_width: usize,
}

impl Default for ColumnLayout {
  fn default() -> Self {
    Self { min_width: 8, max_width: 30 }
  }
}

impl ColumnLayout {
  pub fn new(min_width: usize, max_width: usize) -> Self {
    Self { min_width, max_width: max_width.max(min_width) }
  }

  /// `clamp(max(len(header), len(cell) for every row), min, max)` per column.
  pub fn compute_widths<I, R>(&self, headers: &[String], rows: I) -> ColumnWidthPlan
  where
    I: IntoIterator<Item = R>,
    R: AsRef<[String]>,
  {
    let mut widths: Vec<usize> = headers.iter().map(|h| display_len(h)).collect();
    for row in rows {
      for (width, cell) in widths.iter_mut().zip(row.as_ref().iter()) {
        *width = (*width).max(display_len(cell));
      }
    }
    widths.into_iter().map(|w| w.clamp(self.min_width, self.max_width)).collect()
  }
}

pub fn display_len(text: &str) -> usize {
  text.chars().count()
}

/// `[start, end)` of a column in the virtual row.
pub fn column_span(plan: &[usize], col: usize) -> (usize, usize) {
  let start: usize = plan.iter().take(col).map(|w| w + COLUMN_SEPARATOR).sum();
  let width = plan.get(col).copied().unwrap_or(0);
  (start, start + width)
}

pub fn total_width(plan: &[usize]) -> usize {
  match plan.len() {
    0 => 0,
    n => plan.iter().sum::<usize>() + (n - 1) * COLUMN_SEPARATOR,
  }
}

/// Smallest change to `offset` that brings column `col` fully into a
/// viewport of `width` cells. The first column pins to 0 and the last to its
/// right edge, even when already visible. A column wider than the viewport
/// is aligned to its left edge.
pub fn scroll_to_show_column(plan: &[usize], col: usize, width: usize, offset: usize) -> usize {
  if plan.is_empty() || width == 0 {
    return 0;
  }
  let col = col.min(plan.len() - 1);
  let (start, end) = column_span(plan, col);

  if col == 0 {
    return 0;
  }
  if col == plan.len() - 1 && end - start <= width {
    return end.saturating_sub(width);
  }
  if start >= offset && end <= offset + width {
    return offset;
  }
  if start < offset || end - start >= width {
    start
  } else {
    end - width
  }
}

/// Horizontal scroll position of a tabular view.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HorizontalViewport {
  pub offset: usize,
}

impl HorizontalViewport {
  /// Scrolls just enough to keep column `col` in a viewport `width` wide.
  pub fn follow(&mut self, plan: &[usize], col: usize, width: usize) {
    self.offset = scroll_to_show_column(plan, col, width, self.offset);
  }

  pub fn reset(&mut self) {
    self.offset = 0;
  }
}

/// A column clipped to the viewport: which column, where it starts on
/// screen, how many of its cells are shown and how many are cut on the left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleColumn {
  pub index: usize,
  pub x: usize,
  pub width: usize,
  pub skip: usize,
}

pub fn visible_columns(plan: &[usize], offset: usize, width: usize) -> Vec<VisibleColumn> {
  let view_end = offset + width;
  let mut columns = Vec::new();
  for (index, _) in plan.iter().enumerate() {
    let (start, end) = column_span(plan, index);
    if end <= offset || start >= view_end {
      continue;
    }
    let shown_start = start.max(offset);
    let shown_end = end.min(view_end);
    columns.push(VisibleColumn { index, x: shown_start - offset, width: shown_end - shown_start, skip: shown_start - start });
  }
  columns
}

/// Fits `text` into `width` cells, replacing the tail with an ellipsis when
/// it does not fit.
pub fn truncate(text: &str, width: usize) -> String {
  if display_len(text) <= width {
    return text.to_string();
  }
  if width == 0 {
    return String::new();
  }
  let mut out: String = text.chars().take(width - 1).collect();
  out.push(ELLIPSIS);
  out
}

/// Renders a cell for a clipped column: truncate to the full column width,
/// pad, then cut `skip` leading cells and keep `shown`.
pub fn clip_cell(text: &str, column_width: usize, skip: usize, shown: usize) -> String {
  let fitted = format!("{:<column_width$}", truncate(text, column_width));
  fitted.chars().skip(skip).take(shown).collect()
}
