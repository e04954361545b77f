use super::{
  layout::{ColumnLayout, ColumnWidthPlan, HorizontalViewport},
  list::{CursorMove, Filterable, ListState},
  visual::VisualSelection,
};

/// One displayed row. `source` points back at the entity the row was built
/// from so a filtered row can still be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRow {
  pub cells: Vec<String>,
  pub source: usize,
}

impl Filterable for GridRow {
  fn filter_fields(&self) -> Vec<&str> {
    self.cells.iter().map(String::as_str).collect()
  }
}

impl AsRef<[String]> for GridRow {
  fn as_ref(&self) -> &[String] {
    &self.cells
  }
}

/// Scrollable, filterable grid with a cell cursor and a visual row range.
#[derive(Debug, Clone, Default)]
pub struct TableView {
  headers: Vec<String>,
  rows: ListState<GridRow>,
  col: usize,
  viewport: HorizontalViewport,
  widths: ColumnWidthPlan,
  visual: VisualSelection,
  filter_editing: bool,
  /// Filter text when editing began, restored on cancel.
  filter_at_entry: String,
  view_width: usize,
  layout: ColumnLayout,
}

impl TableView {
  pub fn new(layout: ColumnLayout) -> Self {
    Self { layout, ..Self::default() }
  }

  pub fn set_layout(&mut self, layout: ColumnLayout) {
    self.layout = layout;
    self.recompute_widths();
  }

  pub fn set_data(&mut self, headers: Vec<String>, rows: Vec<Vec<String>>) {
    let rows = rows.into_iter().enumerate().map(|(source, cells)| GridRow { cells, source }).collect();
    self.headers = headers;
    self.rows.set_items(rows);
    self.col = 0;
    self.viewport.reset();
    self.visual.cancel();
    self.recompute_widths();
  }

  pub fn clear(&mut self) {
    self.headers.clear();
    self.rows.clear();
    self.widths.clear();
    self.col = 0;
    self.viewport.reset();
    self.visual.cancel();
  }

  /// Cursors, scroll and visual selection back to the origin. Filter stays.
  pub fn reset_position(&mut self) {
    self.rows.move_cursor(CursorMove::Top);
    self.col = 0;
    self.viewport.reset();
    self.visual.cancel();
    self.filter_editing = false;
  }

  pub fn resize(&mut self, width: usize, height: usize) {
    self.view_width = width;
    self.rows.set_page_size(height);
    self.follow_column();
  }

  pub fn move_row(&mut self, movement: CursorMove) {
    self.rows.move_cursor(movement);
    self.visual.extend_to(self.rows.cursor());
  }

  pub fn move_col(&mut self, delta: isize) {
    let last = self.headers.len().saturating_sub(1);
    self.col = if delta < 0 { self.col.saturating_sub(delta.unsigned_abs()) } else { (self.col + delta as usize).min(last) };
    self.follow_column();
  }

  pub fn first_col(&mut self) {
    self.col = 0;
    self.follow_column();
  }

  pub fn last_col(&mut self) {
    self.col = self.headers.len().saturating_sub(1);
    self.follow_column();
  }

  pub fn toggle_visual(&mut self) {
    if !self.rows.is_empty() || self.visual.is_active() {
      self.visual.toggle(self.rows.cursor());
    }
  }

  pub fn cancel_visual(&mut self) -> bool {
    let was_active = self.visual.is_active();
    self.visual.cancel();
    was_active
  }

  pub fn set_filter(&mut self, text: &str) {
    self.rows.set_filter(text);
    self.visual.cancel();
    self.recompute_widths();
  }

  pub fn push_filter_char(&mut self, c: char) {
    let text = format!("{}{c}", self.rows.filter());
    self.set_filter(&text);
  }

  pub fn pop_filter_char(&mut self) {
    let mut text = self.rows.filter().to_string();
    text.pop();
    self.set_filter(&text);
  }

  /// Clears a non-empty filter. Returns false if there was nothing to clear.
  pub fn clear_filter(&mut self) -> bool {
    if self.rows.filter().is_empty() {
      return false;
    }
    self.set_filter("");
    true
  }

  pub fn begin_filter(&mut self) {
    self.filter_editing = true;
    self.filter_at_entry = self.rows.filter().to_string();
  }

  pub fn submit_filter(&mut self) {
    self.filter_editing = false;
  }

  /// Leaves filter editing, putting back the filter it started from.
  pub fn cancel_filter(&mut self) {
    self.filter_editing = false;
    let entry = std::mem::take(&mut self.filter_at_entry);
    if self.rows.filter() != entry {
      self.set_filter(&entry);
    }
  }

  pub fn is_filter_editing(&self) -> bool {
    self.filter_editing
  }

  pub fn filter(&self) -> &str {
    self.rows.filter()
  }

  pub fn headers(&self) -> &[String] {
    &self.headers
  }

  pub fn rows(&self) -> &ListState<GridRow> {
    &self.rows
  }

  pub fn widths(&self) -> &[usize] {
    &self.widths
  }

  pub fn col(&self) -> usize {
    self.col
  }

  pub fn row(&self) -> usize {
    self.rows.cursor()
  }

  pub fn h_offset(&self) -> usize {
    self.viewport.offset
  }

  pub fn visual(&self) -> &VisualSelection {
    &self.visual
  }

  pub fn current_row(&self) -> Option<&GridRow> {
    self.rows.current()
  }

  pub fn current_cell(&self) -> Option<&str> {
    self.rows.current().and_then(|row| row.cells.get(self.col)).map(String::as_str)
  }

  /// Rows in the visual range, or just the cursor row when no range is active.
  pub fn selected_rows(&self) -> Vec<&GridRow> {
    match self.visual.range() {
      Some((lo, hi)) => (lo..=hi).filter_map(|pos| self.rows.get(pos)).collect(),
      None => self.rows.current().into_iter().collect(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.headers.is_empty()
  }

  fn recompute_widths(&mut self) {
    self.widths = self.layout.compute_widths(&self.headers, self.rows.visible_items());
    self.follow_column();
  }

  fn follow_column(&mut self) {
    if self.view_width > 0 {
      self.viewport.follow(&self.widths, self.col, self.view_width);
    }
  }
}
