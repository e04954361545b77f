use crossterm::event::KeyEvent;
use serde::{Deserialize, Serialize};
use strum::Display;
use tui_textarea::TextArea;

use super::{layout::ColumnLayout, table_view::TableView};
use crate::catalog::{Column, ColumnMode, RowSet, TableSchema};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum TabKind {
  #[default]
  Schema,
  Preview,
  Query,
  Results,
}

impl TabKind {
  pub const ORDER: [TabKind; 4] = [TabKind::Schema, TabKind::Preview, TabKind::Query, TabKind::Results];

  fn position(self) -> usize {
    Self::ORDER.iter().position(|&t| t == self).unwrap_or(0)
  }

  pub fn next(self) -> Self {
    Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
  }

  pub fn prev(self) -> Self {
    Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
  }

  pub fn is_tabular(self) -> bool {
    self != TabKind::Query
  }
}

/// A schema column flattened out of the nested field tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaEntry {
  pub path: String,
  pub depth: usize,
  pub column: Column,
}

pub const SCHEMA_HEADERS: [&str; 4] = ["Name", "Type", "Mode", "Description"];

/// Depth-first flattening, parents before their fields.
pub fn flatten_schema(schema: &TableSchema) -> Vec<SchemaEntry> {
  fn walk(columns: &[Column], prefix: Option<&str>, depth: usize, out: &mut Vec<SchemaEntry>) {
    for column in columns {
      let path = match prefix {
        Some(prefix) => format!("{prefix}.{}", column.name),
        None => column.name.clone(),
      };
      out.push(SchemaEntry { path: path.clone(), depth, column: Column { fields: Vec::new(), ..column.clone() } });
      walk(&column.fields, Some(&path), depth + 1, out);
    }
  }
  let mut out = Vec::new();
  walk(&schema.fields, None, 0, &mut out);
  out
}

impl SchemaEntry {
  fn cells(&self) -> Vec<String> {
    vec![
      format!("{}{}", "  ".repeat(self.depth), self.column.name),
      self.column.data_type.clone(),
      self.column.mode.to_string(),
      self.column.description.clone(),
    ]
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ColumnQuery {
  #[strum(to_string = "Select column")]
  Select,
  #[strum(to_string = "Select non-null values")]
  SelectNonNull,
  #[strum(to_string = "Select distinct values")]
  SelectDistinct,
  #[strum(to_string = "Count null values")]
  CountNulls,
  #[strum(to_string = "Count empty arrays")]
  CountEmpty,
}

impl ColumnQuery {
  /// Queries that make sense for a column in the given mode.
  pub fn options_for(mode: ColumnMode) -> Vec<ColumnQuery> {
    let mut options = vec![ColumnQuery::Select, ColumnQuery::SelectNonNull, ColumnQuery::SelectDistinct];
    if mode != ColumnMode::Required {
      options.push(ColumnQuery::CountNulls);
    }
    if mode == ColumnMode::Repeated {
      options.push(ColumnQuery::CountEmpty);
    }
    options
  }

  /// `table` is the fully qualified `project.dataset.table` name.
  pub fn sql(self, table: &str, column: &str) -> String {
    match self {
      ColumnQuery::Select => format!("SELECT {column} FROM `{table}` LIMIT 100"),
      ColumnQuery::SelectNonNull => format!("SELECT {column} FROM `{table}` WHERE {column} IS NOT NULL LIMIT 100"),
      ColumnQuery::SelectDistinct => format!("SELECT DISTINCT {column} FROM `{table}` LIMIT 100"),
      ColumnQuery::CountNulls => format!("SELECT COUNT(*) AS null_count FROM `{table}` WHERE {column} IS NULL"),
      ColumnQuery::CountEmpty => {
        format!("SELECT COUNT(*) AS empty_count FROM `{table}` WHERE ARRAY_LENGTH({column}) = 0")
      },
    }
  }
}

/// Modal list of canned queries for one schema column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDialog {
  pub column: String,
  pub options: Vec<ColumnQuery>,
  pub cursor: usize,
}

impl ColumnDialog {
  pub fn new(entry: &SchemaEntry) -> Self {
    Self { column: entry.path.clone(), options: ColumnQuery::options_for(entry.column.mode), cursor: 0 }
  }

  pub fn up(&mut self) {
    self.cursor = self.cursor.saturating_sub(1);
  }

  pub fn down(&mut self) {
    self.cursor = (self.cursor + 1).min(self.options.len().saturating_sub(1));
  }

  pub fn selected(&self) -> Option<ColumnQuery> {
    self.options.get(self.cursor).copied()
  }
}

/// Multi-line SQL editor. While focused it receives every key except the
/// tab-cycle and escape keys.
pub struct QueryEditor {
  textarea: TextArea<'static>,
  focused: bool,
}

impl Default for QueryEditor {
  fn default() -> Self {
    let mut textarea = TextArea::default();
    textarea.set_placeholder_text("Write a query, Enter to edit, Ctrl-e to run");
    Self { textarea, focused: false }
  }
}

impl QueryEditor {
  pub fn text(&self) -> String {
    self.textarea.lines().join("\n")
  }

  pub fn set_text(&mut self, text: &str) {
    let mut textarea = TextArea::new(text.lines().map(str::to_string).collect());
    textarea.set_placeholder_text("Write a query, Enter to edit, Ctrl-e to run");
    textarea.move_cursor(tui_textarea::CursorMove::Bottom);
    textarea.move_cursor(tui_textarea::CursorMove::End);
    self.textarea = textarea;
  }

  pub fn input(&mut self, key: KeyEvent) {
    self.textarea.input(key);
  }

  pub fn insert_str(&mut self, text: &str) {
    self.textarea.insert_str(text);
  }

  pub fn focus(&mut self) {
    self.focused = true;
  }

  pub fn blur(&mut self) {
    self.focused = false;
  }

  pub fn is_focused(&self) -> bool {
    self.focused
  }

  pub fn textarea(&self) -> &TextArea<'static> {
    &self.textarea
  }
}

/// Tabs of the table detail pane and everything they own.
pub struct DetailPane {
  active: TabKind,
  pub schema: TableView,
  pub preview: TableView,
  pub results: TableView,
  pub editor: QueryEditor,
  pub dialog: Option<ColumnDialog>,
  schema_entries: Vec<SchemaEntry>,
}

impl Default for DetailPane {
  fn default() -> Self {
    Self::new(ColumnLayout::default())
  }
}

impl DetailPane {
  pub fn new(layout: ColumnLayout) -> Self {
    Self {
      active: TabKind::Schema,
      schema: TableView::new(layout),
      preview: TableView::new(layout),
      results: TableView::new(layout),
      editor: QueryEditor::default(),
      dialog: None,
      schema_entries: Vec::new(),
    }
  }

  pub fn set_layout(&mut self, layout: ColumnLayout) {
    self.schema.set_layout(layout);
    self.preview.set_layout(layout);
    self.results.set_layout(layout);
  }

  pub fn active(&self) -> TabKind {
    self.active
  }

  /// Moves one tab along the fixed order, wrapping. Changing tab resets
  /// every tab's cursors, scroll and visual selection; filters are kept.
  pub fn cycle(&mut self, forward: bool) {
    let next = if forward { self.active.next() } else { self.active.prev() };
    self.switch_to(next);
  }

  pub fn switch_to(&mut self, tab: TabKind) {
    if tab == self.active {
      return;
    }
    self.active = tab;
    self.schema.reset_position();
    self.preview.reset_position();
    self.results.reset_position();
    self.editor.blur();
  }

  /// Drops everything tied to the previously selected table. The query text
  /// and query results stay.
  pub fn clear_table(&mut self) {
    self.schema.clear();
    self.preview.clear();
    self.schema_entries.clear();
    self.dialog = None;
  }

  pub fn set_schema(&mut self, schema: &TableSchema) {
    self.schema_entries = flatten_schema(schema);
    let headers = SCHEMA_HEADERS.iter().map(|h| h.to_string()).collect();
    let rows = self.schema_entries.iter().map(SchemaEntry::cells).collect();
    self.schema.set_data(headers, rows);
  }

  pub fn set_preview(&mut self, rows: RowSet) {
    self.preview.set_data(rows.headers, rows.rows);
  }

  pub fn set_results(&mut self, rows: RowSet) {
    self.results.set_data(rows.headers, rows.rows);
  }

  pub fn active_view(&self) -> Option<&TableView> {
    match self.active {
      TabKind::Schema => Some(&self.schema),
      TabKind::Preview => Some(&self.preview),
      TabKind::Results => Some(&self.results),
      TabKind::Query => None,
    }
  }

  pub fn active_view_mut(&mut self) -> Option<&mut TableView> {
    match self.active {
      TabKind::Schema => Some(&mut self.schema),
      TabKind::Preview => Some(&mut self.preview),
      TabKind::Results => Some(&mut self.results),
      TabKind::Query => None,
    }
  }

  pub fn current_schema_entry(&self) -> Option<&SchemaEntry> {
    self.schema.current_row().and_then(|row| self.schema_entries.get(row.source))
  }

  pub fn open_dialog(&mut self) -> bool {
    match self.current_schema_entry().map(ColumnDialog::new) {
      Some(dialog) => {
        self.dialog = Some(dialog);
        true
      },
      None => false,
    }
  }

  /// True when keys are text rather than commands.
  pub fn is_text_entry(&self) -> bool {
    self.editor.is_focused() || self.active_view().is_some_and(TableView::is_filter_editing)
  }

  /// Escape inside the pane, in priority order. Returns false when nothing
  /// consumed it so focus can move back to the browser.
  pub fn escape(&mut self) -> bool {
    if self.editor.is_focused() {
      self.editor.blur();
      return true;
    }
    if let Some(view) = self.active_view_mut() {
      if view.is_filter_editing() {
        view.cancel_filter();
        return true;
      }
    }
    if self.dialog.take().is_some() {
      return true;
    }
    match self.active_view_mut() {
      Some(view) => view.cancel_visual() || view.clear_filter(),
      None => false,
    }
  }

  /// What the copy key puts on the clipboard for the active tab.
  pub fn copy_text(&self) -> Option<String> {
    match self.active {
      TabKind::Schema => {
        let paths: Vec<&str> = self
          .schema
          .selected_rows()
          .into_iter()
          .filter_map(|row| self.schema_entries.get(row.source))
          .map(|entry| entry.path.as_str())
          .collect();
        (!paths.is_empty()).then(|| paths.join("\n"))
      },
      TabKind::Preview | TabKind::Results => {
        let view = if self.active == TabKind::Preview { &self.preview } else { &self.results };
        if view.visual().is_active() {
          let lines: Vec<String> = view.selected_rows().iter().map(|row| row.cells.join("\t")).collect();
          Some(lines.join("\n"))
        } else {
          view.current_cell().map(str::to_string)
        }
      },
      TabKind::Query => {
        let text = self.editor.text();
        (!text.trim().is_empty()).then_some(text)
      },
    }
  }
}
