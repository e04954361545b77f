use super::list::{CursorMove, ListState};
use crate::catalog::{Dataset, Table};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum BrowserLevel {
  #[default]
  Datasets,
  Tables,
}

/// Dataset list and the table list of the opened dataset. Each level keeps
/// its own cursor and filter.
#[derive(Debug, Default, Clone)]
pub struct Browser {
  level: BrowserLevel,
  pub datasets: ListState<Dataset>,
  pub tables: ListState<Table>,
  opened: Option<String>,
}

impl Browser {
  pub fn level(&self) -> BrowserLevel {
    self.level
  }

  /// Dataset whose tables are (or are being) listed.
  pub fn opened_dataset(&self) -> Option<&str> {
    self.opened.as_deref()
  }

  /// Switches to the table level for `dataset`. The old table list is
  /// dropped right away; the new one arrives later.
  pub fn open_dataset(&mut self, dataset: &str) {
    if self.opened.as_deref() != Some(dataset) {
      self.tables.clear();
      self.tables.clear_filter();
    }
    self.opened = Some(dataset.to_string());
    self.level = BrowserLevel::Tables;
  }

  /// Shows the already loaded tables again without refetching.
  pub fn reopen(&mut self) -> bool {
    if self.opened.is_some() {
      self.level = BrowserLevel::Tables;
      return true;
    }
    false
  }

  pub fn back(&mut self) -> bool {
    if self.level == BrowserLevel::Tables {
      self.level = BrowserLevel::Datasets;
      return true;
    }
    false
  }

  pub fn reset(&mut self) {
    self.level = BrowserLevel::Datasets;
    self.opened = None;
    self.datasets.clear();
    self.datasets.clear_filter();
    self.tables.clear();
    self.tables.clear_filter();
  }

  pub fn set_datasets(&mut self, datasets: Vec<Dataset>) {
    self.datasets.set_items(datasets);
  }

  pub fn set_tables(&mut self, tables: Vec<Table>) {
    self.tables.set_items(tables);
  }

  pub fn move_cursor(&mut self, movement: CursorMove) {
    match self.level {
      BrowserLevel::Datasets => self.datasets.move_cursor(movement),
      BrowserLevel::Tables => self.tables.move_cursor(movement),
    }
  }

  pub fn set_page_size(&mut self, page_size: usize) {
    self.datasets.set_page_size(page_size);
    self.tables.set_page_size(page_size);
  }

  pub fn filter(&self) -> &str {
    match self.level {
      BrowserLevel::Datasets => self.datasets.filter(),
      BrowserLevel::Tables => self.tables.filter(),
    }
  }

  pub fn set_filter(&mut self, text: &str) {
    match self.level {
      BrowserLevel::Datasets => self.datasets.set_filter(text),
      BrowserLevel::Tables => self.tables.set_filter(text),
    }
  }

  pub fn push_filter_char(&mut self, c: char) {
    let text = format!("{}{c}", self.filter());
    self.set_filter(&text);
  }

  pub fn pop_filter_char(&mut self) {
    let mut text = self.filter().to_string();
    text.pop();
    self.set_filter(&text);
  }

  pub fn current_dataset(&self) -> Option<&Dataset> {
    self.datasets.current()
  }

  /// Table under the cursor, only while the table level is shown.
  pub fn current_table(&self) -> Option<&Table> {
    match self.level {
      BrowserLevel::Tables => self.tables.current(),
      BrowserLevel::Datasets => None,
    }
  }
}
