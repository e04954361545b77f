use nucleo::{Config, Matcher, Utf32Str};

/// Items that can be narrowed by a free-text filter.
pub trait Filterable {
  /// Text fields the filter is matched against.
  fn filter_fields(&self) -> Vec<&str>;
}

impl Filterable for Vec<String> {
  fn filter_fields(&self) -> Vec<&str> {
    self.iter().map(String::as_str).collect()
  }
}

impl Filterable for String {
  fn filter_fields(&self) -> Vec<&str> {
    vec![self.as_str()]
  }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
  /// Case-insensitive substring over every field.
  #[default]
  Substring,
  /// Fuzzy subsequence match, best score first.
  Fuzzy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMove {
  Up,
  Down,
  By(isize),
  Top,
  Bottom,
  PageUp,
  PageDown,
}

/// A filterable, scrollable list.
///
/// `visible` holds indices into `items` for the current filter. The cursor and
/// offset are positions in `visible`, and after every mutation
/// `offset <= cursor < offset + page_size` holds.
#[derive(Debug, Clone)]
pub struct ListState<T> {
  items: Vec<T>,
  filter: String,
  mode: FilterMode,
  visible: Vec<usize>,
  cursor: usize,
  offset: usize,
  page_size: usize,
}

impl<T> Default for ListState<T> {
  fn default() -> Self {
    Self {
      items: Vec::new(),
      filter: String::new(),
      mode: FilterMode::Substring,
      visible: Vec::new(),
      cursor: 0,
      offset: 0,
      page_size: 1,
    }
  }
}

impl<T: Filterable> ListState<T> {
  pub fn new(items: Vec<T>) -> Self {
    let mut list = Self::default();
    list.set_items(items);
    list
  }

  pub fn with_mode(mut self, mode: FilterMode) -> Self {
    self.mode = mode;
    self.refilter();
    self
  }

  /// Replaces the items, keeps the filter text and resets the cursor.
  pub fn set_items(&mut self, items: Vec<T>) {
    self.items = items;
    self.refilter();
    self.cursor = 0;
    self.offset = 0;
  }

  pub fn clear(&mut self) {
    self.items.clear();
    self.visible.clear();
    self.cursor = 0;
    self.offset = 0;
  }

  /// Recomputes the visible subset. Always resets cursor and offset to 0.
  pub fn set_filter(&mut self, text: &str) {
    self.filter = text.to_string();
    self.refilter();
    self.cursor = 0;
    self.offset = 0;
  }

  pub fn clear_filter(&mut self) {
    self.set_filter("");
  }

  pub fn move_cursor(&mut self, movement: CursorMove) {
    let len = self.visible.len();
    if len == 0 {
      self.cursor = 0;
      self.offset = 0;
      return;
    }
    let last = len - 1;
    let page = self.page_size.max(1);
    self.cursor = match movement {
      CursorMove::Up => self.cursor.saturating_sub(1),
      CursorMove::Down => (self.cursor + 1).min(last),
      CursorMove::By(n) if n < 0 => self.cursor.saturating_sub(n.unsigned_abs()),
      CursorMove::By(n) => self.cursor.saturating_add(n as usize).min(last),
      CursorMove::Top => 0,
      CursorMove::Bottom => last,
      CursorMove::PageUp => self.cursor.saturating_sub(page),
      CursorMove::PageDown => (self.cursor + page).min(last),
    };
    self.scroll_to_cursor();
  }

  /// Moves the cursor to an absolute position in the filtered view.
  pub fn select(&mut self, index: usize) {
    self.cursor = index.min(self.visible.len().saturating_sub(1));
    self.scroll_to_cursor();
  }

  pub fn set_page_size(&mut self, page_size: usize) {
    self.page_size = page_size.max(1);
    self.cursor = self.cursor.min(self.visible.len().saturating_sub(1));
    self.scroll_to_cursor();
  }

  pub fn current(&self) -> Option<&T> {
    self.visible.get(self.cursor).map(|&i| &self.items[i])
  }

  /// Filtered items with their position in the filtered view.
  pub fn visible_items(&self) -> impl Iterator<Item = &T> {
    self.visible.iter().map(|&i| &self.items[i])
  }

  /// The filtered items that fit in the current page.
  pub fn page(&self) -> impl Iterator<Item = (usize, &T)> {
    self.visible.iter().enumerate().skip(self.offset).take(self.page_size).map(|(pos, &i)| (pos, &self.items[i]))
  }

  pub fn get(&self, position: usize) -> Option<&T> {
    self.visible.get(position).map(|&i| &self.items[i])
  }

  pub fn items(&self) -> &[T] {
    &self.items
  }

  pub fn filter(&self) -> &str {
    &self.filter
  }

  pub fn cursor(&self) -> usize {
    self.cursor
  }

  pub fn offset(&self) -> usize {
    self.offset
  }

  pub fn page_size(&self) -> usize {
    self.page_size
  }

  pub fn len(&self) -> usize {
    self.visible.len()
  }

  pub fn is_empty(&self) -> bool {
    self.visible.is_empty()
  }

  pub fn total_len(&self) -> usize {
    self.items.len()
  }

  fn scroll_to_cursor(&mut self) {
    if self.cursor < self.offset {
      self.offset = self.cursor;
    } else if self.cursor >= self.offset + self.page_size {
      self.offset = self.cursor + 1 - self.page_size;
    }
  }

  fn refilter(&mut self) {
    if self.filter.is_empty() {
      self.visible = (0..self.items.len()).collect();
      return;
    }
    self.visible = match self.mode {
      FilterMode::Substring => {
        let needle = self.filter.to_lowercase();
        self
          .items
          .iter()
          .enumerate()
          .filter(|(_, item)| item.filter_fields().iter().any(|field| field.to_lowercase().contains(&needle)))
          .map(|(i, _)| i)
          .collect()
      },
      FilterMode::Fuzzy => {
        let mut matcher = Matcher::new(Config::DEFAULT);
        let needle = self.filter.to_lowercase();
        let mut needle_buf = Vec::new();
        let mut haystack_buf = Vec::new();
        let mut scored: Vec<(usize, u16)> = self
          .items
          .iter()
          .enumerate()
          .filter_map(|(i, item)| {
            item
              .filter_fields()
              .iter()
              .filter_map(|field| {
                let haystack = Utf32Str::new(field, &mut haystack_buf);
                let pattern = Utf32Str::new(&needle, &mut needle_buf);
                matcher.fuzzy_match(haystack, pattern)
              })
              .max()
              .map(|score| (i, score))
          })
          .collect();
        // Stable sort keeps source order among equal scores.
        scored.sort_by(|a, b| b.1.cmp(&a.1));
        scored.into_iter().map(|(i, _)| i).collect()
      },
    };
  }
}
