use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::Explorer;
use crate::{
  action::{Action, Command},
  nav::{
    browser::BrowserLevel,
    detail::TabKind,
    focus::{EscapeOutcome, Focus},
    gate::{RequestKind, SelectionKey},
    list::CursorMove,
  },
};

/// Typed text: plain or shifted characters without Ctrl or Alt.
fn typed_char(key: &KeyEvent) -> Option<char> {
  match key.code {
    KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => Some(c),
    _ => None,
  }
}

fn cursor_move(command: Command) -> Option<CursorMove> {
  match command {
    Command::Up => Some(CursorMove::Up),
    Command::Down => Some(CursorMove::Down),
    Command::Top => Some(CursorMove::Top),
    Command::Bottom => Some(CursorMove::Bottom),
    Command::PageUp => Some(CursorMove::PageUp),
    Command::PageDown => Some(CursorMove::PageDown),
    _ => None,
  }
}

/// Arrow and paging keys that still navigate while text is being typed.
fn text_entry_move(key: &KeyEvent) -> Option<CursorMove> {
  match key.code {
    KeyCode::Up => Some(CursorMove::Up),
    KeyCode::Down => Some(CursorMove::Down),
    KeyCode::PageUp => Some(CursorMove::PageUp),
    KeyCode::PageDown => Some(CursorMove::PageDown),
    _ => None,
  }
}

impl Explorer {
  pub(super) fn handle_events(&mut self, event: Option<crate::tui::Event>) -> Result<Option<Action>> {
    match event {
      Some(crate::tui::Event::Key(key)) => self.handle_key_events(key),
      Some(crate::tui::Event::Paste(text)) => {
        self.handle_paste(&text);
        Ok(Some(Action::Render))
      },
      _ => Ok(None),
    }
  }

  pub(super) fn handle_key_events(&mut self, key: KeyEvent) -> Result<Option<Action>> {
    let text_entry = self.focus.is_text_entry(self.detail.is_text_entry());
    let command = self.config.keybindings.command_for(&key);

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match command {
      Some(Command::Quit) if !text_entry || ctrl => return Ok(Some(Action::Quit)),
      Some(Command::Suspend) if !text_entry || ctrl => return Ok(Some(Action::Suspend)),
      Some(Command::OpenPicker) if (!text_entry || ctrl) && !self.focus.help_visible() => {
        self.open_picker();
        return Ok(Some(Action::Render));
      },
      _ => {},
    }

    if key.code == KeyCode::Esc {
      self.handle_escape();
      return Ok(Some(Action::Render));
    }

    if self.focus.help_visible() {
      if command == Some(Command::ToggleHelp) {
        self.focus.toggle_help();
      }
      return Ok(None);
    }

    if !text_entry && command == Some(Command::ToggleHelp) {
      self.focus.toggle_help();
      return Ok(Some(Action::Render));
    }

    match self.focus.focus() {
      Focus::Browser => self.handle_browser_keys(command),
      Focus::FilterInput => self.handle_filter_input(key),
      Focus::Picker => self.handle_picker_keys(key),
      Focus::DetailPane => self.handle_detail_keys(key, command),
    }
    Ok(Some(Action::Render))
  }

  /// Pasted text lands in whichever text field has focus; newlines only
  /// survive in the query editor.
  fn handle_paste(&mut self, text: &str) {
    let line: String = text.chars().filter(|c| !c.is_control()).collect();
    match self.focus.focus() {
      Focus::FilterInput => {
        let filter = format!("{}{line}", self.browser.filter());
        self.browser.set_filter(&filter);
        self.on_hover();
      },
      Focus::Picker => {
        let filter = format!("{}{line}", self.picker.filter());
        self.picker.set_filter(&filter);
      },
      Focus::DetailPane if self.detail.active() == TabKind::Query => {
        if self.detail.editor.is_focused() {
          self.detail.editor.insert_str(text);
        }
      },
      Focus::DetailPane => {
        if let Some(view) = self.detail.active_view_mut().filter(|v| v.is_filter_editing()) {
          line.chars().for_each(|c| view.push_filter_char(c));
        }
      },
      Focus::Browser => {},
    }
  }

  fn handle_escape(&mut self) {
    let detail = &mut self.detail;
    match self.focus.escape(|| detail.escape()) {
      EscapeOutcome::LeftFilter => {
        self.browser.set_filter("");
        self.on_hover();
      },
      EscapeOutcome::ClosedPicker => self.picker.clear_filter(),
      EscapeOutcome::ClosedHelp | EscapeOutcome::Handled | EscapeOutcome::ToBrowser | EscapeOutcome::Ignored => {},
    }
  }

  /// Any text entry in the pane ends first: a tab filter is kept, the
  /// editor is blurred.
  fn open_picker(&mut self) {
    if self.focus.is(Focus::DetailPane) {
      if let Some(view) = self.detail.active_view_mut().filter(|v| v.is_filter_editing()) {
        view.submit_filter();
      }
      self.detail.editor.blur();
    }
    if self.focus.open_picker() {
      self.picker.clear_filter();
      self.fetch(RequestKind::Projects, self.gate.current().clone());
    }
  }

  fn handle_browser_keys(&mut self, command: Option<Command>) {
    let Some(command) = command else {
      return;
    };
    if let Some(movement) = cursor_move(command) {
      self.browser.move_cursor(movement);
      self.on_hover();
      return;
    }
    match command {
      Command::Select | Command::Right => match self.browser.level() {
        BrowserLevel::Datasets => self.open_current_dataset(),
        BrowserLevel::Tables => {
          if self.browser.current_table().is_some() && command == Command::Select {
            self.on_hover();
            self.focus.set(Focus::DetailPane);
          }
        },
      },
      Command::Left | Command::Back => {
        self.browser.back();
      },
      Command::Filter => {
        self.focus.begin_filter();
      },
      Command::Copy => self.copy_browser_selection(),
      Command::Refresh => self.refresh_browser(),
      Command::NextTab | Command::PrevTab => self.detail.cycle(command == Command::NextTab),
      Command::ExecuteQuery => self.run_query(),
      _ => {},
    }
  }

  fn open_current_dataset(&mut self) {
    let Some(dataset) = self.browser.current_dataset().map(|d| d.id.clone()) else {
      return;
    };
    let key = SelectionKey::dataset(self.project(), &dataset);
    let same_dataset = self.gate.current().dataset.as_deref() == Some(dataset.as_str());
    self.browser.open_dataset(&dataset);

    if same_dataset && self.browser.tables.total_len() > 0 {
      self.on_hover();
      return;
    }
    if !same_dataset {
      self.gate.select(key.clone());
      self.clear_table_detail();
    }
    self.fetch(RequestKind::Tables, key);
  }

  fn copy_browser_selection(&mut self) {
    let text = match self.browser.level() {
      BrowserLevel::Tables => {
        self.browser.current_table().map(|t| format!("{}.{}.{}", t.project_id, t.dataset_id, t.id))
      },
      BrowserLevel::Datasets => self.browser.current_dataset().map(|d| format!("{}.{}", d.project_id, d.id)),
    };
    if let Some(text) = text {
      self.dispatch(Action::CopyToClipboard(text));
    }
  }

  fn refresh_browser(&mut self) {
    match (self.browser.level(), self.browser.opened_dataset()) {
      (BrowserLevel::Tables, Some(dataset)) => {
        let key = SelectionKey::dataset(self.project(), dataset);
        self.refetch(RequestKind::Tables, key);
      },
      _ => {
        let key = SelectionKey::project(self.project());
        self.refetch(RequestKind::Datasets, key);
      },
    }
  }

  fn handle_filter_input(&mut self, key: KeyEvent) {
    if let Some(movement) = text_entry_move(&key) {
      self.browser.move_cursor(movement);
    } else {
      match key.code {
        KeyCode::Enter => {
          self.focus.end_filter();
          return;
        },
        KeyCode::Backspace => self.browser.pop_filter_char(),
        _ => match typed_char(&key) {
          Some(c) => self.browser.push_filter_char(c),
          None => return,
        },
      }
    }
    self.on_hover();
  }

  fn handle_picker_keys(&mut self, key: KeyEvent) {
    if let Some(movement) = text_entry_move(&key) {
      self.picker.move_cursor(movement);
      return;
    }
    match key.code {
      KeyCode::Enter => self.switch_to_current_project(),
      KeyCode::Backspace => {
        let mut text = self.picker.filter().to_string();
        text.pop();
        self.picker.set_filter(&text);
      },
      _ => {
        if let Some(c) = typed_char(&key) {
          let text = format!("{}{c}", self.picker.filter());
          self.picker.set_filter(&text);
        }
      },
    }
  }

  fn switch_to_current_project(&mut self) {
    let Some(project) = self.picker.current().map(|p| p.id.clone()) else {
      return;
    };
    self.focus.close_picker();
    self.focus.set(Focus::Browser);
    self.picker.clear_filter();
    if project == self.project() {
      return;
    }

    let key = SelectionKey::project(&project);
    self.gate.select(key.clone());
    self.browser.reset();
    self.clear_table_detail();
    self.info(format!("Switching to {project}"));
    self.fetch(RequestKind::SwitchProject, key);
  }

  fn handle_detail_keys(&mut self, key: KeyEvent, command: Option<Command>) {
    if self.detail.dialog.is_some() {
      self.handle_dialog_keys(command);
      return;
    }
    if self.detail.active() == TabKind::Query {
      self.handle_query_tab_keys(key, command);
      return;
    }

    let editing_filter = self.detail.active_view().is_some_and(|v| v.is_filter_editing());
    if editing_filter {
      self.handle_tab_filter_keys(key);
      return;
    }

    let Some(command) = command else {
      return;
    };
    if let Some(movement) = cursor_move(command) {
      if let Some(view) = self.detail.active_view_mut() {
        view.move_row(movement);
      }
      return;
    }
    match command {
      Command::Left | Command::Right => {
        if let Some(view) = self.detail.active_view_mut() {
          view.move_col(if command == Command::Left { -1 } else { 1 });
        }
      },
      Command::FirstColumn => {
        if let Some(view) = self.detail.active_view_mut() {
          view.first_col();
        }
      },
      Command::LastColumn => {
        if let Some(view) = self.detail.active_view_mut() {
          view.last_col();
        }
      },
      Command::ToggleVisual => {
        if let Some(view) = self.detail.active_view_mut() {
          view.toggle_visual();
        }
      },
      Command::Filter => {
        if let Some(view) = self.detail.active_view_mut() {
          view.begin_filter();
        }
      },
      Command::Select if self.detail.active() == TabKind::Schema => {
        self.detail.open_dialog();
      },
      Command::Copy => self.copy_detail_selection(),
      Command::Refresh => self.refresh_detail(),
      Command::NextTab | Command::PrevTab => self.detail.cycle(command == Command::NextTab),
      Command::Back => self.focus.set(Focus::Browser),
      Command::ExecuteQuery => self.run_query(),
      _ => {},
    }
  }

  fn handle_tab_filter_keys(&mut self, key: KeyEvent) {
    let Some(view) = self.detail.active_view_mut() else {
      return;
    };
    if let Some(movement) = text_entry_move(&key) {
      view.move_row(movement);
      return;
    }
    match key.code {
      KeyCode::Enter => view.submit_filter(),
      KeyCode::Backspace => view.pop_filter_char(),
      _ => {
        if let Some(c) = typed_char(&key) {
          view.push_filter_char(c);
        }
      },
    }
  }

  fn handle_dialog_keys(&mut self, command: Option<Command>) {
    let Some(dialog) = self.detail.dialog.as_mut() else {
      return;
    };
    match command {
      Some(Command::Up) => dialog.up(),
      Some(Command::Down) => dialog.down(),
      Some(Command::Select) => self.run_column_query(),
      _ => {},
    }
  }

  fn run_column_query(&mut self) {
    let Some(dialog) = self.detail.dialog.take() else {
      return;
    };
    let Some(query) = dialog.selected() else {
      return;
    };
    let key = self.gate.current();
    if key.table.is_none() {
      self.error("No table selected");
      return;
    }
    let sql = query.sql(&key.qualified_name(), &dialog.column);
    self.detail.editor.set_text(&sql);
    self.run_query();
  }

  fn handle_query_tab_keys(&mut self, key: KeyEvent, command: Option<Command>) {
    if self.detail.editor.is_focused() {
      match key.code {
        KeyCode::Tab => self.detail.cycle(true),
        KeyCode::BackTab => self.detail.cycle(false),
        _ if command == Some(Command::ExecuteQuery) && key.modifiers.contains(KeyModifiers::CONTROL) => {
          self.detail.editor.blur();
          self.run_query();
        },
        _ => self.detail.editor.input(key),
      }
      return;
    }
    match command {
      Some(Command::Select) => self.detail.editor.focus(),
      Some(Command::ExecuteQuery) => self.run_query(),
      Some(Command::NextTab) => self.detail.cycle(true),
      Some(Command::PrevTab) => self.detail.cycle(false),
      Some(Command::Copy) => self.copy_detail_selection(),
      Some(Command::Back) => self.focus.set(Focus::Browser),
      _ => {},
    }
  }

  /// Runs the editor text against the current project. Empty text is
  /// rejected without a fetch.
  pub(super) fn run_query(&mut self) {
    let sql = self.detail.editor.text();
    if sql.trim().is_empty() {
      self.error("Query is empty");
      return;
    }
    let request = self.gate.issue_query(self.gate.current().clone(), sql);
    self.detail.switch_to(TabKind::Results);
    self.info("Running query…");
    self.dispatch(Action::Fetch(request));
  }

  fn copy_detail_selection(&mut self) {
    if let Some(text) = self.detail.copy_text() {
      self.dispatch(Action::CopyToClipboard(text));
    }
  }

  fn refresh_detail(&mut self) {
    let key = self.gate.current().clone();
    match self.detail.active() {
      TabKind::Results => self.run_query(),
      _ if key.table.is_some() => {
        self.refetch(RequestKind::Schema, key.clone());
        self.refetch(RequestKind::Preview, key);
      },
      _ => {},
    }
  }
}
