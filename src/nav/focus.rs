use serde::{Deserialize, Serialize};
use strum::Display;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum Focus {
  #[default]
  Browser,
  DetailPane,
  Picker,
  FilterInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeOutcome {
  ClosedPicker,
  ClosedHelp,
  /// Filter input left; the caller clears the browser filter.
  LeftFilter,
  /// The detail pane consumed it.
  Handled,
  ToBrowser,
  Ignored,
}

/// Which part of the screen receives input, plus the help overlay that sits
/// on top of all of them.
#[derive(Debug, Default, Clone)]
pub struct FocusController {
  focus: Focus,
  before_picker: Focus,
  help: bool,
}

impl FocusController {
  pub fn focus(&self) -> Focus {
    self.focus
  }

  pub fn is(&self, focus: Focus) -> bool {
    self.focus == focus
  }

  pub fn set(&mut self, focus: Focus) {
    self.focus = focus;
  }

  /// Returns false if the picker is already open. Opening it from the filter
  /// input ends the filter, keeping its text.
  pub fn open_picker(&mut self) -> bool {
    if self.focus == Focus::Picker {
      return false;
    }
    self.end_filter();
    self.before_picker = self.focus;
    self.focus = Focus::Picker;
    true
  }

  /// Back to wherever the picker was opened from.
  pub fn close_picker(&mut self) {
    if self.focus == Focus::Picker {
      self.focus = self.before_picker;
    }
  }

  pub fn toggle_help(&mut self) {
    self.help = !self.help;
  }

  pub fn help_visible(&self) -> bool {
    self.help
  }

  /// Browser level filter input. Only reachable from the browser.
  pub fn begin_filter(&mut self) -> bool {
    if self.focus != Focus::Browser {
      return false;
    }
    self.focus = Focus::FilterInput;
    true
  }

  pub fn end_filter(&mut self) {
    if self.focus == Focus::FilterInput {
      self.focus = Focus::Browser;
    }
  }

  /// Keys are text when typing into the picker or the browser filter. The
  /// detail pane reports its own text-entry modes through `pane_text_entry`.
  pub fn is_text_entry(&self, pane_text_entry: bool) -> bool {
    match self.focus {
      Focus::Picker | Focus::FilterInput => true,
      Focus::DetailPane => pane_text_entry,
      Focus::Browser => false,
    }
  }

  /// Escape in priority order: picker, help overlay, filter input, the
  /// detail pane's own handling, then a fall back to the browser.
  pub fn escape(&mut self, pane: impl FnOnce() -> bool) -> EscapeOutcome {
    if self.focus == Focus::Picker {
      self.close_picker();
      return EscapeOutcome::ClosedPicker;
    }
    if self.help {
      self.help = false;
      return EscapeOutcome::ClosedHelp;
    }
    match self.focus {
      Focus::FilterInput => {
        self.end_filter();
        EscapeOutcome::LeftFilter
      },
      Focus::DetailPane if pane() => EscapeOutcome::Handled,
      Focus::DetailPane => {
        self.focus = Focus::Browser;
        EscapeOutcome::ToBrowser
      },
      _ => EscapeOutcome::Ignored,
    }
  }
}
