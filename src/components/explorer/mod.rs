//! The explorer screen: dataset/table browser, tabbed table detail, project
//! picker and help overlay. Owns all navigation state and turns key presses
//! and fetch results into state changes plus outgoing actions.

pub mod handlers;
pub mod rendering;
pub mod state;

use color_eyre::eyre::Result;
use ratatui::prelude::*;
use tokio::sync::mpsc::UnboundedSender;

use super::Component;
use crate::{
  action::Action,
  catalog::Project,
  config::Config,
  nav::{
    browser::Browser,
    detail::DetailPane,
    focus::FocusController,
    gate::{RequestGate, RequestKind, SelectionKey},
    list::{FilterMode, ListState},
  },
  tui::Frame,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
  Info,
  Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
  pub text: String,
  pub level: StatusLevel,
}

pub struct Explorer {
  pub command_tx: Option<UnboundedSender<Action>>,
  pub config: Config,
  pub gate: RequestGate,
  pub focus: FocusController,
  pub browser: Browser,
  pub detail: DetailPane,
  pub picker: ListState<Project>,
  pub status: Option<StatusMessage>,
  pub area: Rect,
}

impl Explorer {
  pub fn new(project: &str) -> Self {
    Self::new_with_config(project, None)
  }

  pub fn new_with_config(project: &str, config: Option<Config>) -> Self {
    let config = config.unwrap_or_default();
    let layout = config.layout.column_layout();
    Self {
      command_tx: None,
      gate: RequestGate::new(SelectionKey::project(project)),
      focus: FocusController::default(),
      browser: Browser::default(),
      detail: DetailPane::new(layout),
      picker: ListState::default().with_mode(FilterMode::Fuzzy),
      status: None,
      area: Rect::default(),
      config,
    }
  }

  pub fn project(&self) -> &str {
    &self.gate.current().project
  }

  /// Sends an action to the app loop. Without a registered channel the
  /// action is dropped.
  pub(super) fn dispatch(&self, action: Action) {
    match &self.command_tx {
      Some(tx) => {
        if let Err(e) = tx.send(action) {
          tracing::error!("action channel closed: {e}");
        }
      },
      None => tracing::warn!("no action handler registered, dropping {action}"),
    }
  }

  /// Issues a fetch through the gate; duplicates of an outstanding fetch are
  /// swallowed.
  pub(super) fn fetch(&mut self, kind: RequestKind, key: SelectionKey) {
    if let Some(request) = self.gate.issue(kind, key) {
      self.dispatch(Action::Fetch(request));
    }
  }

  /// Like `fetch`, but bypasses the cache and the hover de-duplication.
  pub(super) fn refetch(&mut self, kind: RequestKind, key: SelectionKey) {
    self.gate.forget(kind);
    if let Some(request) = self.gate.issue(kind, key) {
      self.dispatch(Action::Refetch(request));
    }
  }

  pub(super) fn info(&mut self, text: impl Into<String>) {
    self.status = Some(StatusMessage { text: text.into(), level: StatusLevel::Info });
  }

  pub(super) fn error(&mut self, text: impl Into<String>) {
    let text = text.into();
    tracing::warn!("{text}");
    self.status = Some(StatusMessage { text, level: StatusLevel::Error });
  }
}

impl Component for Explorer {
  fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
    self.command_tx = Some(tx);
    Ok(())
  }

  fn register_config_handler(&mut self, config: Config) -> Result<()> {
    self.register_config_handler(config)
  }

  fn init(&mut self, area: Rect) -> Result<()> {
    self.init(area)
  }

  fn handle_events(&mut self, event: Option<crate::tui::Event>) -> Result<Option<Action>> {
    self.handle_events(event)
  }

  fn handle_key_events(&mut self, key: crossterm::event::KeyEvent) -> Result<Option<Action>> {
    self.handle_key_events(key)
  }

  fn update(&mut self, action: Action) -> Result<Option<Action>> {
    self.update(action)
  }

  fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
    self.draw(f, area)
  }
}
