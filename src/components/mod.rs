pub mod explorer;

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;

use crate::{
  action::Action,
  config::Config,
  tui::{self, Frame},
};

pub trait Component {
  fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()>;
  fn register_config_handler(&mut self, config: Config) -> Result<()>;
  fn update(&mut self, action: Action) -> Result<Option<Action>>;
  fn handle_events(&mut self, event: Option<tui::Event>) -> Result<Option<Action>>;
  fn handle_key_events(&mut self, key: KeyEvent) -> Result<Option<Action>>;
  fn init(&mut self, area: Rect) -> Result<()>;
  fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()>;
}
