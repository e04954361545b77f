use serde::{Deserialize, Serialize};
use strum::Display;

use crate::{catalog::Payload, nav::gate::PendingRequest};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Display, Deserialize)]
pub enum Action {
  Tick,
  Render,
  Resize(u16, u16),
  Suspend,
  Resume,
  Quit,
  Error(String),
  /// Informational status line message.
  Notify(String),
  /// Run a catalog call; its result comes back as `Fetched`.
  Fetch(PendingRequest),
  /// Like `Fetch`, but drops any cached copy first.
  Refetch(PendingRequest),
  Fetched { request: PendingRequest, outcome: FetchOutcome },
  CopyToClipboard(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchOutcome {
  Loaded(Payload),
  Failed(String),
}

/// User intents that key bindings resolve to. What a command does depends
/// on which part of the screen has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, Deserialize)]
pub enum Command {
  Quit,
  Suspend,
  ToggleHelp,
  OpenPicker,
  Up,
  Down,
  Left,
  Right,
  Top,
  Bottom,
  PageUp,
  PageDown,
  FirstColumn,
  LastColumn,
  Select,
  Back,
  Filter,
  NextTab,
  PrevTab,
  ToggleVisual,
  Copy,
  Refresh,
  ExecuteQuery,
}
