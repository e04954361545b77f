use std::sync::Mutex;

use color_eyre::eyre::{eyre, Result};

pub trait Clipboard: Send + Sync {
  fn write_text(&self, text: &str) -> Result<()>;
}

/// The system clipboard. The handle is kept open so that X11 and Wayland
/// selections outlive the copy call.
#[derive(Default)]
pub struct SystemClipboard {
  handle: Mutex<Option<arboard::Clipboard>>,
}

impl SystemClipboard {
  pub fn new() -> Self {
    Self::default()
  }
}

impl Clipboard for SystemClipboard {
  fn write_text(&self, text: &str) -> Result<()> {
    let mut guard = self.handle.lock().map_err(|_| eyre!("clipboard lock poisoned"))?;
    if guard.is_none() {
      *guard = Some(arboard::Clipboard::new().map_err(|e| eyre!("clipboard unavailable: {e}"))?);
    }
    match guard.as_mut() {
      Some(clipboard) => clipboard.set_text(text.to_string()).map_err(|e| eyre!("copy failed: {e}")),
      None => Err(eyre!("clipboard unavailable")),
    }
  }
}

/// Keeps the last copied text in memory. Used by tests and headless runs.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
  contents: Mutex<Vec<String>>,
}

impl MemoryClipboard {
  pub fn history(&self) -> Vec<String> {
    self.contents.lock().map(|c| c.clone()).unwrap_or_default()
  }

  pub fn last(&self) -> Option<String> {
    self.history().last().cloned()
  }
}

impl Clipboard for MemoryClipboard {
  fn write_text(&self, text: &str) -> Result<()> {
    self.contents.lock().map_err(|_| eyre!("clipboard lock poisoned"))?.push(text.to_string());
    Ok(())
  }
}
