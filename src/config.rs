use std::{collections::HashMap, path::PathBuf};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use derive_deref::{Deref, DerefMut};
use serde::{de::Deserializer, Deserialize};

use crate::{action::Command, nav::layout::ColumnLayout};

const CONFIG: &str = include_str!("../.config/config.json5");

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub _data_dir: PathBuf,
  #[serde(default)]
  pub _config_dir: PathBuf,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
  pub min_column_width: usize,
  pub max_column_width: usize,
  /// Rows requested for the Preview tab.
  pub preview_rows: usize,
}

impl Default for LayoutConfig {
  fn default() -> Self {
    Self { min_column_width: 8, max_column_width: 30, preview_rows: 100 }
  }
}

impl LayoutConfig {
  pub fn column_layout(&self) -> ColumnLayout {
    ColumnLayout::new(self.min_column_width, self.max_column_width)
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  pub enabled: bool,
  pub ttl_hours: u64,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self { enabled: true, ttl_hours: 24 }
  }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
  #[serde(default, flatten)]
  pub config: AppConfig,
  #[serde(default)]
  pub keybindings: KeyBindings,
  #[serde(default)]
  pub layout: LayoutConfig,
  #[serde(default)]
  pub cache: CacheConfig,
}

impl Default for Config {
  /// The bindings and settings shipped with the binary.
  fn default() -> Self {
    json5::from_str(CONFIG).unwrap_or_else(|e| {
      tracing::error!("embedded config is invalid: {e}");
      Self {
        config: AppConfig::default(),
        keybindings: KeyBindings::default(),
        layout: LayoutConfig::default(),
        cache: CacheConfig::default(),
      }
    })
  }
}

impl Config {
  pub fn new() -> Result<Self, config::ConfigError> {
    let default_config = Config::default();
    let data_dir = crate::utils::get_data_dir();
    let config_dir = crate::utils::get_config_dir();
    let mut builder = config::Config::builder()
      .set_default("_data_dir", data_dir.to_string_lossy().to_string())?
      .set_default("_config_dir", config_dir.to_string_lossy().to_string())?;

    let config_files = [
      ("config.json5", config::FileFormat::Json5),
      ("config.json", config::FileFormat::Json),
      ("config.yaml", config::FileFormat::Yaml),
      ("config.toml", config::FileFormat::Toml),
      ("config.ini", config::FileFormat::Ini),
    ];
    let mut found_config = false;
    for (file, format) in &config_files {
      let path = config_dir.join(file);
      found_config |= path.exists();
      builder = builder.add_source(config::File::from(path).format(*format).required(false));
    }
    if !found_config {
      tracing::info!("no user config in {}, using defaults", config_dir.display());
    }

    let mut cfg: Self = builder.build()?.try_deserialize()?;

    for (key, command) in default_config.keybindings.iter() {
      cfg.keybindings.entry(*key).or_insert(*command);
    }

    Ok(cfg)
  }
}

#[derive(Clone, Debug, Default, Deref, DerefMut)]
pub struct KeyBindings(pub HashMap<KeyEvent, Command>);

impl KeyBindings {
  pub fn command_for(&self, key: &KeyEvent) -> Option<Command> {
    self.0.get(&normalize(*key)).copied()
  }

  /// Sorted labels of every key bound to `command`, for the help overlay.
  pub fn labels_for(&self, command: Command) -> Vec<String> {
    let mut labels: Vec<String> = self.0.iter().filter(|(_, c)| **c == command).map(|(k, _)| key_label(k)).collect();
    labels.sort();
    labels
  }
}

impl<'de> Deserialize<'de> for KeyBindings {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    let parsed = HashMap::<String, Command>::deserialize(deserializer)?;
    let bindings = parsed
      .into_iter()
      .map(|(raw, command)| parse_key_event(&raw).map(|key| (key, command)).map_err(serde::de::Error::custom))
      .collect::<Result<HashMap<_, _>, _>>()?;
    Ok(KeyBindings(bindings))
  }
}

/// Shift is implied by the character itself, so it is dropped for lookups.
pub fn normalize(key: KeyEvent) -> KeyEvent {
  let mut modifiers = key.modifiers;
  if matches!(key.code, KeyCode::Char(_) | KeyCode::BackTab) {
    modifiers.remove(KeyModifiers::SHIFT);
  }
  KeyEvent::new(key.code, modifiers)
}

/// Parses `<Ctrl-c>`, `<G>`, `<PageDown>` and friends.
pub fn parse_key_event(raw: &str) -> Result<KeyEvent, String> {
  let inner = raw.strip_prefix('<').and_then(|r| r.strip_suffix('>')).unwrap_or(raw);
  let (rest, modifiers) = extract_modifiers(inner);
  parse_key_code_with_modifiers(rest, modifiers)
}

fn extract_modifiers(raw: &str) -> (&str, KeyModifiers) {
  let mut modifiers = KeyModifiers::empty();
  let mut current = raw;
  loop {
    let lower = current.to_ascii_lowercase();
    if lower.starts_with("ctrl-") {
      modifiers.insert(KeyModifiers::CONTROL);
      current = &current[5..];
    } else if lower.starts_with("alt-") {
      modifiers.insert(KeyModifiers::ALT);
      current = &current[4..];
    } else if lower.starts_with("shift-") {
      modifiers.insert(KeyModifiers::SHIFT);
      current = &current[6..];
    } else {
      break;
    }
  }
  (current, modifiers)
}

fn parse_key_code_with_modifiers(raw: &str, modifiers: KeyModifiers) -> Result<KeyEvent, String> {
  let code = match raw.to_ascii_lowercase().as_str() {
    "esc" => KeyCode::Esc,
    "enter" => KeyCode::Enter,
    "left" => KeyCode::Left,
    "right" => KeyCode::Right,
    "up" => KeyCode::Up,
    "down" => KeyCode::Down,
    "home" => KeyCode::Home,
    "end" => KeyCode::End,
    "pageup" => KeyCode::PageUp,
    "pagedown" => KeyCode::PageDown,
    "backtab" => KeyCode::BackTab,
    "backspace" => KeyCode::Backspace,
    "delete" => KeyCode::Delete,
    "insert" => KeyCode::Insert,
    "tab" => KeyCode::Tab,
    "space" => KeyCode::Char(' '),
    lower if lower.len() > 1 && lower.starts_with('f') => {
      let n = lower[1..].parse::<u8>().map_err(|_| format!("Unable to parse `{raw}`"))?;
      KeyCode::F(n)
    },
    _ => {
      let mut chars = raw.chars();
      match (chars.next(), chars.next()) {
        (Some(c), None) if modifiers.contains(KeyModifiers::SHIFT) => KeyCode::Char(c.to_ascii_uppercase()),
        (Some(c), None) => KeyCode::Char(c),
        _ => return Err(format!("Unable to parse `{raw}`")),
      }
    },
  };
  Ok(normalize(KeyEvent::new(code, modifiers)))
}

pub fn key_label(key: &KeyEvent) -> String {
  let code = match key.code {
    KeyCode::Char(' ') => "Space".to_string(),
    KeyCode::Char(c) => c.to_string(),
    KeyCode::F(n) => format!("F{n}"),
    KeyCode::BackTab => "Shift-Tab".to_string(),
    other => format!("{other:?}"),
  };
  let mut label = String::new();
  if key.modifiers.contains(KeyModifiers::CONTROL) {
    label.push_str("Ctrl-");
  }
  if key.modifiers.contains(KeyModifiers::ALT) {
    label.push_str("Alt-");
  }
  label.push_str(&code);
  label
}
