use once_cell::sync::Lazy;
use ratatui::style::{Color, Modifier, Style};

// Palette
pub const ACCENT_BLUE: Color = Color::Rgb(97, 175, 239);
pub const ACCENT_CYAN: Color = Color::Rgb(86, 182, 194);
pub const ACCENT_GREEN: Color = Color::Rgb(152, 195, 121);
pub const ACCENT_ORANGE: Color = Color::Rgb(209, 154, 102);
pub const ACCENT_PURPLE: Color = Color::Rgb(198, 120, 221);
pub const BG_PRIMARY: Color = Color::Rgb(40, 44, 52);
pub const BG_SECONDARY: Color = Color::Rgb(33, 37, 43);
pub const BG_SELECTION: Color = Color::Rgb(62, 68, 81);
pub const BG_VISUAL: Color = Color::Rgb(74, 64, 99);
pub const BG_TERTIARY: Color = Color::Rgb(44, 49, 58);
pub const BORDER_FOCUSED: Color = Color::Rgb(97, 175, 239);
pub const BORDER_NORMAL: Color = Color::Rgb(92, 99, 112);
pub const ERROR: Color = Color::Rgb(224, 108, 117);
pub const FG_PRIMARY: Color = Color::Rgb(171, 178, 191);
pub const FG_SECONDARY: Color = Color::Rgb(92, 99, 112);
pub const WARNING: Color = Color::Rgb(229, 192, 123);

// Plain styles are const; anything carrying modifiers is built once on first use.
pub const STYLE_BG_PRIMARY: Style = Style::new().bg(BG_PRIMARY).fg(FG_PRIMARY);
pub const STYLE_INPUT: Style = Style::new().bg(BG_TERTIARY).fg(FG_PRIMARY);
pub const STYLE_BORDER_NORMAL: Style = Style::new().fg(BORDER_NORMAL);
pub const STYLE_BORDER_FOCUSED: Style = Style::new().fg(BORDER_FOCUSED);
pub const STYLE_MUTED: Style = Style::new().fg(FG_SECONDARY);
pub const STYLE_TAB_NORMAL: Style = Style::new().fg(FG_SECONDARY);
pub const STYLE_STATUS_BAR: Style = Style::new().bg(BG_SECONDARY).fg(FG_PRIMARY);
pub const STYLE_VISUAL_RANGE: Style = Style::new().bg(BG_VISUAL).fg(FG_PRIMARY);
pub const STYLE_TYPE: Style = Style::new().fg(ACCENT_PURPLE);

pub static STYLE_SELECTION: Lazy<Style> =
  Lazy::new(|| Style::new().bg(BG_SELECTION).fg(FG_PRIMARY).add_modifier(Modifier::BOLD));

pub static STYLE_SELECTION_ACTIVE: Lazy<Style> =
  Lazy::new(|| Style::new().bg(ACCENT_BLUE).fg(BG_PRIMARY).add_modifier(Modifier::BOLD));

pub static STYLE_CELL_CURSOR: Lazy<Style> =
  Lazy::new(|| Style::new().bg(ACCENT_ORANGE).fg(BG_PRIMARY).add_modifier(Modifier::BOLD));

pub static STYLE_HEADER: Lazy<Style> = Lazy::new(|| {
  Style::new().bg(BG_SELECTION).fg(ACCENT_CYAN).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
});

pub static STYLE_TITLE: Lazy<Style> = Lazy::new(|| Style::new().fg(ACCENT_BLUE).add_modifier(Modifier::BOLD));

pub static STYLE_SUCCESS: Lazy<Style> = Lazy::new(|| Style::new().fg(ACCENT_GREEN).add_modifier(Modifier::BOLD));

pub static STYLE_WARNING: Lazy<Style> = Lazy::new(|| Style::new().fg(WARNING).add_modifier(Modifier::BOLD));

pub static STYLE_ERROR: Lazy<Style> = Lazy::new(|| Style::new().fg(ERROR).add_modifier(Modifier::BOLD));

pub static STYLE_TAB_SELECTED: Lazy<Style> =
  Lazy::new(|| Style::new().fg(ACCENT_BLUE).add_modifier(Modifier::BOLD | Modifier::UNDERLINED));

pub static STYLE_KEY_HINT: Lazy<Style> = Lazy::new(|| Style::new().fg(ACCENT_CYAN).add_modifier(Modifier::BOLD));

#[inline]
pub fn bg_primary() -> Style {
  STYLE_BG_PRIMARY
}

#[inline]
pub fn input() -> Style {
  STYLE_INPUT
}

#[inline]
pub fn border(focused: bool) -> Style {
  if focused {
    STYLE_BORDER_FOCUSED
  } else {
    STYLE_BORDER_NORMAL
  }
}

#[inline]
pub fn muted() -> Style {
  STYLE_MUTED
}

#[inline]
pub fn tab_normal() -> Style {
  STYLE_TAB_NORMAL
}

#[inline]
pub fn tab_selected() -> Style {
  *STYLE_TAB_SELECTED
}

#[inline]
pub fn status_bar() -> Style {
  STYLE_STATUS_BAR
}

#[inline]
pub fn visual_range() -> Style {
  STYLE_VISUAL_RANGE
}

#[inline]
pub fn data_type() -> Style {
  STYLE_TYPE
}

/// Row highlight; the active variant is used when the owning pane has focus.
#[inline]
pub fn selection(active: bool) -> Style {
  if active {
    *STYLE_SELECTION_ACTIVE
  } else {
    *STYLE_SELECTION
  }
}

#[inline]
pub fn cell_cursor() -> Style {
  *STYLE_CELL_CURSOR
}

#[inline]
pub fn header() -> Style {
  *STYLE_HEADER
}

#[inline]
pub fn title() -> Style {
  *STYLE_TITLE
}

#[inline]
pub fn success() -> Style {
  *STYLE_SUCCESS
}

#[inline]
pub fn warning() -> Style {
  *STYLE_WARNING
}

#[inline]
pub fn error() -> Style {
  *STYLE_ERROR
}

#[inline]
pub fn key_hint() -> Style {
  *STYLE_KEY_HINT
}
