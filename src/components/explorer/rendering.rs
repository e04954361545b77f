use bq_crafter_theme as theme;
use color_eyre::eyre::Result;
use ratatui::{
  prelude::*,
  widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs, Wrap},
};

use super::{Explorer, StatusLevel};
use crate::{
  action::Command,
  nav::{
    browser::BrowserLevel,
    detail::TabKind,
    focus::Focus,
    gate::RequestKind,
    layout::{clip_cell, visible_columns},
    table_view::TableView,
  },
  tui::Frame,
};

const BROWSER_PERCENT: u16 = 30;
const PICKER_PERCENT: (u16, u16) = (60, 60);

/// Screen regions shared by drawing and resizing, so page sizes always match
/// what is on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Regions {
  pub title: Rect,
  pub browser: Rect,
  pub browser_filter: Rect,
  pub browser_list: Rect,
  pub detail: Rect,
  pub tabs: Rect,
  pub tab_filter: Rect,
  pub grid_header: Rect,
  pub grid_rows: Rect,
  /// Below the tab row; the query editor takes all of it.
  pub tab_body: Rect,
  pub status: Rect,
  pub picker: Rect,
  pub picker_input: Rect,
  pub picker_list: Rect,
}

impl Regions {
  pub fn new(area: Rect) -> Self {
    let [title, body, status] =
      Layout::vertical([Constraint::Length(1), Constraint::Min(0), Constraint::Length(1)]).areas(area);
    let [browser, detail] =
      Layout::horizontal([Constraint::Percentage(BROWSER_PERCENT), Constraint::Percentage(100 - BROWSER_PERCENT)])
        .areas(body);

    let browser_inner = browser.inner(Margin::new(1, 1));
    let [browser_filter, browser_list] =
      Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(browser_inner);

    let detail_inner = detail.inner(Margin::new(1, 1));
    let [tabs, tab_body] = Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(detail_inner);
    let [tab_filter, grid_header, grid_rows] =
      Layout::vertical([Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)]).areas(tab_body);

    let picker = centered_rect(PICKER_PERCENT.0, PICKER_PERCENT.1, area);
    let [picker_input, picker_list] =
      Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(picker.inner(Margin::new(1, 1)));

    Self {
      title,
      browser,
      browser_filter,
      browser_list,
      detail,
      tabs,
      tab_filter,
      grid_header,
      grid_rows,
      tab_body,
      status,
      picker,
      picker_input,
      picker_list,
    }
  }
}

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
  let popup_layout = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Percentage((100 - percent_y) / 2),
      Constraint::Percentage(percent_y),
      Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(r);

  Layout::default()
    .direction(Direction::Horizontal)
    .constraints([
      Constraint::Percentage((100 - percent_x) / 2),
      Constraint::Percentage(percent_x),
      Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(popup_layout[1])[1]
}

fn panel(title: String, focused: bool) -> Block<'static> {
  Block::default()
    .borders(Borders::ALL)
    .border_type(BorderType::Rounded)
    .border_style(theme::border(focused))
    .title(title)
    .title_style(theme::title())
    .style(theme::bg_primary())
}

fn loading_suffix(loading: bool) -> &'static str {
  if loading {
    " ⟳"
  } else {
    ""
  }
}

/// The filter line above a list: live input while typing, the applied
/// filter otherwise, or a hint.
fn filter_line(filter: &str, editing: bool) -> Line<'static> {
  if editing {
    Line::from(vec![Span::styled("/", theme::key_hint()), Span::styled(filter.to_string(), theme::input())])
  } else if !filter.is_empty() {
    Line::from(vec![Span::styled("filter: ", theme::muted()), Span::styled(filter.to_string(), theme::warning())])
  } else {
    Line::from(Span::styled("/ to filter", theme::muted()))
  }
}

impl Explorer {
  pub(super) fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
    if area != self.area {
      self.resize(area);
    }
    let regions = Regions::new(area);

    f.render_widget(Block::default().style(theme::bg_primary()), area);
    self.render_title(f, regions.title);
    self.render_browser(f, &regions);
    self.render_detail(f, &regions);
    self.render_status(f, regions.status);

    if self.detail.dialog.is_some() {
      self.render_dialog(f, area);
    }
    if self.focus.is(Focus::Picker) {
      self.render_picker(f, &regions);
    }
    if self.focus.help_visible() {
      self.render_help(f, area);
    }
    Ok(())
  }

  fn render_title(&self, f: &mut Frame<'_>, area: Rect) {
    let key = self.gate.current();
    let mut spans = vec![
      Span::styled(" bq-crafter ", theme::title()),
      Span::styled("│ ", theme::muted()),
      Span::styled(key.project.clone(), theme::key_hint()),
    ];
    if key.dataset.is_some() {
      spans.push(Span::styled(" │ ", theme::muted()));
      spans.push(Span::raw(key.qualified_name()));
    }
    if self.gate.in_flight_count() > 0 {
      spans.push(Span::styled(format!("  loading ({})", self.gate.in_flight_count()), theme::warning()));
    }
    f.render_widget(Paragraph::new(Line::from(spans)).style(theme::status_bar()), area);
  }

  fn render_browser(&self, f: &mut Frame<'_>, regions: &Regions) {
    let focused = self.focus.is(Focus::Browser) || self.focus.is(Focus::FilterInput);
    let title = match (self.browser.level(), self.browser.opened_dataset()) {
      (BrowserLevel::Tables, Some(dataset)) => {
        format!(" {dataset} › Tables{} ", loading_suffix(self.gate.is_loading(RequestKind::Tables)))
      },
      _ => format!(" Datasets{} ", loading_suffix(self.gate.is_loading(RequestKind::Datasets))),
    };
    f.render_widget(panel(title, focused), regions.browser);

    let editing = self.focus.is(Focus::FilterInput);
    f.render_widget(Paragraph::new(filter_line(self.browser.filter(), editing)), regions.browser_filter);

    let lines: Vec<Line> = match self.browser.level() {
      BrowserLevel::Datasets => {
        let list = &self.browser.datasets;
        list.page().map(|(pos, d)| self.browser_line(d.id.clone(), None, pos == list.cursor(), focused)).collect()
      },
      BrowserLevel::Tables => {
        let list = &self.browser.tables;
        list
          .page()
          .map(|(pos, t)| self.browser_line(t.id.clone(), Some(t.kind.as_str()), pos == list.cursor(), focused))
          .collect()
      },
    };

    if lines.is_empty() {
      let empty = if self.browser.filter().is_empty() { "Nothing here yet" } else { "No matches" };
      f.render_widget(Paragraph::new(Span::styled(empty, theme::muted())), regions.browser_list);
    } else {
      f.render_widget(Paragraph::new(lines), regions.browser_list);
    }
  }

  fn browser_line(&self, name: String, kind: Option<&str>, selected: bool, focused: bool) -> Line<'static> {
    let mut spans = vec![Span::raw(name)];
    if let Some(kind) = kind.filter(|k| !k.is_empty() && *k != "TABLE") {
      spans.push(Span::styled(format!(" [{}]", kind.to_lowercase()), theme::muted()));
    }
    let line = Line::from(spans);
    if selected {
      line.style(theme::selection(focused))
    } else {
      line
    }
  }

  fn render_detail(&self, f: &mut Frame<'_>, regions: &Regions) {
    let focused = self.focus.is(Focus::DetailPane);
    let key = self.gate.current();
    let title = match key.table {
      Some(_) => format!(" {} ", key.qualified_name()),
      None => " No table selected ".to_string(),
    };
    f.render_widget(panel(title, focused), regions.detail);

    let titles: Vec<String> = TabKind::ORDER
      .iter()
      .map(|tab| {
        let loading = match tab {
          TabKind::Schema => self.gate.is_loading(RequestKind::Schema),
          TabKind::Preview => self.gate.is_loading(RequestKind::Preview),
          TabKind::Results => self.gate.is_loading(RequestKind::Query),
          TabKind::Query => false,
        };
        format!("{tab}{}", loading_suffix(loading))
      })
      .collect();
    let selected = TabKind::ORDER.iter().position(|t| *t == self.detail.active()).unwrap_or(0);
    let tabs = Tabs::new(titles)
      .style(theme::tab_normal())
      .highlight_style(theme::tab_selected())
      .select(selected)
      .divider(" ");
    f.render_widget(tabs, regions.tabs);

    match self.detail.active_view() {
      Some(view) => self.render_grid(f, view, regions, focused),
      None => {
        let border = Block::default().borders(Borders::TOP).border_style(theme::border(self.detail.editor.is_focused()));
        let inner = border.inner(regions.tab_body);
        f.render_widget(border, regions.tab_body);
        f.render_widget(self.detail.editor.textarea(), inner);
      },
    }
  }

  fn render_grid(&self, f: &mut Frame<'_>, view: &TableView, regions: &Regions, focused: bool) {
    f.render_widget(Paragraph::new(filter_line(view.filter(), view.is_filter_editing())), regions.tab_filter);

    if view.headers().is_empty() {
      let message = match self.detail.active() {
        TabKind::Results => "Run a query from the Query tab",
        _ if self.gate.current().table.is_none() => "Select a table",
        _ => "Loading…",
      };
      f.render_widget(Paragraph::new(Span::styled(message, theme::muted())), regions.grid_rows);
      return;
    }

    let width = regions.grid_header.width as usize;
    let columns = visible_columns(view.widths(), view.h_offset(), width);

    let header_cells: Vec<(String, Style)> = columns
      .iter()
      .map(|c| {
        let text = view.headers().get(c.index).map(String::as_str).unwrap_or("");
        (clip_cell(text, view.widths()[c.index], c.skip, c.width), theme::header())
      })
      .collect();
    f.render_widget(Paragraph::new(positioned_line(&columns, header_cells)), regions.grid_header);

    let rows = view.rows();
    if rows.is_empty() {
      let message = if view.filter().is_empty() { "No rows" } else { "No matches" };
      f.render_widget(Paragraph::new(Span::styled(message, theme::muted())), regions.grid_rows);
      return;
    }

    let lines: Vec<Line> = rows
      .page()
      .map(|(pos, row)| {
        let on_cursor = pos == rows.cursor();
        let row_style = if on_cursor {
          theme::selection(focused)
        } else if view.visual().contains(pos) {
          theme::visual_range()
        } else {
          theme::bg_primary()
        };
        let cells = columns
          .iter()
          .map(|c| {
            let text = row.cells.get(c.index).map(String::as_str).unwrap_or("");
            let style = if on_cursor && c.index == view.col() && focused { theme::cell_cursor() } else { row_style };
            (clip_cell(text, view.widths()[c.index], c.skip, c.width), style)
          })
          .collect();
        positioned_line(&columns, cells).style(row_style)
      })
      .collect();
    f.render_widget(Paragraph::new(lines), regions.grid_rows);
  }

  fn render_status(&self, f: &mut Frame<'_>, area: Rect) {
    let line = match &self.status {
      Some(status) => {
        let style = match status.level {
          StatusLevel::Info => theme::success(),
          StatusLevel::Error => theme::error(),
        };
        Line::from(Span::styled(format!(" {}", status.text), style))
      },
      None => self.key_hints(),
    };
    f.render_widget(Paragraph::new(line).style(theme::status_bar()), area);
  }

  fn key_hints(&self) -> Line<'static> {
    let hints = [
      (Command::ToggleHelp, "help"),
      (Command::OpenPicker, "project"),
      (Command::Filter, "filter"),
      (Command::NextTab, "tab"),
      (Command::Copy, "copy"),
      (Command::Quit, "quit"),
    ];
    let mut spans = vec![Span::raw(" ")];
    for (command, label) in hints {
      if let Some(key) = self.config.keybindings.labels_for(command).first() {
        spans.push(Span::styled(key.clone(), theme::key_hint()));
        spans.push(Span::styled(format!(" {label}  "), theme::muted()));
      }
    }
    Line::from(spans)
  }

  fn render_dialog(&self, f: &mut Frame<'_>, area: Rect) {
    let Some(dialog) = &self.detail.dialog else {
      return;
    };
    let popup = centered_rect(50, 40, area);
    f.render_widget(Clear, popup);

    let mut lines = vec![Line::from(Span::styled(format!("Query column {}", dialog.column), theme::muted())), Line::raw("")];
    lines.extend(dialog.options.iter().enumerate().map(|(i, option)| {
      let line = Line::raw(format!(" {option} "));
      if i == dialog.cursor {
        line.style(theme::selection(true))
      } else {
        line
      }
    }));
    f.render_widget(Paragraph::new(lines).block(panel(" Column query ".to_string(), true)), popup);
  }

  fn render_picker(&self, f: &mut Frame<'_>, regions: &Regions) {
    f.render_widget(Clear, regions.picker);
    let title = format!(" Projects{} ", loading_suffix(self.gate.is_loading(RequestKind::Projects)));
    f.render_widget(panel(title, true), regions.picker);
    f.render_widget(Paragraph::new(filter_line(self.picker.filter(), true)), regions.picker_input);

    let current = self.project();
    let lines: Vec<Line> = self
      .picker
      .page()
      .map(|(pos, project)| {
        let mut spans = vec![Span::raw(project.id.clone())];
        if project.name != project.id {
          spans.push(Span::styled(format!("  {}", project.name), theme::muted()));
        }
        if project.id == current {
          spans.push(Span::styled("  (current)", theme::data_type()));
        }
        let line = Line::from(spans);
        if pos == self.picker.cursor() {
          line.style(theme::selection(true))
        } else {
          line
        }
      })
      .collect();
    f.render_widget(Paragraph::new(lines), regions.picker_list);
  }

  fn render_help(&self, f: &mut Frame<'_>, area: Rect) {
    let popup = centered_rect(70, 80, area);
    f.render_widget(Clear, popup);

    let commands = [
      (Command::Up, "Move up"),
      (Command::Down, "Move down"),
      (Command::Left, "Back / column left"),
      (Command::Right, "Open / column right"),
      (Command::Top, "First row"),
      (Command::Bottom, "Last row"),
      (Command::PageUp, "Page up"),
      (Command::PageDown, "Page down"),
      (Command::FirstColumn, "First column"),
      (Command::LastColumn, "Last column"),
      (Command::Select, "Open / select"),
      (Command::Back, "Back to browser"),
      (Command::Filter, "Filter"),
      (Command::NextTab, "Next tab"),
      (Command::PrevTab, "Previous tab"),
      (Command::ToggleVisual, "Visual row selection"),
      (Command::Copy, "Copy"),
      (Command::Refresh, "Refresh"),
      (Command::ExecuteQuery, "Run query"),
      (Command::OpenPicker, "Switch project"),
      (Command::ToggleHelp, "Toggle help"),
      (Command::Suspend, "Suspend"),
      (Command::Quit, "Quit"),
    ];
    let lines: Vec<Line> = commands
      .iter()
      .map(|(command, description)| {
        let keys = self.config.keybindings.labels_for(*command).join(" ");
        Line::from(vec![Span::styled(format!("{keys:>22}  "), theme::key_hint()), Span::raw(*description)])
      })
      .collect();
    let help = Paragraph::new(lines).block(panel(" Help (Esc to close) ".to_string(), true)).wrap(Wrap { trim: false });
    f.render_widget(help, popup);
  }
}

/// Lays out clipped cells at their column positions with single-space gaps.
fn positioned_line(
  columns: &[crate::nav::layout::VisibleColumn],
  cells: Vec<(String, Style)>,
) -> Line<'static> {
  let mut spans = Vec::with_capacity(cells.len() * 2);
  let mut x = 0;
  for (column, (text, style)) in columns.iter().zip(cells) {
    if column.x > x {
      spans.push(Span::raw(" ".repeat(column.x - x)));
    }
    spans.push(Span::styled(text, style));
    x = column.x + column.width;
  }
  Line::from(spans)
}
