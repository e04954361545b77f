use color_eyre::eyre::Result;
use ratatui::layout::Rect;

use super::{rendering::Regions, Explorer};
use crate::{
  action::{Action, FetchOutcome},
  catalog::Payload,
  config::Config,
  nav::{
    browser::BrowserLevel,
    gate::{PendingRequest, RequestKind, SelectionKey, Verdict},
  },
};

impl Explorer {
  pub(super) fn register_config_handler(&mut self, config: Config) -> Result<()> {
    self.detail.set_layout(config.layout.column_layout());
    self.config = config;
    Ok(())
  }

  pub(super) fn init(&mut self, area: Rect) -> Result<()> {
    self.resize(area);
    let key = SelectionKey::project(self.project());
    self.fetch(RequestKind::Datasets, key);
    Ok(())
  }

  pub(super) fn update(&mut self, action: Action) -> Result<Option<Action>> {
    match action {
      Action::Fetched { request, outcome } => self.on_fetched(request, outcome),
      Action::Resize(w, h) => self.resize(Rect::new(0, 0, w, h)),
      Action::Error(message) => self.error(message),
      Action::Notify(message) => self.info(message),
      _ => {},
    }
    Ok(None)
  }

  /// Recomputes every page size and view width from the screen size.
  pub(super) fn resize(&mut self, area: Rect) {
    self.area = area;
    let regions = Regions::new(area);
    self.browser.set_page_size(regions.browser_list.height as usize);
    self.picker.set_page_size(regions.picker_list.height as usize);
    let (width, height) = (regions.grid_rows.width as usize, regions.grid_rows.height as usize);
    self.detail.schema.resize(width, height);
    self.detail.preview.resize(width, height);
    self.detail.results.resize(width, height);
  }

  fn on_fetched(&mut self, request: PendingRequest, outcome: FetchOutcome) {
    match outcome {
      FetchOutcome::Loaded(payload) => {
        if self.gate.accept(&request) == Verdict::Accepted {
          self.apply(&request, payload);
        }
      },
      FetchOutcome::Failed(message) => {
        if self.gate.fail(&request) == Verdict::Accepted {
          self.error(format!("{} failed: {message}", request.kind));
        }
      },
    }
  }

  fn apply(&mut self, request: &PendingRequest, payload: Payload) {
    match payload {
      Payload::Projects(projects) => self.picker.set_items(projects),
      Payload::SwitchedProject(project) => {
        self.info(format!("Switched to {project}"));
        self.fetch(RequestKind::Datasets, SelectionKey::project(project));
      },
      Payload::Datasets(datasets) => self.browser.set_datasets(datasets),
      Payload::Tables(tables) => {
        if self.browser.opened_dataset() == request.key.dataset.as_deref() {
          self.browser.set_tables(tables);
          if self.browser.level() == BrowserLevel::Tables {
            self.on_hover();
          }
        }
      },
      Payload::Schema(schema) => self.detail.set_schema(&schema),
      Payload::Preview(rows) => self.detail.set_preview(rows),
      Payload::Query(rows) => {
        self.info(format!("{} rows", rows.rows.len()));
        self.detail.set_results(rows);
      },
    }
  }

  /// Keeps the selection and the detail pane in step with the table under
  /// the browser cursor, fetching what has not been fetched for it yet.
  pub(super) fn on_hover(&mut self) {
    let Some(table) = self.browser.current_table() else {
      return;
    };
    let key = SelectionKey::table(&table.project_id, &table.dataset_id, &table.id);
    if &key != self.gate.current() {
      self.gate.select(key.clone());
      self.clear_table_detail();
    }
    for kind in [RequestKind::Schema, RequestKind::Preview] {
      if self.gate.is_new(kind, &key) {
        self.fetch(kind, key.clone());
      }
    }
  }

  /// Drops the shown schema and preview. They are no longer on screen, so the
  /// next hover of any table must fetch them again.
  pub(super) fn clear_table_detail(&mut self) {
    self.detail.clear_table();
    self.gate.forget(RequestKind::Schema);
    self.gate.forget(RequestKind::Preview);
  }
}
