use std::sync::Arc;

use color_eyre::eyre::Result;
use ratatui::prelude::Rect;
use tokio::sync::mpsc::{self, UnboundedSender};

use crate::{
  action::{Action, FetchOutcome},
  cache::{CacheKey, CatalogCache},
  catalog::{self, Catalog},
  clipboard::Clipboard,
  components::{explorer::Explorer, Component},
  config::Config,
  nav::gate::PendingRequest,
  tui,
};

pub struct App {
  pub config: Config,
  pub tick_rate: f64,
  pub frame_rate: f64,
  pub components: Vec<Box<dyn Component>>,
  pub should_quit: bool,
  pub should_suspend: bool,
  catalog: Arc<dyn Catalog>,
  cache: Arc<dyn CatalogCache>,
  clipboard: Arc<dyn Clipboard>,
}

impl App {
  pub fn new(
    config: Config,
    project: &str,
    catalog: Arc<dyn Catalog>,
    cache: Arc<dyn CatalogCache>,
    clipboard: Arc<dyn Clipboard>,
  ) -> Self {
    let explorer = Explorer::new_with_config(project, Some(config.clone()));
    Self {
      tick_rate: 1.0,
      frame_rate: 4.0,
      components: vec![Box::new(explorer)],
      should_quit: false,
      should_suspend: false,
      config,
      catalog,
      cache,
      clipboard,
    }
  }

  pub fn tick_rate(mut self, tick_rate: f64) -> Self {
    self.tick_rate = tick_rate;
    self
  }

  pub fn frame_rate(mut self, frame_rate: f64) -> Self {
    self.frame_rate = frame_rate;
    self
  }

  pub async fn run(&mut self) -> Result<()> {
    let (action_tx, mut action_rx) = mpsc::unbounded_channel();

    let mut tui = tui::Tui::new()?.tick_rate(self.tick_rate).frame_rate(self.frame_rate).paste(true);
    tui.enter()?;

    for component in self.components.iter_mut() {
      component.register_action_handler(action_tx.clone())?;
    }

    for component in self.components.iter_mut() {
      component.register_config_handler(self.config.clone())?;
    }

    let size = tui.size()?;
    for component in self.components.iter_mut() {
      component.init(Rect::new(0, 0, size.width, size.height))?;
    }

    loop {
      if let Some(e) = tui.next().await {
        match e {
          tui::Event::Quit => action_tx.send(Action::Quit)?,
          tui::Event::Tick => action_tx.send(Action::Tick)?,
          tui::Event::Render => action_tx.send(Action::Render)?,
          tui::Event::Resize(x, y) => action_tx.send(Action::Resize(x, y))?,
          _ => {},
        }
        for component in self.components.iter_mut() {
          if let Some(action) = component.handle_events(Some(e.clone()))? {
            action_tx.send(action)?;
          }
        }
      }

      while let Ok(action) = action_rx.try_recv() {
        if action != Action::Tick && action != Action::Render {
          tracing::debug!("{action}");
        }
        match action {
          Action::Quit => self.should_quit = true,
          Action::Suspend => self.should_suspend = true,
          Action::Resume => self.should_suspend = false,
          Action::Resize(w, h) => {
            tui.resize(Rect::new(0, 0, w, h))?;
            self.render(&mut tui, &action_tx)?;
          },
          Action::Render => self.render(&mut tui, &action_tx)?,
          Action::Fetch(ref request) => self.spawn_fetch(request.clone(), false, &action_tx),
          Action::Refetch(ref request) => self.spawn_fetch(request.clone(), true, &action_tx),
          Action::CopyToClipboard(ref text) => {
            dispatch(&action_tx, copy_to_clipboard(self.clipboard.as_ref(), text));
          },
          _ => {},
        }
        for component in self.components.iter_mut() {
          if let Some(action) = component.update(action.clone())? {
            action_tx.send(action)?
          };
        }
      }

      if self.should_suspend {
        tui.suspend()?;
        action_tx.send(Action::Resume)?;
        tui = tui::Tui::new()?.tick_rate(self.tick_rate).frame_rate(self.frame_rate).paste(true);
        tui.enter()?;
      } else if self.should_quit {
        tui.stop()?;
        break;
      }
    }
    tui.exit()?;
    Ok(())
  }

  fn render(&mut self, tui: &mut tui::Tui, action_tx: &UnboundedSender<Action>) -> Result<()> {
    tui.draw(|f| {
      for component in self.components.iter_mut() {
        if let Err(e) = component.draw(f, f.area()) {
          dispatch(action_tx, Action::Error(format!("Failed to draw: {e:?}")));
        }
      }
    })?;
    Ok(())
  }

  fn spawn_fetch(&self, request: PendingRequest, refetch: bool, tx: &UnboundedSender<Action>) {
    let catalog = self.catalog.clone();
    let cache = self.cache.clone();
    let preview_rows = self.config.layout.preview_rows;
    let tx = tx.clone();
    tokio::spawn(async move {
      let action = fetch(catalog.as_ref(), cache.as_ref(), request, refetch, preview_rows).await;
      dispatch(&tx, action);
    });
  }
}

/// Runs one catalog request, going through the cache for the kinds it
/// holds. A refetch drops the cached copy first. Never fails: errors come
/// back as `FetchOutcome::Failed` tagged with the request.
pub async fn fetch(
  catalog: &dyn Catalog,
  cache: &dyn CatalogCache,
  request: PendingRequest,
  refetch: bool,
  preview_rows: usize,
) -> Action {
  let cache_key = CacheKey::for_request(&request);
  if let Some(key) = &cache_key {
    if refetch {
      cache.invalidate(key);
    } else if let Some(payload) = cache.get(key) {
      tracing::debug!("cache hit for {} {}", request.kind, request.key.qualified_name());
      return Action::Fetched { request, outcome: FetchOutcome::Loaded(payload) };
    }
  }

  let outcome = match catalog::execute(catalog, &request, preview_rows).await {
    Ok(payload) => {
      if let Some(key) = &cache_key {
        cache.put(key, &payload);
      }
      FetchOutcome::Loaded(payload)
    },
    Err(e) => {
      tracing::error!("{} request {} failed: {e:?}", request.kind, request.id);
      FetchOutcome::Failed(e.to_string())
    },
  };
  Action::Fetched { request, outcome }
}

pub fn copy_to_clipboard(clipboard: &dyn Clipboard, text: &str) -> Action {
  match clipboard.write_text(text) {
    Ok(()) => {
      let lines = text.lines().count();
      if lines > 1 {
        Action::Notify(format!("Copied {lines} lines"))
      } else {
        Action::Notify(format!("Copied {text}"))
      }
    },
    Err(e) => Action::Error(format!("{e}")),
  }
}

pub fn dispatch(tx: &UnboundedSender<Action>, action: Action) {
  if let Err(e) = tx.send(action) {
    tracing::error!("Error dispatching: {e:?}");
  }
}
