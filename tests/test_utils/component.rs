use bq_crafter::{
    action::{Action, FetchOutcome},
    app,
    cache::NoCache,
    catalog::Payload,
    components::{explorer::Explorer, Component},
    config::Config,
    nav::gate::PendingRequest,
    tui::Event,
};
use color_eyre::Result;
use crossterm::event::Event as TermEvent;
use ratatui::{backend::TestBackend, layout::Rect, Terminal};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::{FakeCatalog, TEST_PROJECT, TEST_TERMINAL_HEIGHT, TEST_TERMINAL_WIDTH};

pub struct ComponentTestHarness<C: Component> {
    pub component: C,
    pub terminal: Terminal<TestBackend>,
    pub action_tx: UnboundedSender<Action>,
    pub action_rx: UnboundedReceiver<Action>,
    /// Non-fetch actions the component sent to the app loop.
    pub dispatched: Vec<Action>,
    /// Fetches taken off the channel and not served yet, with their refetch flag.
    pub pending: Vec<(PendingRequest, bool)>,
}

impl<C: Component> ComponentTestHarness<C> {
    pub fn new(mut component: C) -> Result<Self> {
        let backend = TestBackend::new(TEST_TERMINAL_WIDTH, TEST_TERMINAL_HEIGHT);
        let terminal = Terminal::new(backend)?;
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        // Register action handler
        component.register_action_handler(action_tx.clone())?;

        // Initialize component with terminal area
        let area = Rect::new(0, 0, TEST_TERMINAL_WIDTH, TEST_TERMINAL_HEIGHT);
        component.init(area)?;

        Ok(Self { component, terminal, action_tx, action_rx, dispatched: Vec::new(), pending: Vec::new() })
    }

    pub fn with_config(mut self, config: Config) -> Result<Self> {
        self.component.register_config_handler(config)?;
        Ok(self)
    }

    pub fn render(&mut self) -> Result<Vec<String>> {
        self.terminal.draw(|f| {
            self.component.draw(f, f.area()).unwrap();
        })?;
        Ok(self.get_buffer_content())
    }

    pub fn send_key_event(&mut self, key: crossterm::event::KeyEvent) -> Result<Option<Action>> {
        self.component.handle_key_events(key)
    }

    pub fn send_event(&mut self, event: Event) -> Result<Option<Action>> {
        self.component.handle_events(Some(event))
    }

    /// Feeds key events the way the app loop does and returns what the
    /// component handed back, minus plain re-render requests.
    pub fn send_events(&mut self, events: Vec<TermEvent>) -> Result<Vec<Action>> {
        let mut returned = Vec::new();
        for event in events {
            if let TermEvent::Key(key) = event {
                if let Some(action) = self.send_key_event(key)? {
                    if action != Action::Render {
                        returned.push(action);
                    }
                }
            }
        }
        self.collect_actions();
        Ok(returned)
    }

    pub fn update(&mut self, action: Action) -> Result<Option<Action>> {
        self.component.update(action)
    }

    /// Moves everything from the channel into `pending` and `dispatched`.
    pub fn collect_actions(&mut self) {
        while let Ok(action) = self.action_rx.try_recv() {
            match action {
                Action::Fetch(request) => self.pending.push((request, false)),
                Action::Refetch(request) => self.pending.push((request, true)),
                other => self.dispatched.push(other),
            }
        }
    }

    pub fn take_pending(&mut self) -> Vec<PendingRequest> {
        self.collect_actions();
        self.pending.drain(..).map(|(request, _)| request).collect()
    }

    pub fn get_buffer_content(&self) -> Vec<String> {
        let buffer = self.terminal.backend().buffer();
        let mut lines = Vec::new();

        for y in 0..TEST_TERMINAL_HEIGHT {
            let mut line = String::new();
            for x in 0..TEST_TERMINAL_WIDTH {
                let cell = &buffer[(x, y)];
                line.push_str(cell.symbol());
            }
            lines.push(line.trim_end().to_string());
        }

        lines
    }
}

impl ComponentTestHarness<Explorer> {
    pub fn explorer() -> Result<Self> {
        Self::new(Explorer::new(TEST_PROJECT))
    }

    /// Datasets loaded, the first dataset opened and its first table hovered
    /// with schema and preview in place.
    pub async fn browsing(catalog: &FakeCatalog) -> Result<Self> {
        let mut harness = Self::explorer()?;
        harness.serve(catalog).await?;
        harness.send_events(super::EventBuilder::new().enter().build())?;
        harness.serve(catalog).await?;
        Ok(harness)
    }

    pub fn deliver(&mut self, request: PendingRequest, payload: Payload) -> Result<()> {
        self.update(Action::Fetched { request, outcome: FetchOutcome::Loaded(payload) })?;
        self.collect_actions();
        Ok(())
    }

    pub fn deliver_error(&mut self, request: PendingRequest, message: &str) -> Result<()> {
        self.update(Action::Fetched { request, outcome: FetchOutcome::Failed(message.to_string()) })?;
        self.collect_actions();
        Ok(())
    }

    /// Answers every outstanding fetch from `catalog`, in issue order, until
    /// no new fetch is issued. Returns how many were served.
    pub async fn serve(&mut self, catalog: &FakeCatalog) -> Result<usize> {
        let mut served = 0;
        loop {
            self.collect_actions();
            if self.pending.is_empty() {
                return Ok(served);
            }
            let batch: Vec<_> = self.pending.drain(..).collect();
            for (request, refetch) in batch {
                let action = app::fetch(catalog, &NoCache, request, refetch, 100).await;
                self.update(action)?;
                served += 1;
            }
        }
    }

    /// The last status line message, if any.
    pub fn status_text(&self) -> Option<&str> {
        self.component.status.as_ref().map(|s| s.text.as_str())
    }
}
