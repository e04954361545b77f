//! Bookkeeping for fetches that run concurrently with the input loop.
//!
//! Every fetch is tagged with the selection it was issued for. When the
//! result comes back it is compared with whatever is selected *then*, at the
//! granularity the result applies to, and dropped if the user has moved on.
//! Requests are never cancelled; superseded ones run to completion and are
//! discarded here.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum::Display;

/// What the user is currently looking at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectionKey {
  pub project: String,
  pub dataset: Option<String>,
  pub table: Option<String>,
}

impl SelectionKey {
  pub fn project(project: impl Into<String>) -> Self {
    Self { project: project.into(), dataset: None, table: None }
  }

  pub fn dataset(project: impl Into<String>, dataset: impl Into<String>) -> Self {
    Self { project: project.into(), dataset: Some(dataset.into()), table: None }
  }

  pub fn table(project: impl Into<String>, dataset: impl Into<String>, table: impl Into<String>) -> Self {
    Self { project: project.into(), dataset: Some(dataset.into()), table: Some(table.into()) }
  }

  pub fn with_table(&self, table: impl Into<String>) -> Self {
    Self { table: Some(table.into()), ..self.clone() }
  }

  /// The part of the key a result of `kind` depends on.
  pub fn scoped(&self, kind: RequestKind) -> Self {
    match kind.granularity() {
      Granularity::Global => Self::default(),
      Granularity::Project => Self::project(self.project.clone()),
      Granularity::Dataset => Self { table: None, ..self.clone() },
      Granularity::Table => self.clone(),
    }
  }

  /// `project.dataset.table`, as far as the key goes.
  pub fn qualified_name(&self) -> String {
    [Some(self.project.as_str()), self.dataset.as_deref(), self.table.as_deref()]
      .into_iter()
      .flatten()
      .collect::<Vec<_>>()
      .join(".")
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Granularity {
  Global,
  Project,
  Dataset,
  Table,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum RequestKind {
  Projects,
  SwitchProject,
  Datasets,
  Tables,
  Schema,
  Preview,
  Query,
}

impl RequestKind {
  fn granularity(self) -> Granularity {
    match self {
      RequestKind::Projects => Granularity::Global,
      RequestKind::SwitchProject | RequestKind::Datasets | RequestKind::Query => Granularity::Project,
      RequestKind::Tables => Granularity::Dataset,
      RequestKind::Schema | RequestKind::Preview => Granularity::Table,
    }
  }
}

/// A fetch that has been dispatched and not yet consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRequest {
  pub id: u64,
  pub kind: RequestKind,
  /// Selection the request was issued against.
  pub key: SelectionKey,
  /// SQL text, for `RequestKind::Query` only.
  pub query: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
  Accepted,
  Stale,
}

#[derive(Debug, Default)]
pub struct RequestGate {
  current: SelectionKey,
  next_id: u64,
  in_flight: HashMap<u64, PendingRequest>,
  last_issued: HashMap<RequestKind, SelectionKey>,
  latest_query: Option<u64>,
}

impl RequestGate {
  pub fn new(current: SelectionKey) -> Self {
    Self { current, ..Self::default() }
  }

  pub fn current(&self) -> &SelectionKey {
    &self.current
  }

  /// Changes the selection. Only ever called from user input.
  pub fn select(&mut self, key: SelectionKey) {
    self.current = key;
  }

  /// True when no fetch of `kind` has been issued for `key` yet, or the last
  /// one was for a different key. Used to skip redundant hover fetches.
  pub fn is_new(&self, kind: RequestKind, key: &SelectionKey) -> bool {
    self.last_issued.get(&kind) != Some(&key.scoped(kind))
  }

  /// Registers a fetch. Returns `None` if an identical `(kind, key)` fetch is
  /// still outstanding; queries are never merged since their text differs.
  pub fn issue(&mut self, kind: RequestKind, key: SelectionKey) -> Option<PendingRequest> {
    self.issue_with(kind, key, None)
  }

  pub fn issue_query(&mut self, key: SelectionKey, sql: String) -> PendingRequest {
    let request = self.allocate(RequestKind::Query, key, Some(sql));
    self.latest_query = Some(request.id);
    request
  }

  fn issue_with(&mut self, kind: RequestKind, key: SelectionKey, query: Option<String>) -> Option<PendingRequest> {
    let scoped = key.scoped(kind);
    if self.in_flight.values().any(|r| r.kind == kind && r.key.scoped(kind) == scoped) {
      self.last_issued.insert(kind, scoped);
      return None;
    }
    Some(self.allocate(kind, key, query))
  }

  fn allocate(&mut self, kind: RequestKind, key: SelectionKey, query: Option<String>) -> PendingRequest {
    self.next_id += 1;
    let request = PendingRequest { id: self.next_id, kind, key, query };
    self.last_issued.insert(kind, request.key.scoped(kind));
    self.in_flight.insert(request.id, request.clone());
    request
  }

  /// Consumes a successful result. The key is compared with the selection
  /// that is current now, not the one at issue time.
  pub fn accept(&mut self, request: &PendingRequest) -> Verdict {
    if self.in_flight.remove(&request.id).is_none() {
      return Verdict::Stale;
    }
    self.verdict(request)
  }

  /// Consumes a failed result. A failure that still matters also forgets the
  /// de-duplication memory so re-triggering the same action retries.
  pub fn fail(&mut self, request: &PendingRequest) -> Verdict {
    if self.in_flight.remove(&request.id).is_none() {
      return Verdict::Stale;
    }
    let verdict = self.verdict(request);
    if verdict == Verdict::Accepted {
      self.last_issued.remove(&request.kind);
    }
    verdict
  }

  /// Forgets de-duplication memory for `kind`, e.g. after a forced refresh.
  pub fn forget(&mut self, kind: RequestKind) {
    self.last_issued.remove(&kind);
  }

  /// A kind is loading while a fetch for it matches the current selection.
  pub fn is_loading(&self, kind: RequestKind) -> bool {
    self.in_flight.values().any(|r| r.kind == kind && self.is_relevant(r))
  }

  pub fn in_flight_count(&self) -> usize {
    self.in_flight.len()
  }

  fn verdict(&self, request: &PendingRequest) -> Verdict {
    if self.is_relevant(request) {
      Verdict::Accepted
    } else {
      tracing::trace!(id = request.id, kind = %request.kind, key = ?request.key, "dropping stale result");
      Verdict::Stale
    }
  }

  fn is_relevant(&self, request: &PendingRequest) -> bool {
    if request.kind == RequestKind::Query && self.latest_query != Some(request.id) {
      return false;
    }
    request.key.scoped(request.kind) == self.current.scoped(request.kind)
  }
}
