//! Local metadata cache for dataset lists, table lists and schemas.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use color_eyre::eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};

use crate::{
  catalog::Payload,
  nav::gate::{PendingRequest, RequestKind, SelectionKey},
};

const MAX_TTL_HOURS: u64 = 24 * 365 * 10;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
  pub kind: RequestKind,
  pub key: SelectionKey,
}

impl CacheKey {
  /// Only catalog metadata is cached; row data and query results never are.
  pub fn for_request(request: &PendingRequest) -> Option<Self> {
    match request.kind {
      RequestKind::Datasets | RequestKind::Tables | RequestKind::Schema => {
        Some(Self { kind: request.kind, key: request.key.scoped(request.kind) })
      },
      _ => None,
    }
  }

  fn file_name(&self) -> String {
    let mut parts = vec![self.kind.to_string().to_lowercase(), sanitize(&self.key.project)];
    if let Some(dataset) = &self.key.dataset {
      parts.push(sanitize(dataset));
    }
    if let Some(table) = &self.key.table {
      parts.push(sanitize(table));
    }
    format!("{}.json", parts.join("_"))
  }
}

/// Percent-escapes every byte outside `[A-Za-z0-9-]`, so `_` stays free to
/// separate parts and distinct ids never share a file.
fn sanitize(part: &str) -> String {
  part
    .bytes()
    .map(|b| if b.is_ascii_alphanumeric() || b == b'-' { char::from(b).to_string() } else { format!("%{b:02X}") })
    .collect()
}

pub trait CatalogCache: Send + Sync {
  fn get(&self, key: &CacheKey) -> Option<Payload>;
  fn put(&self, key: &CacheKey, payload: &Payload);
  fn invalidate(&self, key: &CacheKey);
}

/// Cache that never holds anything, used with `--no-cache`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl CatalogCache for NoCache {
  fn get(&self, _key: &CacheKey) -> Option<Payload> {
    None
  }

  fn put(&self, _key: &CacheKey, _payload: &Payload) {}

  fn invalidate(&self, _key: &CacheKey) {}
}

#[derive(Debug, Serialize, Deserialize)]
struct Entry {
  cached_at: DateTime<Utc>,
  payload: Payload,
}

/// One JSON file per key. Failures are logged and treated as misses.
#[derive(Debug, Clone)]
pub struct DiskCache {
  dir: PathBuf,
  ttl: Duration,
}

impl DiskCache {
  pub fn new(dir: impl Into<PathBuf>, ttl_hours: u64) -> Self {
    let ttl = Duration::hours(ttl_hours.min(MAX_TTL_HOURS) as i64);
    Self { dir: dir.into(), ttl }
  }

  pub fn dir(&self) -> &Path {
    &self.dir
  }

  fn path(&self, key: &CacheKey) -> PathBuf {
    self.dir.join(key.file_name())
  }

  fn read(&self, key: &CacheKey) -> Result<Option<Payload>> {
    let path = self.path(key);
    if !path.exists() {
      return Ok(None);
    }
    let raw = std::fs::read_to_string(&path).wrap_err_with(|| format!("read {}", path.display()))?;
    let entry: Entry = serde_json::from_str(&raw).wrap_err_with(|| format!("parse {}", path.display()))?;
    if Utc::now().signed_duration_since(entry.cached_at) > self.ttl {
      tracing::debug!("cache entry {} expired", path.display());
      return Ok(None);
    }
    Ok(Some(entry.payload))
  }

  fn write(&self, key: &CacheKey, payload: &Payload) -> Result<()> {
    std::fs::create_dir_all(&self.dir).wrap_err_with(|| format!("create {}", self.dir.display()))?;
    let entry = Entry { cached_at: Utc::now(), payload: payload.clone() };
    let path = self.path(key);
    std::fs::write(&path, serde_json::to_string_pretty(&entry)?).wrap_err_with(|| format!("write {}", path.display()))?;
    Ok(())
  }
}

impl CatalogCache for DiskCache {
  fn get(&self, key: &CacheKey) -> Option<Payload> {
    match self.read(key) {
      Ok(payload) => payload,
      Err(e) => {
        tracing::warn!("cache read failed: {e:#}");
        None
      },
    }
  }

  fn put(&self, key: &CacheKey, payload: &Payload) {
    if let Err(e) = self.write(key, payload) {
      tracing::warn!("cache write failed: {e:#}");
    }
  }

  fn invalidate(&self, key: &CacheKey) {
    let path = self.path(key);
    if let Err(e) = std::fs::remove_file(&path) {
      if e.kind() != std::io::ErrorKind::NotFound {
        tracing::warn!("cache invalidate failed for {}: {e}", path.display());
      }
    }
  }
}
