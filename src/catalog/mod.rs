pub mod bigquery;
pub mod gcloud;

use async_trait::async_trait;
use color_eyre::eyre::{eyre, Result};
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::nav::{
  gate::{PendingRequest, RequestKind},
  list::Filterable,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
  pub id: String,
  pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
  pub id: String,
  pub project_id: String,
  pub location: String,
  pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
  pub id: String,
  pub dataset_id: String,
  pub project_id: String,
  pub kind: String,
  pub num_rows: Option<u64>,
  pub num_bytes: Option<i64>,
  pub description: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum ColumnMode {
  #[default]
  Nullable,
  Required,
  Repeated,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
  pub name: String,
  pub data_type: String,
  pub mode: ColumnMode,
  pub description: String,
  pub fields: Vec<Column>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
  pub fields: Vec<Column>,
}

/// Rows rendered to display text, one `Vec` per row aligned with `headers`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSet {
  pub headers: Vec<String>,
  pub rows: Vec<Vec<String>>,
}

/// A successful fetch result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payload {
  Projects(Vec<Project>),
  SwitchedProject(String),
  Datasets(Vec<Dataset>),
  Tables(Vec<Table>),
  Schema(TableSchema),
  Preview(RowSet),
  Query(RowSet),
}

impl Filterable for Project {
  fn filter_fields(&self) -> Vec<&str> {
    vec![self.id.as_str(), self.name.as_str()]
  }
}

impl Filterable for Dataset {
  fn filter_fields(&self) -> Vec<&str> {
    vec![self.id.as_str()]
  }
}

impl Filterable for Table {
  fn filter_fields(&self) -> Vec<&str> {
    vec![self.id.as_str()]
  }
}

/// Remote catalog and query backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Catalog: Send + Sync {
  async fn list_projects(&self) -> Result<Vec<Project>>;
  async fn list_datasets(&self, project: &str) -> Result<Vec<Dataset>>;
  async fn list_tables(&self, project: &str, dataset: &str) -> Result<Vec<Table>>;
  async fn get_schema(&self, project: &str, dataset: &str, table: &str) -> Result<TableSchema>;
  async fn preview_rows(&self, project: &str, dataset: &str, table: &str, limit: usize) -> Result<RowSet>;
  async fn run_query(&self, project: &str, sql: &str) -> Result<RowSet>;
  async fn switch_project(&self, project: &str) -> Result<()>;
}

/// Runs the catalog call a request stands for.
pub async fn execute(catalog: &dyn Catalog, request: &PendingRequest, preview_limit: usize) -> Result<Payload> {
  let key = &request.key;
  let dataset = || key.dataset.as_deref().ok_or_else(|| eyre!("{} request without a dataset", request.kind));
  let table = || key.table.as_deref().ok_or_else(|| eyre!("{} request without a table", request.kind));

  let payload = match request.kind {
    RequestKind::Projects => Payload::Projects(catalog.list_projects().await?),
    RequestKind::SwitchProject => {
      catalog.switch_project(&key.project).await?;
      Payload::SwitchedProject(key.project.clone())
    },
    RequestKind::Datasets => Payload::Datasets(catalog.list_datasets(&key.project).await?),
    RequestKind::Tables => Payload::Tables(catalog.list_tables(&key.project, dataset()?).await?),
    RequestKind::Schema => Payload::Schema(catalog.get_schema(&key.project, dataset()?, table()?).await?),
    RequestKind::Preview => {
      Payload::Preview(catalog.preview_rows(&key.project, dataset()?, table()?, preview_limit).await?)
    },
    RequestKind::Query => {
      let sql = request.query.as_deref().ok_or_else(|| eyre!("query request without SQL"))?;
      Payload::Query(catalog.run_query(&key.project, sql).await?)
    },
  };
  Ok(payload)
}
