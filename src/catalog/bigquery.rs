//! BigQuery v2 REST backend.

use std::{path::PathBuf, time::Duration};

use async_trait::async_trait;
use color_eyre::eyre::{eyre, Result, WrapErr};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;

use super::{gcloud, Catalog, Column, ColumnMode, Dataset, Project, RowSet, Table, TableSchema};

const API_ROOT: &str = "https://bigquery.googleapis.com/bigquery/v2";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const QUERY_WAIT_MS: u64 = 10_000;
const QUERY_ROW_LIMIT: usize = 10_000;

static NULL: Value = Value::Null;

#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
  pub access_token: Option<String>,
  pub credentials: Option<PathBuf>,
  pub emulator: Option<String>,
}

enum Auth {
  Anonymous,
  Static(String),
  Gcloud(RwLock<Option<String>>),
}

pub struct BigQueryClient {
  http: reqwest::Client,
  base_url: String,
  auth: Auth,
  emulated: bool,
  default_project: String,
}

impl BigQueryClient {
  pub async fn connect(project: &str, options: ClientOptions) -> Result<Self> {
    let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build().wrap_err("build HTTP client")?;

    let (base_url, auth) = match (&options.emulator, &options.access_token) {
      (Some(endpoint), _) => (emulator_root(endpoint), Auth::Anonymous),
      (None, Some(token)) => (API_ROOT.to_string(), Auth::Static(token.clone())),
      (None, None) => {
        if let Some(key_file) = &options.credentials {
          gcloud::activate_service_account(key_file).await?;
        }
        (API_ROOT.to_string(), Auth::Gcloud(RwLock::new(None)))
      },
    };

    tracing::info!("using BigQuery endpoint {base_url}");
    Ok(Self { http, base_url, auth, emulated: options.emulator.is_some(), default_project: project.to_string() })
  }

  async fn token(&self, refresh: bool) -> Result<Option<String>> {
    match &self.auth {
      Auth::Anonymous => Ok(None),
      Auth::Static(token) => Ok(Some(token.clone())),
      Auth::Gcloud(cached) => {
        if !refresh {
          if let Some(token) = cached.read().await.clone() {
            return Ok(Some(token));
          }
        }
        let token = gcloud::access_token().await?;
        *cached.write().await = Some(token.clone());
        Ok(Some(token))
      },
    }
  }

  async fn call<T: DeserializeOwned>(&self, method: Method, path: &str, build: impl Fn(RequestBuilder) -> RequestBuilder) -> Result<T> {
    let url = format!("{}{}", self.base_url, path);
    let mut refreshed = false;
    loop {
      let mut request = build(self.http.request(method.clone(), &url));
      if let Some(token) = self.token(refreshed).await? {
        request = request.bearer_auth(token);
      }
      let response = request.send().await.map_err(|e| eyre!("request to {url} failed: {e}"))?;
      let status = response.status();

      if status == StatusCode::UNAUTHORIZED && !refreshed && matches!(self.auth, Auth::Gcloud(_)) {
        tracing::debug!("access token rejected, refreshing");
        refreshed = true;
        continue;
      }
      if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(clean_error_response(status, &body));
      }
      return response.json::<T>().await.wrap_err_with(|| format!("decode response from {path}"));
    }
  }

  async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
    self.call(Method::GET, path, |r| r.query(query)).await
  }

  async fn table_resource(&self, project: &str, dataset: &str, table: &str) -> Result<TableResource> {
    self.get(&format!("/projects/{project}/datasets/{dataset}/tables/{table}"), &[]).await
  }
}

#[async_trait]
impl Catalog for BigQueryClient {
  async fn list_projects(&self) -> Result<Vec<Project>> {
    if self.emulated {
      return Ok(vec![Project { id: self.default_project.clone(), name: self.default_project.clone() }]);
    }
    gcloud::list_projects().await
  }

  async fn list_datasets(&self, project: &str) -> Result<Vec<Dataset>> {
    let mut datasets = Vec::new();
    let mut page_token: Option<String> = None;
    loop {
      let mut query = vec![];
      if let Some(token) = &page_token {
        query.push(("pageToken", token.clone()));
      }
      let page: DatasetList = self.get(&format!("/projects/{project}/datasets"), &query).await?;
      datasets.extend(page.datasets.into_iter().map(|d| Dataset {
        id: d.dataset_reference.dataset_id,
        project_id: project.to_string(),
        location: d.location.unwrap_or_default(),
        description: String::new(),
      }));
      page_token = page.next_page_token;
      if page_token.is_none() {
        break;
      }
    }
    datasets.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(datasets)
  }

  async fn list_tables(&self, project: &str, dataset: &str) -> Result<Vec<Table>> {
    let mut tables = Vec::new();
    let mut page_token: Option<String> = None;
    loop {
      let mut query = vec![];
      if let Some(token) = &page_token {
        query.push(("pageToken", token.clone()));
      }
      let page: TableList = self.get(&format!("/projects/{project}/datasets/{dataset}/tables"), &query).await?;
      tables.extend(page.tables.into_iter().map(|t| Table {
        id: t.table_reference.table_id,
        dataset_id: dataset.to_string(),
        project_id: project.to_string(),
        kind: t.kind.unwrap_or_default(),
        ..Table::default()
      }));
      page_token = page.next_page_token;
      if page_token.is_none() {
        break;
      }
    }
    tables.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(tables)
  }

  async fn get_schema(&self, project: &str, dataset: &str, table: &str) -> Result<TableSchema> {
    let resource = self.table_resource(project, dataset, table).await?;
    Ok(resource.schema.unwrap_or_default().into())
  }

  async fn preview_rows(&self, project: &str, dataset: &str, table: &str, limit: usize) -> Result<RowSet> {
    let resource = self.table_resource(project, dataset, table).await?;
    let schema = resource.schema.unwrap_or_default();
    let data: TableData = self
      .get(&format!("/projects/{project}/datasets/{dataset}/tables/{table}/data"), &[("maxResults", limit.to_string())])
      .await?;
    Ok(render_rows(&schema.fields, &data.rows))
  }

  async fn run_query(&self, project: &str, sql: &str) -> Result<RowSet> {
    let body = QueryRequest { query: sql.to_string(), use_legacy_sql: false, timeout_ms: QUERY_WAIT_MS, max_results: QUERY_ROW_LIMIT };
    let mut response: QueryResponse =
      self.call(Method::POST, &format!("/projects/{project}/queries"), |r| r.json(&body)).await?;

    while !response.job_complete {
      let job = response.job_reference.as_ref().ok_or_else(|| eyre!("query job has no reference"))?;
      tracing::debug!("waiting for query job {}", job.job_id);
      let mut query = vec![("timeoutMs", QUERY_WAIT_MS.to_string()), ("maxResults", QUERY_ROW_LIMIT.to_string())];
      if let Some(location) = &job.location {
        query.push(("location", location.clone()));
      }
      response = self.get(&format!("/projects/{project}/queries/{}", job.job_id), &query).await?;
    }

    if let Some(error) = response.errors.first() {
      return Err(eyre!("query failed: {}", error.message));
    }
    let schema = response.schema.unwrap_or_default();
    Ok(render_rows(&schema.fields, &response.rows))
  }

  async fn switch_project(&self, project: &str) -> Result<()> {
    let _: DatasetList =
      self.get(&format!("/projects/{project}/datasets"), &[("maxResults", "1".to_string())]).await.wrap_err_with(|| {
        format!("cannot open project {project}")
      })?;
    Ok(())
  }
}

fn emulator_root(endpoint: &str) -> String {
  let trimmed = endpoint.trim_end_matches('/');
  if trimmed.ends_with("/bigquery/v2") {
    trimmed.to_string()
  } else {
    format!("{trimmed}/bigquery/v2")
  }
}

fn clean_error_response(status: StatusCode, body: &str) -> color_eyre::eyre::Report {
  let message = serde_json::from_str::<ErrorEnvelope>(body)
    .map(|e| e.error.message)
    .unwrap_or_else(|_| body.trim().to_string());
  if message.is_empty() {
    eyre!("BigQuery returned {status}")
  } else {
    eyre!("BigQuery returned {status}: {message}")
  }
}

/// Renders API rows to display text using the schema for headers and record
/// field names.
pub fn render_rows(fields: &[FieldSchema], rows: &[Row]) -> RowSet {
  let headers = fields.iter().map(|f| f.name.clone()).collect();
  let rows = rows
    .iter()
    .map(|row| {
      row.f.iter().enumerate().map(|(i, cell)| render_value(&cell.v, fields.get(i))).collect()
    })
    .collect();
  RowSet { headers, rows }
}

/// `NULL` for nulls, `[a, b]` for repeated fields, `{name: value}` for
/// records, the raw text for scalars.
pub fn render_value(value: &Value, field: Option<&FieldSchema>) -> String {
  let repeated = field.is_some_and(|f| f.mode.as_deref() == Some("REPEATED"));
  match value {
    Value::Null => "NULL".to_string(),
    Value::Array(items) => {
      let element = field.map(|f| FieldSchema { mode: None, ..f.clone() });
      let items: Vec<String> = items.iter().map(|item| render_value(unwrap_cell(item), element.as_ref())).collect();
      format!("[{}]", items.join(", "))
    },
    Value::Object(map) if map.contains_key("f") && !repeated => {
      let cells = map.get("f").and_then(Value::as_array).cloned().unwrap_or_default();
      let children = field.map(|f| f.fields.as_slice()).unwrap_or_default();
      let parts: Vec<String> = cells
        .iter()
        .enumerate()
        .map(|(i, cell)| {
          let child = children.get(i);
          let name = child.map(|c| c.name.clone()).unwrap_or_else(|| format!("f{i}"));
          format!("{name}: {}", render_value(unwrap_cell(cell), child))
        })
        .collect();
      format!("{{{}}}", parts.join(", "))
    },
    Value::Object(_) => value.to_string(),
    Value::String(s) => s.clone(),
    Value::Bool(b) => b.to_string(),
    Value::Number(n) => n.to_string(),
  }
}

fn unwrap_cell(cell: &Value) -> &Value {
  match cell {
    Value::Object(map) if map.len() == 1 && map.contains_key("v") => map.get("v").unwrap_or(&NULL),
    other => other,
  }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
  error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
  #[serde(default)]
  message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DatasetList {
  #[serde(default)]
  datasets: Vec<DatasetListItem>,
  next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DatasetListItem {
  dataset_reference: DatasetReference,
  location: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DatasetReference {
  dataset_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableList {
  #[serde(default)]
  tables: Vec<TableListItem>,
  next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableListItem {
  table_reference: TableReference,
  #[serde(rename = "type")]
  kind: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableReference {
  table_id: String,
}

#[derive(Debug, Deserialize)]
struct TableResource {
  schema: Option<SchemaResource>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaResource {
  #[serde(default)]
  pub fields: Vec<FieldSchema>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FieldSchema {
  pub name: String,
  #[serde(rename = "type", default)]
  pub data_type: String,
  pub mode: Option<String>,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub fields: Vec<FieldSchema>,
}

impl From<FieldSchema> for Column {
  fn from(field: FieldSchema) -> Self {
    let mode = match field.mode.as_deref() {
      Some("REQUIRED") => ColumnMode::Required,
      Some("REPEATED") => ColumnMode::Repeated,
      _ => ColumnMode::Nullable,
    };
    Column {
      name: field.name,
      data_type: field.data_type,
      mode,
      description: field.description.unwrap_or_default(),
      fields: field.fields.into_iter().map(Column::from).collect(),
    }
  }
}

impl From<SchemaResource> for TableSchema {
  fn from(schema: SchemaResource) -> Self {
    TableSchema { fields: schema.fields.into_iter().map(Column::from).collect() }
  }
}

#[derive(Debug, Default, Deserialize)]
struct TableData {
  #[serde(default)]
  rows: Vec<Row>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Row {
  #[serde(default)]
  pub f: Vec<Cell>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Cell {
  #[serde(default)]
  pub v: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest {
  query: String,
  use_legacy_sql: bool,
  timeout_ms: u64,
  max_results: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
  #[serde(default)]
  job_complete: bool,
  job_reference: Option<JobReference>,
  schema: Option<SchemaResource>,
  #[serde(default)]
  rows: Vec<Row>,
  #[serde(default)]
  errors: Vec<ErrorBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobReference {
  job_id: String,
  location: Option<String>,
}
