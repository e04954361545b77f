use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use async_trait::async_trait;
use bq_crafter::catalog::{Catalog, Dataset, Project, RowSet, Table, TableSchema};
use color_eyre::eyre::{eyre, Result};

/// In-memory catalog. Every call is recorded as `"method:arg.arg"` so tests
/// can check which calls actually reached the backend.
#[derive(Default)]
pub struct FakeCatalog {
    pub projects: Vec<Project>,
    pub datasets: HashMap<String, Vec<Dataset>>,
    pub tables: HashMap<(String, String), Vec<Table>>,
    pub schemas: HashMap<String, TableSchema>,
    pub previews: HashMap<String, RowSet>,
    pub query_result: RowSet,
    /// Qualified names or SQL texts whose calls fail.
    pub failing: HashSet<String>,
    pub(crate) calls: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, name: &str) -> Result<()> {
        if self.failing.contains(name) {
            return Err(eyre!("Not found: {name}"));
        }
        Ok(())
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn list_projects(&self) -> Result<Vec<Project>> {
        self.record("projects".to_string());
        Ok(self.projects.clone())
    }

    async fn list_datasets(&self, project: &str) -> Result<Vec<Dataset>> {
        self.record(format!("datasets:{project}"));
        self.check(project)?;
        Ok(self.datasets.get(project).cloned().unwrap_or_default())
    }

    async fn list_tables(&self, project: &str, dataset: &str) -> Result<Vec<Table>> {
        let name = format!("{project}.{dataset}");
        self.record(format!("tables:{name}"));
        self.check(&name)?;
        Ok(self.tables.get(&(project.to_string(), dataset.to_string())).cloned().unwrap_or_default())
    }

    async fn get_schema(&self, project: &str, dataset: &str, table: &str) -> Result<TableSchema> {
        let name = format!("{project}.{dataset}.{table}");
        self.record(format!("schema:{name}"));
        self.check(&name)?;
        self.schemas.get(&name).cloned().ok_or_else(|| eyre!("Not found: Table {name}"))
    }

    async fn preview_rows(&self, project: &str, dataset: &str, table: &str, limit: usize) -> Result<RowSet> {
        let name = format!("{project}.{dataset}.{table}");
        self.record(format!("preview:{name}"));
        self.check(&name)?;
        let mut rows = self.previews.get(&name).cloned().unwrap_or_default();
        rows.rows.truncate(limit);
        Ok(rows)
    }

    async fn run_query(&self, project: &str, sql: &str) -> Result<RowSet> {
        self.record(format!("query:{project}:{sql}"));
        self.check(sql)?;
        Ok(self.query_result.clone())
    }

    async fn switch_project(&self, project: &str) -> Result<()> {
        self.record(format!("switch:{project}"));
        self.check(project)
    }
}
