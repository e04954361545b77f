use bq_crafter::catalog::{Column, ColumnMode, Dataset, Project, RowSet, Table, TableSchema};

use super::{FakeCatalog, TEST_PROJECT};

pub fn dataset(project: &str, id: &str) -> Dataset {
    Dataset { id: id.to_string(), project_id: project.to_string(), location: "US".to_string(), ..Default::default() }
}

pub fn table(project: &str, dataset: &str, id: &str) -> Table {
    Table {
        id: id.to_string(),
        dataset_id: dataset.to_string(),
        project_id: project.to_string(),
        kind: "TABLE".to_string(),
        ..Default::default()
    }
}

pub fn column(name: &str, data_type: &str, mode: ColumnMode) -> Column {
    Column { name: name.to_string(), data_type: data_type.to_string(), mode, ..Default::default() }
}

pub fn sample_datasets() -> Vec<Dataset> {
    ["analytics", "billing", "raw"].into_iter().map(|d| dataset(TEST_PROJECT, d)).collect()
}

pub fn sample_tables(dataset_id: &str) -> Vec<Table> {
    ["events", "sessions", "users"].into_iter().map(|t| table(TEST_PROJECT, dataset_id, t)).collect()
}

/// `id`, `email`, a repeated `tags` and an `address` record with two
/// children.
pub fn sample_schema() -> TableSchema {
    let mut address = column("address", "RECORD", ColumnMode::Nullable);
    address.fields =
        vec![column("city", "STRING", ColumnMode::Nullable), column("zip", "STRING", ColumnMode::Nullable)];
    TableSchema {
        fields: vec![
            column("id", "INT64", ColumnMode::Required),
            column("email", "STRING", ColumnMode::Nullable),
            column("tags", "STRING", ColumnMode::Repeated),
            address,
        ],
    }
}

pub fn sample_rows() -> RowSet {
    RowSet {
        headers: vec!["id".to_string(), "email".to_string()],
        rows: vec![
            vec!["1".to_string(), "ada@example.com".to_string()],
            vec!["2".to_string(), "grace@example.com".to_string()],
            vec!["3".to_string(), "NULL".to_string()],
        ],
    }
}

pub fn sample_projects() -> Vec<Project> {
    vec![
        Project { id: TEST_PROJECT.to_string(), name: "Acme Production".to_string() },
        Project { id: "acme-staging".to_string(), name: "Acme Staging".to_string() },
        Project { id: "sandbox".to_string(), name: "sandbox".to_string() },
    ]
}

/// A catalog holding the sample project with every sample table filled in.
pub fn sample_catalog() -> FakeCatalog {
    let mut catalog = FakeCatalog { projects: sample_projects(), ..Default::default() };
    catalog.datasets.insert(TEST_PROJECT.to_string(), sample_datasets());
    catalog.datasets.insert("acme-staging".to_string(), vec![dataset("acme-staging", "scratch")]);
    for d in ["analytics", "billing", "raw"] {
        catalog.tables.insert((TEST_PROJECT.to_string(), d.to_string()), sample_tables(d));
        for t in ["events", "sessions", "users"] {
            let name = format!("{TEST_PROJECT}.{d}.{t}");
            catalog.schemas.insert(name.clone(), sample_schema());
            catalog.previews.insert(name, sample_rows());
        }
    }
    catalog.query_result = RowSet {
        headers: vec!["n".to_string()],
        rows: vec![vec!["42".to_string()]],
    };
    catalog
}
