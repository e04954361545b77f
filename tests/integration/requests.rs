use bq_crafter::{
    catalog::{ColumnMode, Payload, RowSet, TableSchema},
    nav::{
        detail::TabKind,
        focus::Focus,
        gate::{RequestKind, SelectionKey},
    },
};
use pretty_assertions::assert_eq;

use crate::test_utils::{
    assertions::StateAssertions, fixtures, ComponentTestHarness, EventBuilder, TEST_PROJECT,
};

fn one_column_schema() -> TableSchema {
    TableSchema { fields: vec![fixtures::column("only", "STRING", ColumnMode::Nullable)] }
}

/// Datasets served, analytics opened and its tables delivered, leaving the
/// hover fetches for `events` outstanding.
async fn hovering_events() -> ComponentTestHarness<bq_crafter::components::explorer::Explorer> {
    let catalog = fixtures::sample_catalog();
    let mut harness = ComponentTestHarness::explorer().unwrap();
    harness.serve(&catalog).await.unwrap();
    harness.send_events(EventBuilder::new().enter().build()).unwrap();
    let tables = harness.take_pending();
    harness.deliver(tables[0].clone(), Payload::Tables(fixtures::sample_tables("analytics"))).unwrap();
    harness
}

#[tokio::test]
async fn test_duplicate_hover_fetch_is_not_reissued() {
    let mut harness = hovering_events().await;

    harness.send_events(EventBuilder::new().key('j').key('k').build()).unwrap();

    let requests = harness.take_pending();
    let issued: Vec<_> = requests.iter().map(|r| (r.kind, r.key.table.clone().unwrap())).collect();
    assert_eq!(
        issued,
        vec![
            (RequestKind::Schema, "events".to_string()),
            (RequestKind::Preview, "events".to_string()),
            (RequestKind::Schema, "sessions".to_string()),
            (RequestKind::Preview, "sessions".to_string()),
        ]
    );
    assert_eq!(harness.component.gate.in_flight_count(), 4);

    for request in requests {
        let events = request.key.table.as_deref() == Some("events");
        let payload = match (request.kind, events) {
            (RequestKind::Schema, true) => Payload::Schema(fixtures::sample_schema()),
            (RequestKind::Schema, false) => Payload::Schema(one_column_schema()),
            _ => Payload::Preview(fixtures::sample_rows()),
        };
        harness.deliver(request, payload).unwrap();
    }

    assert_eq!(harness.component.gate.in_flight_count(), 0);
    assert_eq!(harness.component.detail.schema.rows().total_len(), 6);
    assert!(harness.take_pending().is_empty());
}

#[tokio::test]
async fn test_stale_schema_is_dropped() {
    let mut harness = hovering_events().await;
    let events = harness.take_pending();

    harness.send_events(EventBuilder::new().key('j').build()).unwrap();
    let sessions = harness.take_pending();
    let sessions_schema = sessions.iter().find(|r| r.kind == RequestKind::Schema).unwrap().clone();
    let events_schema = events.iter().find(|r| r.kind == RequestKind::Schema).unwrap().clone();

    harness.deliver(sessions_schema, Payload::Schema(fixtures::sample_schema())).unwrap();
    harness.deliver(events_schema, Payload::Schema(one_column_schema())).unwrap();

    harness.component.assert_selection(&SelectionKey::table(TEST_PROJECT, "analytics", "sessions"));
    assert_eq!(harness.component.detail.schema.rows().total_len(), 6);
    assert!(harness.component.detail.current_schema_entry().is_some_and(|e| e.path == "id"));
}

#[tokio::test]
async fn test_failed_fetch_sets_status_and_can_be_retried() {
    let mut catalog = fixtures::sample_catalog();
    catalog.failing.insert("acme-prod.analytics.events".to_string());
    let mut harness = ComponentTestHarness::browsing(&catalog).await.unwrap();

    harness.component.assert_error("Not found: acme-prod.analytics.events");
    harness.component.assert_focus(Focus::Browser);
    assert!(harness.component.detail.schema.is_empty());

    // Re-hovering the same table retries both fetches.
    harness.send_events(EventBuilder::new().up().build()).unwrap();
    let retried: Vec<_> = harness.take_pending().into_iter().map(|r| r.kind).collect();
    assert_eq!(retried, vec![RequestKind::Schema, RequestKind::Preview]);
}

#[tokio::test]
async fn test_stale_failure_is_silent() {
    let mut harness = hovering_events().await;
    let events = harness.take_pending();

    harness.send_events(EventBuilder::new().key('j').build()).unwrap();
    for request in events {
        harness.deliver_error(request, "boom").unwrap();
    }

    harness.component.assert_no_error();
}

#[tokio::test]
async fn test_refresh_refetches_bypassing_cache() {
    let catalog = fixtures::sample_catalog();
    let mut harness = ComponentTestHarness::explorer().unwrap();
    harness.serve(&catalog).await.unwrap();

    harness.send_events(EventBuilder::new().key('r').build()).unwrap();

    assert_eq!(harness.pending.len(), 1);
    let (request, refetch) = &harness.pending[0];
    assert_eq!(request.kind, RequestKind::Datasets);
    assert!(*refetch);

    harness.serve(&catalog).await.unwrap();
    assert_eq!(catalog.call_count("datasets:"), 2);
}

#[tokio::test]
async fn test_only_latest_query_result_is_shown() {
    let catalog = fixtures::sample_catalog();
    let mut harness = ComponentTestHarness::browsing(&catalog).await.unwrap();

    // Detail pane, Query tab, type into the editor and run it.
    harness.send_events(EventBuilder::new().enter().tab().tab().enter().keys("select 1").ctrl('e').build()).unwrap();
    harness.component.assert_tab(TabKind::Results);
    assert!(!harness.component.detail.editor.is_focused());

    // Rerun from the Results tab.
    harness.send_events(EventBuilder::new().key('r').build()).unwrap();

    let queries = harness.take_pending();
    assert_eq!(queries.len(), 2);
    assert!(queries.iter().all(|q| q.query.as_deref() == Some("select 1")));

    let first = RowSet { headers: vec!["n".into()], rows: vec![vec!["old".into()]] };
    let second = RowSet { headers: vec!["n".into()], rows: vec![vec!["new".into()], vec!["newer".into()]] };
    harness.deliver(queries[1].clone(), Payload::Query(second)).unwrap();
    harness.deliver(queries[0].clone(), Payload::Query(first)).unwrap();

    assert_eq!(harness.component.detail.results.rows().total_len(), 2);
    assert_eq!(harness.status_text(), Some("2 rows"));
}
