use bq_crafter::{
    catalog::Payload,
    nav::{browser::BrowserLevel, focus::Focus, gate::SelectionKey},
    tui::Event,
};
use pretty_assertions::assert_eq;

use crate::test_utils::{
    assertions::StateAssertions, fixtures, ComponentTestHarness, EventBuilder, TEST_PROJECT,
};

#[tokio::test]
async fn test_startup_lists_datasets() {
    let catalog = fixtures::sample_catalog();
    let mut harness = ComponentTestHarness::explorer().unwrap();

    assert_eq!(harness.serve(&catalog).await.unwrap(), 1);

    let ids: Vec<_> = harness.component.browser.datasets.items().iter().map(|d| d.id.clone()).collect();
    assert_eq!(ids, vec!["analytics", "billing", "raw"]);
    assert_eq!(harness.component.browser.level(), BrowserLevel::Datasets);
    harness.component.assert_selection(&SelectionKey::project(TEST_PROJECT));
}

#[tokio::test]
async fn test_opening_dataset_hovers_first_table() {
    let catalog = fixtures::sample_catalog();
    let mut harness = ComponentTestHarness::explorer().unwrap();
    harness.serve(&catalog).await.unwrap();

    harness.send_events(EventBuilder::new().enter().build()).unwrap();
    harness.component.assert_selection(&SelectionKey::dataset(TEST_PROJECT, "analytics"));
    assert_eq!(harness.component.browser.level(), BrowserLevel::Tables);

    harness.serve(&catalog).await.unwrap();

    harness.component.assert_selection(&SelectionKey::table(TEST_PROJECT, "analytics", "events"));
    assert_eq!(harness.component.detail.schema.rows().total_len(), 6);
    assert_eq!(harness.component.detail.preview.rows().total_len(), 3);
    assert_eq!(
        catalog.calls(),
        vec![
            "datasets:acme-prod",
            "tables:acme-prod.analytics",
            "schema:acme-prod.analytics.events",
            "preview:acme-prod.analytics.events",
        ]
    );
}

#[tokio::test]
async fn test_cursor_movement_follows_hovered_table() {
    let catalog = fixtures::sample_catalog();
    let mut harness = ComponentTestHarness::browsing(&catalog).await.unwrap();

    harness.send_events(EventBuilder::new().key('j').build()).unwrap();
    harness.component.assert_selection(&SelectionKey::table(TEST_PROJECT, "analytics", "sessions"));
    assert!(harness.component.detail.schema.is_empty());

    harness.serve(&catalog).await.unwrap();
    assert_eq!(harness.component.detail.schema.rows().total_len(), 6);
    assert_eq!(catalog.call_count("schema:acme-prod.analytics.sessions"), 1);
    harness.component.assert_focus(Focus::Browser);
}

#[tokio::test]
async fn test_left_returns_to_datasets_keeping_selection() {
    let catalog = fixtures::sample_catalog();
    let mut harness = ComponentTestHarness::browsing(&catalog).await.unwrap();

    harness.send_events(EventBuilder::new().left().build()).unwrap();

    assert_eq!(harness.component.browser.level(), BrowserLevel::Datasets);
    harness.component.assert_selection(&SelectionKey::table(TEST_PROJECT, "analytics", "events"));
    assert_eq!(harness.component.detail.schema.rows().total_len(), 6);
}

#[tokio::test]
async fn test_reopening_same_dataset_does_not_refetch() {
    let catalog = fixtures::sample_catalog();
    let mut harness = ComponentTestHarness::browsing(&catalog).await.unwrap();

    harness.send_events(EventBuilder::new().left().enter().build()).unwrap();

    assert_eq!(harness.component.browser.level(), BrowserLevel::Tables);
    assert!(harness.take_pending().is_empty());
    assert_eq!(catalog.call_count("tables:"), 1);
}

#[tokio::test]
async fn test_enter_on_table_focuses_detail_pane() {
    let catalog = fixtures::sample_catalog();
    let mut harness = ComponentTestHarness::browsing(&catalog).await.unwrap();

    harness.send_events(EventBuilder::new().enter().build()).unwrap();
    harness.component.assert_focus(Focus::DetailPane);

    harness.send_events(EventBuilder::new().esc().build()).unwrap();
    harness.component.assert_focus(Focus::Browser);
}

#[tokio::test]
async fn test_filter_narrows_tables_and_escape_restores() {
    let catalog = fixtures::sample_catalog();
    let mut harness = ComponentTestHarness::browsing(&catalog).await.unwrap();

    harness.send_events(EventBuilder::new().key('/').keys("ses").build()).unwrap();
    harness.component.assert_focus(Focus::FilterInput);
    assert_eq!(harness.component.browser.tables.len(), 1);
    harness.component.assert_selection(&SelectionKey::table(TEST_PROJECT, "analytics", "sessions"));

    harness.send_events(EventBuilder::new().esc().build()).unwrap();
    harness.component.assert_focus(Focus::Browser);
    assert_eq!(harness.component.browser.filter(), "");
    assert_eq!(harness.component.browser.tables.len(), 3);
    harness.component.assert_selection(&SelectionKey::table(TEST_PROJECT, "analytics", "events"));
}

#[tokio::test]
async fn test_submitted_filter_is_kept() {
    let catalog = fixtures::sample_catalog();
    let mut harness = ComponentTestHarness::explorer().unwrap();
    harness.serve(&catalog).await.unwrap();

    harness.send_events(EventBuilder::new().key('/').key('r').enter().build()).unwrap();

    harness.component.assert_focus(Focus::Browser);
    assert_eq!(harness.component.browser.filter(), "r");
    let visible: Vec<_> = harness.component.browser.datasets.visible_items().map(|d| d.id.as_str()).collect();
    assert_eq!(visible, vec!["raw"]);
}

#[tokio::test]
async fn test_paste_goes_into_browser_filter() {
    let catalog = fixtures::sample_catalog();
    let mut harness = ComponentTestHarness::browsing(&catalog).await.unwrap();

    harness.send_events(EventBuilder::new().key('/').build()).unwrap();
    harness.send_event(Event::Paste("user\n".to_string())).unwrap();

    assert_eq!(harness.component.browser.filter(), "user");
    harness.component.assert_selection(&SelectionKey::table(TEST_PROJECT, "analytics", "users"));
}

#[tokio::test]
async fn test_out_of_order_table_lists_apply_only_current_dataset() {
    let catalog = fixtures::sample_catalog();
    let mut harness = ComponentTestHarness::explorer().unwrap();
    harness.serve(&catalog).await.unwrap();

    // Filter down to billing and open it, but hold its table list back.
    harness.send_events(EventBuilder::new().key('/').key('b').enter().enter().build()).unwrap();
    let billing = harness.take_pending();
    assert_eq!(billing.len(), 1);
    assert_eq!(billing[0].key, SelectionKey::dataset(TEST_PROJECT, "billing"));

    // Back out, drop the filter and open analytics instead.
    harness.send_events(EventBuilder::new().left().key('/').esc().enter().build()).unwrap();
    let analytics = harness.take_pending();
    assert_eq!(analytics.len(), 1);
    assert_eq!(analytics[0].key, SelectionKey::dataset(TEST_PROJECT, "analytics"));

    harness.deliver(analytics[0].clone(), Payload::Tables(fixtures::sample_tables("analytics"))).unwrap();
    harness.deliver(billing[0].clone(), Payload::Tables(fixtures::sample_tables("billing"))).unwrap();

    assert_eq!(harness.component.browser.opened_dataset(), Some("analytics"));
    assert!(harness.component.browser.tables.items().iter().all(|t| t.dataset_id == "analytics"));
    harness.component.assert_selection(&SelectionKey::table(TEST_PROJECT, "analytics", "events"));
    harness.component.assert_no_error();
}
