use bq_crafter::{
    action::Action,
    nav::{detail::TabKind, focus::Focus, gate::RequestKind},
};
use pretty_assertions::assert_eq;

use crate::test_utils::{assertions::StateAssertions, fixtures, ComponentTestHarness, EventBuilder};

#[tokio::test]
async fn test_tabs_cycle_in_fixed_order() {
    let catalog = fixtures::sample_catalog();
    let mut harness = ComponentTestHarness::browsing(&catalog).await.unwrap();
    harness.send_events(EventBuilder::new().enter().build()).unwrap();
    harness.component.assert_tab(TabKind::Schema);

    for expected in [TabKind::Preview, TabKind::Query, TabKind::Results, TabKind::Schema] {
        harness.send_events(EventBuilder::new().tab().build()).unwrap();
        harness.component.assert_tab(expected);
    }

    harness.send_events(EventBuilder::new().backtab().build()).unwrap();
    harness.component.assert_tab(TabKind::Results);
}

#[tokio::test]
async fn test_changing_tab_resets_cursor_but_keeps_filter() {
    let catalog = fixtures::sample_catalog();
    let mut harness = ComponentTestHarness::browsing(&catalog).await.unwrap();
    harness.send_events(EventBuilder::new().enter().tab().key('j').key('l').build()).unwrap();
    harness.send_events(EventBuilder::new().key('/').keys("grace").enter().build()).unwrap();
    assert_eq!(harness.component.detail.preview.col(), 1);

    harness.send_events(EventBuilder::new().tab().backtab().build()).unwrap();

    let preview = &harness.component.detail.preview;
    assert_eq!((preview.row(), preview.col()), (0, 0));
    assert_eq!(preview.filter(), "grace");
    assert_eq!(preview.rows().len(), 1);
}

#[tokio::test]
async fn test_escape_closes_one_layer_at_a_time() {
    let catalog = fixtures::sample_catalog();
    let mut harness = ComponentTestHarness::browsing(&catalog).await.unwrap();

    // Schema tab with a filter, a visual range and the column dialog open.
    harness
        .send_events(EventBuilder::new().enter().key('/').keys("mail").enter().key('v').enter().build())
        .unwrap();
    assert!(harness.component.detail.dialog.is_some());
    assert!(harness.component.detail.schema.visual().is_active());
    assert_eq!(harness.component.detail.schema.filter(), "mail");

    harness.send_events(EventBuilder::new().esc().build()).unwrap();
    assert!(harness.component.detail.dialog.is_none());
    assert!(harness.component.detail.schema.visual().is_active());
    assert_eq!(harness.component.detail.schema.filter(), "mail");
    harness.component.assert_focus(Focus::DetailPane);

    harness.send_events(EventBuilder::new().esc().build()).unwrap();
    assert!(!harness.component.detail.schema.visual().is_active());
    assert_eq!(harness.component.detail.schema.filter(), "mail");

    harness.send_events(EventBuilder::new().esc().build()).unwrap();
    assert_eq!(harness.component.detail.schema.filter(), "");
    harness.component.assert_focus(Focus::DetailPane);

    harness.send_events(EventBuilder::new().esc().build()).unwrap();
    harness.component.assert_focus(Focus::Browser);
}

#[tokio::test]
async fn test_column_dialog_runs_generated_query() {
    let catalog = fixtures::sample_catalog();
    let mut harness = ComponentTestHarness::browsing(&catalog).await.unwrap();

    harness.send_events(EventBuilder::new().enter().enter().key('j').enter().build()).unwrap();

    let expected = "SELECT id FROM `acme-prod.analytics.events` WHERE id IS NOT NULL LIMIT 100";
    harness.component.assert_tab(TabKind::Results);
    assert!(harness.component.detail.dialog.is_none());
    assert_eq!(harness.component.detail.editor.text(), expected);

    let requests = harness.take_pending();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].kind, RequestKind::Query);
    assert_eq!(requests[0].query.as_deref(), Some(expected));

    harness.serve(&catalog).await.unwrap();
    harness.take_pending();
    assert_eq!(harness.component.detail.results.rows().total_len(), 1);
    assert_eq!(catalog.call_count("query:acme-prod:SELECT id"), 1);
}

#[tokio::test]
async fn test_empty_query_is_rejected_without_fetch() {
    let catalog = fixtures::sample_catalog();
    let mut harness = ComponentTestHarness::browsing(&catalog).await.unwrap();

    harness.send_events(EventBuilder::new().enter().ctrl('e').build()).unwrap();

    harness.component.assert_error("Query is empty");
    assert!(harness.take_pending().is_empty());
    harness.component.assert_tab(TabKind::Schema);
}

#[tokio::test]
async fn test_editor_swallows_command_keys() {
    let catalog = fixtures::sample_catalog();
    let mut harness = ComponentTestHarness::browsing(&catalog).await.unwrap();

    let returned = harness
        .send_events(EventBuilder::new().enter().tab().tab().enter().keys("q?r").build())
        .unwrap();

    assert!(returned.is_empty());
    assert_eq!(harness.component.detail.editor.text(), "q?r");
    assert!(!harness.component.focus.help_visible());
    assert!(harness.take_pending().is_empty());
}

#[tokio::test]
async fn test_copy_uses_focused_context() {
    let catalog = fixtures::sample_catalog();
    let mut harness = ComponentTestHarness::browsing(&catalog).await.unwrap();

    // Browser: fully qualified table name.
    harness.send_events(EventBuilder::new().key('y').build()).unwrap();
    // Schema tab: column path under the cursor.
    harness.send_events(EventBuilder::new().enter().key('y').build()).unwrap();
    // Preview tab: visual range as tab-separated rows.
    harness.send_events(EventBuilder::new().tab().key('v').key('j').key('y').build()).unwrap();

    let copied: Vec<_> = harness
        .dispatched
        .iter()
        .filter_map(|a| match a {
            Action::CopyToClipboard(text) => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(
        copied,
        vec!["acme-prod.analytics.events", "id", "1\tada@example.com\n2\tgrace@example.com"]
    );
}
