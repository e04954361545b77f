use bq_crafter::{
    action::Action,
    catalog::RowSet,
    components::explorer::rendering::Regions,
    nav::{
        detail::TabKind,
        layout::column_span,
        list::{Filterable, ListState},
    },
};
use pretty_assertions::assert_eq;
use ratatui::layout::Rect;

use crate::test_utils::{assertions::StateAssertions, fixtures, ComponentTestHarness, EventBuilder, FakeCatalog, TEST_PROJECT};

/// `analytics` holds forty tables; the first previews as a wide, long grid.
fn crowded_catalog() -> FakeCatalog {
    let mut catalog = fixtures::sample_catalog();
    let tables: Vec<_> = (0..40).map(|i| fixtures::table(TEST_PROJECT, "analytics", &format!("t{i:02}"))).collect();
    catalog.tables.insert((TEST_PROJECT.to_string(), "analytics".to_string()), tables);

    let name = format!("{TEST_PROJECT}.analytics.t00");
    let headers: Vec<String> = (0..8).map(|c| format!("column_{c}")).collect();
    let rows = (0..50).map(|r| (0..8).map(|c| format!("row{r}_col{c}")).collect()).collect();
    catalog.schemas.insert(name.clone(), fixtures::sample_schema());
    catalog.previews.insert(name, RowSet { headers, rows });
    catalog
}

fn assert_cursor_on_page<T: Filterable>(list: &ListState<T>, page: usize) {
    assert_eq!(list.page_size(), page);
    assert!(
        list.offset() <= list.cursor() && list.cursor() < list.offset() + page,
        "cursor {} outside page [{}, {})",
        list.cursor(),
        list.offset(),
        list.offset() + page
    );
}

#[tokio::test]
async fn test_resize_keeps_browser_cursor_on_page() {
    let catalog = crowded_catalog();
    let mut harness = ComponentTestHarness::browsing(&catalog).await.unwrap();
    harness.send_events(EventBuilder::new().shift('g').build()).unwrap();
    assert_eq!(harness.component.browser.tables.cursor(), 39);

    for (width, height) in [(80, 12), (120, 40), (60, 8)] {
        harness.update(Action::Resize(width, height)).unwrap();
        let regions = Regions::new(Rect::new(0, 0, width, height));
        assert_cursor_on_page(&harness.component.browser.tables, regions.browser_list.height as usize);
        assert_eq!(harness.component.browser.tables.cursor(), 39);
    }
}

#[tokio::test]
async fn test_resize_keeps_grid_cursor_in_view() {
    let catalog = crowded_catalog();
    let mut harness = ComponentTestHarness::browsing(&catalog).await.unwrap();
    harness.send_events(EventBuilder::new().enter().tab().key('$').shift('g').build()).unwrap();
    harness.component.assert_tab(TabKind::Preview);
    assert_eq!(harness.component.detail.preview.col(), 7);

    for (width, height) in [(40, 14), (160, 30), (50, 10)] {
        harness.update(Action::Resize(width, height)).unwrap();
        let regions = Regions::new(Rect::new(0, 0, width, height));
        let grid_width = regions.grid_rows.width as usize;

        let preview = &harness.component.detail.preview;
        assert_cursor_on_page(preview.rows(), regions.grid_rows.height as usize);
        assert_eq!(preview.row(), 49);

        let (start, end) = column_span(preview.widths(), preview.col());
        assert!(preview.h_offset() <= start);
        assert!(end <= preview.h_offset() + grid_width);
        assert_eq!(preview.h_offset(), end.saturating_sub(grid_width));
    }
}
