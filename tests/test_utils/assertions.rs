use bq_crafter::{
    components::explorer::{Explorer, StatusLevel},
    nav::{detail::TabKind, focus::Focus, gate::SelectionKey},
};

pub trait StateAssertions {
    fn assert_focus(&self, expected: Focus);
    fn assert_selection(&self, expected: &SelectionKey);
    fn assert_tab(&self, expected: TabKind);
    fn assert_error(&self, expected: &str);
    fn assert_no_error(&self);
}

pub trait RenderAssertions {
    fn assert_contains(&self, text: &str);
    fn assert_not_contains(&self, text: &str);
    fn assert_line_contains(&self, line: usize, text: &str);
}

impl StateAssertions for Explorer {
    fn assert_focus(&self, expected: Focus) {
        assert_eq!(self.focus.focus(), expected, "unexpected focus");
    }

    fn assert_selection(&self, expected: &SelectionKey) {
        assert_eq!(self.gate.current(), expected, "unexpected selection");
    }

    fn assert_tab(&self, expected: TabKind) {
        assert_eq!(self.detail.active(), expected, "unexpected tab");
    }

    fn assert_error(&self, expected: &str) {
        match &self.status {
            Some(status) if status.level == StatusLevel::Error => assert!(
                status.text.contains(expected),
                "Expected error containing '{}', got '{}'",
                expected,
                status.text
            ),
            other => panic!("Expected error containing '{expected}', got {other:?}"),
        }
    }

    fn assert_no_error(&self) {
        if let Some(status) = &self.status {
            assert_ne!(status.level, StatusLevel::Error, "unexpected error: {}", status.text);
        }
    }
}

impl RenderAssertions for Vec<String> {
    fn assert_contains(&self, text: &str) {
        let full_content = self.join("\n");
        assert!(full_content.contains(text), "Expected to find '{}' in rendered output:\n{}", text, full_content);
    }

    fn assert_not_contains(&self, text: &str) {
        let full_content = self.join("\n");
        assert!(!full_content.contains(text), "Expected NOT to find '{}' in rendered output:\n{}", text, full_content);
    }

    fn assert_line_contains(&self, line: usize, text: &str) {
        assert!(line < self.len(), "Line {} is out of bounds (total lines: {})", line, self.len());

        assert!(self[line].contains(text), "Expected line {} to contain '{}', but got: '{}'", line, text, self[line]);
    }
}
