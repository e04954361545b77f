/// Row-range selection anchored where it was started.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct VisualSelection {
  active: bool,
  anchor: usize,
  current: usize,
}

impl VisualSelection {
  /// Starts a selection at `row`, or ends the active one.
  pub fn toggle(&mut self, row: usize) {
    if self.active {
      self.cancel();
    } else {
      *self = Self { active: true, anchor: row, current: row };
    }
  }

  /// Follows the cursor. Ignored while inactive.
  pub fn extend_to(&mut self, row: usize) {
    if self.active {
      self.current = row;
    }
  }

  /// Inclusive `(low, high)` bounds, whichever way the range was dragged.
  pub fn range(&self) -> Option<(usize, usize)> {
    self.active.then(|| (self.anchor.min(self.current), self.anchor.max(self.current)))
  }

  pub fn contains(&self, row: usize) -> bool {
    self.range().is_some_and(|(lo, hi)| (lo..=hi).contains(&row))
  }

  pub fn cancel(&mut self) {
    *self = Self::default();
  }

  pub fn is_active(&self) -> bool {
    self.active
  }
}
