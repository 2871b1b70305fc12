//! Navigation index over the message list

use crate::store::MergeReport;

/// Position of the message currently shown; `None` while the list is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Navigator {
    index: Option<usize>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Re-position after a merge: follow the newest message whenever the
    /// list grew (including the first load), otherwise stay put, then clamp.
    pub fn adjust_after_merge(&mut self, previous_len: usize, new_len: usize, grew: bool) {
        if new_len > 0 && (previous_len == 0 || grew) {
            self.index = Some(new_len - 1);
        }
        self.clamp(new_len);
    }

    /// Convenience for [`adjust_after_merge`](Self::adjust_after_merge)
    pub fn apply(&mut self, report: &MergeReport) {
        self.adjust_after_merge(report.previous_len, report.new_len, report.grew);
    }

    /// Keep the index inside `[0, len)`, or `None` for an empty list
    pub fn clamp(&mut self, len: usize) {
        self.index = match self.index {
            _ if len == 0 => None,
            Some(i) if i >= len => Some(len - 1),
            // A populated list always has a selection
            None => Some(len - 1),
            keep => keep,
        };
    }

    /// Step towards older messages; no-op at the first one
    pub fn previous(&mut self) -> bool {
        match self.index {
            Some(i) if i > 0 => {
                self.index = Some(i - 1);
                true
            }
            _ => false,
        }
    }

    /// Step towards newer messages; no-op at the last one
    pub fn next(&mut self, len: usize) -> bool {
        match self.index {
            Some(i) if i + 1 < len => {
                self.index = Some(i + 1);
                true
            }
            _ => false,
        }
    }

    pub fn has_previous(&self) -> bool {
        matches!(self.index, Some(i) if i > 0)
    }

    pub fn has_next(&self, len: usize) -> bool {
        matches!(self.index, Some(i) if i + 1 < len)
    }
}
