//! Per-document navigation memory
//!
//! A Parent move stages, for every cursor, the symbol it left so the
//! following Child move can return each cursor to it instead of the first
//! child. Any selection change that the
//! navigator did not produce itself discards what was staged.

use crate::models::lsp::{Range, Selection};

use super::outline::SymbolPath;

/// What the host should do with symbol highlights after a selection change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HighlightUpdate {
    /// The change was our own navigation echoing back; keep these highlights
    Reapply(Vec<Range>),
    /// The user moved the cursor elsewhere
    Clear,
}

/// Return children staged by one Parent move, indexed like its selections
pub type ReturnFrame = Vec<Option<SymbolPath>>;

#[derive(Debug, Default)]
pub struct NavigationSession {
    return_children: Vec<ReturnFrame>,
    last_selections: Option<Vec<Selection>>,
    highlight_ranges: Vec<Range>,
}

impl NavigationSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// A return child is staged
    pub fn is_armed(&self) -> bool {
        !self.return_children.is_empty()
    }

    /// Stage one frame; frames with nothing to return to are ignored
    pub fn record_parent_move(&mut self, frame: ReturnFrame) {
        if frame.iter().all(Option::is_none) {
            return;
        }
        tracing::trace!("Staging {} return children", frame.len());
        self.return_children.push(frame);
    }

    pub fn take_return_children(&mut self) -> Option<ReturnFrame> {
        self.return_children.pop()
    }

    pub fn discard_return_children(&mut self) {
        self.return_children.clear();
    }

    /// Start a navigation command; highlights from the previous one are dropped
    pub(crate) fn begin_navigation(&mut self) {
        self.highlight_ranges.clear();
    }

    pub(crate) fn add_highlight(&mut self, range: Range) {
        self.highlight_ranges.push(range);
    }

    pub(crate) fn finish_navigation(&mut self, selections: Vec<Selection>) {
        self.last_selections = Some(selections);
    }

    pub fn highlight_ranges(&self) -> &[Range] {
        &self.highlight_ranges
    }

    pub fn last_selections(&self) -> Option<&[Selection]> {
        self.last_selections.as_deref()
    }

    pub fn selection_changed(&mut self, selections: &[Selection]) -> HighlightUpdate {
        if self.last_selections.as_deref() == Some(selections) {
            return HighlightUpdate::Reapply(self.highlight_ranges.clone());
        }

        if self.is_armed() {
            tracing::debug!("External selection change, discarding return children");
        }
        self.return_children.clear();
        self.highlight_ranges.clear();
        self.last_selections = None;
        HighlightUpdate::Clear
    }
}
