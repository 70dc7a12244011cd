//! Symbol navigation commands and editor event handling

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::index::SymbolIndex;
use super::outline::{Located, Outline, SymbolPath};
use super::resolve::{NearestSymbols, resolve};
use super::session::{HighlightUpdate, NavigationSession};
use crate::models::lsp::{Range, Selection};
use crate::models::symbol::Symbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[serde(alias = "prev")]
    Previous,
    Next,
    Parent,
    Child,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Previous => "previous",
            Self::Next => "next",
            Self::Parent => "parent",
            Self::Child => "child",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "prev" | "previous" => Ok(Self::Previous),
            "next" => Ok(Self::Next),
            "parent" | "up" => Ok(Self::Parent),
            "child" | "down" => Ok(Self::Child),
            _ => Err(format!(
                "Unknown direction '{}'. Expected prev, next, parent or child",
                s
            )),
        }
    }
}

/// Caller policy for directions with no match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationPolicy {
    /// Move to the start of `current` when the requested neighbour is absent
    pub fallback_to_current: bool,
}

impl Default for NavigationPolicy {
    fn default() -> Self {
        Self {
            fallback_to_current: true,
        }
    }
}

/// Symbol a selection was moved to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavTarget {
    pub path: SymbolPath,
    /// The symbol without its children
    pub symbol: Symbol,
}

impl From<&Located<'_>> for NavTarget {
    fn from(located: &Located<'_>) -> Self {
        Self {
            path: located.path.clone(),
            symbol: located.symbol.detached(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationOutcome {
    pub selections: Vec<Selection>,
    pub highlights: Vec<Range>,
    /// One entry per input selection; `None` where the selection was kept
    pub targets: Vec<Option<NavTarget>>,
    pub moved: bool,
}

impl NavigationOutcome {
    fn unchanged(selections: &[Selection]) -> Self {
        Self {
            selections: selections.to_vec(),
            highlights: Vec::new(),
            targets: vec![None; selections.len()],
            moved: false,
        }
    }
}

pub struct Navigator {
    index: Arc<SymbolIndex>,
    policy: NavigationPolicy,
}

impl Navigator {
    pub fn new(index: Arc<SymbolIndex>, policy: NavigationPolicy) -> Self {
        Self { index, policy }
    }

    pub fn index(&self) -> &Arc<SymbolIndex> {
        &self.index
    }

    pub fn policy(&self) -> NavigationPolicy {
        self.policy
    }

    pub async fn outline(&self, document: &Path) -> Arc<Outline> {
        self.index.get_outline(document).await
    }

    /// Move (or extend) every selection one step in `direction`
    pub async fn navigate(
        &self,
        document: &Path,
        selections: &[Selection],
        direction: Direction,
        select: bool,
    ) -> NavigationOutcome {
        let outline = self.index.get_outline(document).await;
        if outline.is_empty() {
            return NavigationOutcome::unchanged(selections);
        }

        let policy = self.policy;
        let outcome = self
            .index
            .with_session(document, &outline, |session| {
                plan(&outline, session, selections, direction, select, policy)
            })
            .await;

        match outcome {
            Some(outcome) => {
                tracing::debug!(
                    "{} in {}: {} of {} selections moved",
                    direction,
                    document.display(),
                    outcome.targets.iter().filter(|t| t.is_some()).count(),
                    selections.len()
                );
                outcome
            }
            None => {
                tracing::debug!(
                    "Outline for {} replaced during navigation",
                    document.display()
                );
                NavigationOutcome::unchanged(selections)
            }
        }
    }

    pub async fn document_edited(&self, document: &Path) {
        self.index.invalidate(document).await;
    }

    pub async fn document_closed(&self, document: &Path) {
        self.index.invalidate(document).await;
        self.index.provider().document_closed(document).await;
    }

    /// Focus moved to another document; drop what was cached for the old one
    pub async fn active_editor_changed(&self, previous: Option<&Path>) {
        if let Some(previous) = previous {
            self.index.invalidate(previous).await;
        }
    }

    pub async fn selection_changed(
        &self,
        document: &Path,
        selections: &[Selection],
    ) -> HighlightUpdate {
        self.index
            .with_current_session(document, |session| session.selection_changed(selections))
            .await
            .unwrap_or(HighlightUpdate::Clear)
    }
}

fn plan(
    outline: &Outline,
    session: &mut NavigationSession,
    selections: &[Selection],
    direction: Direction,
    select: bool,
    policy: NavigationPolicy,
) -> NavigationOutcome {
    session.begin_navigation();

    let mut returns = match direction {
        Direction::Child => session.take_return_children().unwrap_or_default(),
        Direction::Previous | Direction::Next => {
            session.discard_return_children();
            Vec::new()
        }
        Direction::Parent => Vec::new(),
    };
    let mut staged = Vec::new();

    let mut new_selections = Vec::with_capacity(selections.len());
    let mut targets = Vec::with_capacity(selections.len());

    for (slot, selection) in selections.iter().enumerate() {
        let nearest = resolve(outline, selection.start());
        let target = match direction {
            Direction::Previous => nearest.previous.clone(),
            Direction::Next => nearest.next.clone(),
            Direction::Parent => {
                staged.push(return_child(&nearest));
                nearest.parent.clone()
            }
            Direction::Child => returns
                .get_mut(slot)
                .and_then(Option::take)
                .and_then(|path| outline.locate(&path))
                .or_else(|| nearest.child.clone()),
        }
        .or_else(|| {
            if policy.fallback_to_current {
                nearest.current.clone()
            } else {
                None
            }
        });

        match target {
            Some(target) => {
                let range = target.symbol.range;
                let moved_to = if select {
                    Selection::new(range.end, range.start)
                } else {
                    Selection::caret(range.start)
                };
                session.add_highlight(range);
                new_selections.push(moved_to);
                targets.push(Some(NavTarget::from(&target)));
            }
            None => {
                new_selections.push(*selection);
                targets.push(None);
            }
        }
    }

    if direction == Direction::Parent {
        session.record_parent_move(staged);
    }
    session.finish_navigation(new_selections.clone());

    NavigationOutcome {
        moved: new_selections.as_slice() != selections,
        highlights: session.highlight_ranges().to_vec(),
        selections: new_selections,
        targets,
    }
}

/// Symbol a later Child move should come back to, if the cursor has a parent
fn return_child(nearest: &NearestSymbols<'_>) -> Option<SymbolPath> {
    nearest.parent.as_ref()?;
    nearest
        .current
        .as_ref()
        .or(nearest.next.as_ref())
        .or(nearest.previous.as_ref())
        .map(|located| located.path.clone())
}
