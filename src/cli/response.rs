//! Response types for CLI output
//!
//! Positions are rendered 1-indexed, matching what the CLI accepts.

use serde::Serialize;

use super::output::TextOutput;
use crate::models::lsp::{Position, Range, Selection};
use crate::models::symbol::{Symbol, SymbolKind};
use crate::nav::{
    Direction, IndexStats, Located, NavTarget, NavigationOutcome, NearestSymbols, SymbolPath,
    is_navigable,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PositionOutput {
    pub line: u32,
    pub column: u32,
}

impl From<Position> for PositionOutput {
    fn from(position: Position) -> Self {
        let (line, column) = position.to_display();
        Self { line, column }
    }
}

impl std::fmt::Display for PositionOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RangeOutput {
    pub start: PositionOutput,
    pub end: PositionOutput,
}

impl From<Range> for RangeOutput {
    fn from(range: Range) -> Self {
        Self {
            start: range.start.into(),
            end: range.end.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectionOutput {
    pub anchor: PositionOutput,
    pub active: PositionOutput,
}

impl From<&Selection> for SelectionOutput {
    fn from(selection: &Selection) -> Self {
        Self {
            anchor: selection.anchor.into(),
            active: selection.active.into(),
        }
    }
}

/// Outline entry, with its subtree
#[derive(Debug, Clone, Serialize)]
pub struct SymbolOutput {
    pub name: String,
    pub kind: SymbolKind,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub detail: String,
    pub range: RangeOutput,
    pub selection_range: RangeOutput,
    /// False for forward declarations, which navigation skips
    pub navigable: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SymbolOutput>,
}

impl From<&Symbol> for SymbolOutput {
    fn from(symbol: &Symbol) -> Self {
        Self {
            name: symbol.name.clone(),
            kind: symbol.kind,
            detail: symbol.detail.clone(),
            range: symbol.range.into(),
            selection_range: symbol.selection_range.into(),
            navigable: is_navigable(symbol),
            children: symbol.children.iter().map(SymbolOutput::from).collect(),
        }
    }
}

/// A symbol picked out of an outline
#[derive(Debug, Clone, Serialize)]
pub struct SymbolRef {
    pub name: String,
    pub kind: SymbolKind,
    /// Child indices from the outline root
    pub path: SymbolPath,
    pub range: RangeOutput,
}

impl SymbolRef {
    fn new(symbol: &Symbol, path: &SymbolPath) -> Self {
        Self {
            name: symbol.name.clone(),
            kind: symbol.kind,
            path: path.clone(),
            range: symbol.range.into(),
        }
    }

    fn label(&self) -> String {
        format!("{} {} ({})", self.kind, self.name, self.range.start)
    }
}

impl From<&Located<'_>> for SymbolRef {
    fn from(located: &Located<'_>) -> Self {
        Self::new(located.symbol, &located.path)
    }
}

impl From<&NavTarget> for SymbolRef {
    fn from(target: &NavTarget) -> Self {
        Self::new(&target.symbol, &target.path)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OutlineResponse {
    pub file: String,
    pub normalized: bool,
    pub count: usize,
    pub symbols: Vec<SymbolOutput>,
}

impl TextOutput for OutlineResponse {
    fn to_text(&self) -> String {
        fn render(symbols: &[SymbolOutput], depth: usize, out: &mut Vec<String>) {
            for symbol in symbols {
                let marker = if symbol.navigable { "" } else { " [decl]" };
                out.push(format!(
                    "{}{} {}  {}-{}{}",
                    "  ".repeat(depth),
                    symbol.kind,
                    symbol.name,
                    symbol.range.start.line,
                    symbol.range.end.line,
                    marker
                ));
                render(&symbol.children, depth + 1, out);
            }
        }

        let mut lines = vec![format!("{} ({} symbols)", self.file, self.count)];
        render(&self.symbols, 1, &mut lines);
        lines.join("\n")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NearestResponse {
    pub file: String,
    pub position: PositionOutput,
    pub parent: Option<SymbolRef>,
    pub current: Option<SymbolRef>,
    pub child: Option<SymbolRef>,
    pub previous: Option<SymbolRef>,
    pub next: Option<SymbolRef>,
}

impl NearestResponse {
    pub fn new(file: String, position: Position, nearest: &NearestSymbols<'_>) -> Self {
        Self {
            file,
            position: position.into(),
            parent: nearest.parent.as_ref().map(SymbolRef::from),
            current: nearest.current.as_ref().map(SymbolRef::from),
            child: nearest.child.as_ref().map(SymbolRef::from),
            previous: nearest.previous.as_ref().map(SymbolRef::from),
            next: nearest.next.as_ref().map(SymbolRef::from),
        }
    }
}

impl TextOutput for NearestResponse {
    fn to_text(&self) -> String {
        let row = |name: &str, symbol: &Option<SymbolRef>| {
            format!(
                "{:<9}{}",
                name,
                symbol.as_ref().map_or_else(|| "-".to_string(), SymbolRef::label)
            )
        };
        [
            format!("{}:{}", self.file, self.position),
            row("parent", &self.parent),
            row("current", &self.current),
            row("child", &self.child),
            row("previous", &self.previous),
            row("next", &self.next),
        ]
        .join("\n")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GotoResponse {
    pub file: String,
    pub direction: String,
    pub moved: bool,
    pub selections: Vec<SelectionOutput>,
    pub targets: Vec<Option<SymbolRef>>,
    pub highlights: Vec<RangeOutput>,
}

impl GotoResponse {
    pub fn new(file: String, direction: Direction, outcome: &NavigationOutcome) -> Self {
        Self {
            file,
            direction: direction.to_string(),
            moved: outcome.moved,
            selections: outcome.selections.iter().map(SelectionOutput::from).collect(),
            targets: outcome
                .targets
                .iter()
                .map(|t| t.as_ref().map(SymbolRef::from))
                .collect(),
            highlights: outcome.highlights.iter().copied().map(RangeOutput::from).collect(),
        }
    }
}

impl TextOutput for GotoResponse {
    fn to_text(&self) -> String {
        self.selections
            .iter()
            .zip(&self.targets)
            .map(|(selection, target)| match target {
                Some(target) => format!("{}:{} {}", self.file, selection.active, target.label()),
                None => format!("{}:{} (unchanged)", self.file, selection.active),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FoldResponse {
    pub file: String,
    /// 1-indexed start lines of the ranges to collapse
    pub lines: Vec<u32>,
}

impl TextOutput for FoldResponse {
    fn to_text(&self) -> String {
        if self.lines.is_empty() {
            return format!("{}: nothing to fold", self.file);
        }
        self.lines
            .iter()
            .map(|line| format!("{}:{}", self.file, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub cached_documents: usize,
    pub hits: u64,
    pub misses: u64,
}

impl From<IndexStats> for StatsResponse {
    fn from(stats: IndexStats) -> Self {
        Self {
            cached_documents: stats.entries,
            hits: stats.hits,
            misses: stats.misses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn function(name: &str, start: u32, end: u32) -> Symbol {
        Symbol::new(name, SymbolKind::Function, Range::from_coords(start, 0, end, 1))
    }

    #[test]
    fn test_positions_are_one_indexed() {
        let out = PositionOutput::from(Position::new(0, 4));
        assert_eq!(out, PositionOutput { line: 1, column: 5 });
        assert_eq!(out.to_string(), "1:5");
    }

    #[test]
    fn test_symbol_output_marks_declarations() {
        let decl = Symbol::new("Fwd", SymbolKind::Class, Range::from_coords(0, 0, 0, 10))
            .with_detail("class declaration");
        let out = SymbolOutput::from(&decl);
        assert!(!out.navigable);

        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["kind"], "class");
        assert!(json.get("children").is_none());
    }

    #[test]
    fn test_outline_text_is_indented() {
        let tree = function("outer", 0, 10).with_children(vec![function("inner", 2, 4)]);
        let response = OutlineResponse {
            file: "a.rs".to_string(),
            normalized: true,
            count: 2,
            symbols: vec![SymbolOutput::from(&tree)],
        };

        let text = response.to_text();
        assert!(text.contains("\n  function outer  1-11"));
        assert!(text.contains("\n    function inner  3-5"));
    }

    #[test]
    fn test_goto_text_marks_unchanged_selections() {
        let response = GotoResponse {
            file: "a.rs".to_string(),
            direction: "next".to_string(),
            moved: false,
            selections: vec![SelectionOutput::from(&Selection::caret(Position::new(4, 0)))],
            targets: vec![None],
            highlights: vec![],
        };
        assert_eq!(response.to_text(), "a.rs:5:1 (unchanged)");
    }
}
