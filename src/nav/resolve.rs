//! Nearest-symbol resolution
//!
//! Given a cursor position, find the innermost symbol whose name token is at
//! or after the cursor (`current`), its enclosing symbol (`parent`), its first
//! child, and the closest siblings on either side.

use crate::models::lsp::Position;

use super::filter::navigable;
use super::outline::{Located, Outline};

/// Symbols around one cursor position. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NearestSymbols<'a> {
    pub parent: Option<Located<'a>>,
    pub current: Option<Located<'a>>,
    pub child: Option<Located<'a>>,
    pub previous: Option<Located<'a>>,
    pub next: Option<Located<'a>>,
}

impl NearestSymbols<'_> {
    pub fn is_empty(&self) -> bool {
        self.parent.is_none()
            && self.current.is_none()
            && self.child.is_none()
            && self.previous.is_none()
            && self.next.is_none()
    }
}

/// Resolve the symbols around `position`.
///
/// Siblings are not assumed to be sorted; neighbours are found by scanning.
/// `current` is never its own sibling, so from inside a body `previous` is
/// the preceding sibling rather than the start of `current`.
pub fn resolve(outline: &Outline, position: Position) -> NearestSymbols<'_> {
    let mut nearest = NearestSymbols::default();
    let mut level = navigable(outline.roots(), None);

    loop {
        let level_parent = nearest.parent.clone();
        let mut descend = None;

        for candidate in &level {
            if !candidate.symbol.range.contains(position) {
                continue;
            }
            let children = navigable(&candidate.symbol.children, Some(&candidate.path));
            if position <= candidate.symbol.selection_range.end || children.is_empty() {
                nearest.parent = level_parent.clone();
                nearest.current = Some(candidate.clone());
                descend = None;
            } else {
                descend = Some((candidate.clone(), children));
            }
        }

        match descend {
            Some((parent, children)) => {
                nearest.parent = Some(parent);
                nearest.current = None;
                level = children;
            }
            None => break,
        }
    }

    if let Some(current) = &nearest.current {
        for child in navigable(&current.symbol.children, Some(&current.path)) {
            let earlier = nearest
                .child
                .as_ref()
                .is_none_or(|best| child.symbol.range.start < best.symbol.range.start);
            if earlier {
                nearest.child = Some(child);
            }
        }
    }

    let current_path = nearest.current.as_ref().map(|c| &c.path);
    for sibling in level {
        if Some(&sibling.path) == current_path {
            continue;
        }
        let start = sibling.symbol.range.start;

        if start < position
            && nearest
                .previous
                .as_ref()
                .is_none_or(|best| start > best.symbol.range.start)
        {
            nearest.previous = Some(sibling.clone());
        }

        if start > position
            && nearest
                .next
                .as_ref()
                .is_none_or(|best| start < best.symbol.range.start)
        {
            nearest.next = Some(sibling);
        }
    }

    nearest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lsp::Range;
    use crate::models::symbol::{Symbol, SymbolKind};
    use crate::nav::normalize::normalize;

    fn lines(start: u32, end: u32) -> Range {
        Range::new(Position::new(start, 0), Position::new(end, 1))
    }

    /// Symbol whose name token is the first line of its range
    fn sym(name: &str, kind: SymbolKind, start: u32, end: u32) -> Symbol {
        Symbol::new(name, kind, lines(start, end))
            .with_selection_range(Range::new(Position::new(start, 0), Position::new(start, 4)))
    }

    fn name<'a>(located: &Option<Located<'a>>) -> Option<&'a str> {
        located.as_ref().map(|l| l.symbol.name.as_str())
    }

    fn class_a_outline() -> Outline {
        normalize(vec![
            sym("A", SymbolKind::Class, 0, 100)
                .with_children(vec![sym("m1", SymbolKind::Method, 10, 20)]),
            sym("f2", SymbolKind::Function, 120, 130),
        ])
    }

    #[test]
    fn test_cursor_inside_first_method() {
        let outline = class_a_outline();
        let nearest = resolve(&outline, Position::new(15, 0));

        assert_eq!(name(&nearest.current), Some("m1"));
        assert_eq!(name(&nearest.parent), Some("A"));
        assert_eq!(name(&nearest.previous), None);
        assert_eq!(name(&nearest.next), None);
        assert_eq!(name(&nearest.child), None);
    }

    #[test]
    fn test_previous_from_body_skips_current_start() {
        let outline = normalize(vec![sym("A", SymbolKind::Class, 0, 100).with_children(vec![
            sym("m1", SymbolKind::Method, 10, 20),
            sym("m2", SymbolKind::Method, 30, 40),
        ])]);
        let nearest = resolve(&outline, Position::new(35, 0));

        assert_eq!(name(&nearest.current), Some("m2"));
        assert_eq!(name(&nearest.previous), Some("m1"));
    }

    #[test]
    fn test_cursor_on_class_name() {
        let outline = class_a_outline();
        let nearest = resolve(&outline, Position::new(0, 2));

        assert_eq!(name(&nearest.current), Some("A"));
        assert_eq!(name(&nearest.parent), None);
        assert_eq!(name(&nearest.child), Some("m1"));
        assert_eq!(name(&nearest.next), Some("f2"));
        assert_eq!(name(&nearest.previous), None);
    }

    #[test]
    fn test_leaf_interior_resolves_to_leaf() {
        let outline = class_a_outline();
        for line in 121..130 {
            let nearest = resolve(&outline, Position::new(line, 0));
            assert_eq!(name(&nearest.current), Some("f2"), "line {line}");
            assert_eq!(name(&nearest.previous), Some("A"));
        }
    }

    #[test]
    fn test_cursor_at_range_start_is_current() {
        let outline = normalize(vec![
            sym("a", SymbolKind::Function, 0, 5),
            sym("b", SymbolKind::Function, 10, 15),
            sym("c", SymbolKind::Function, 20, 25),
        ]);
        let nearest = resolve(&outline, Position::new(10, 0));

        assert_eq!(name(&nearest.current), Some("b"));
        assert_eq!(name(&nearest.previous), Some("a"));
        assert_eq!(name(&nearest.next), Some("c"));
    }

    #[test]
    fn test_between_children_keeps_parent_without_current() {
        let outline = normalize(vec![sym("A", SymbolKind::Class, 0, 100).with_children(vec![
            sym("m1", SymbolKind::Method, 10, 20),
            sym("m2", SymbolKind::Method, 30, 40),
        ])]);
        let nearest = resolve(&outline, Position::new(25, 0));

        assert_eq!(name(&nearest.parent), Some("A"));
        assert_eq!(name(&nearest.current), None);
        assert_eq!(name(&nearest.previous), Some("m1"));
        assert_eq!(name(&nearest.next), Some("m2"));
    }

    #[test]
    fn test_outside_every_symbol() {
        let outline = class_a_outline();
        let nearest = resolve(&outline, Position::new(110, 0));

        assert!(nearest.current.is_none());
        assert!(nearest.parent.is_none());
        assert_eq!(name(&nearest.previous), Some("A"));
        assert_eq!(name(&nearest.next), Some("f2"));

        let empty = Outline::empty();
        assert!(resolve(&empty, Position::new(3, 0)).is_empty());
    }

    #[test]
    fn test_unsorted_siblings_use_positions() {
        let outline = normalize(vec![
            sym("late", SymbolKind::Function, 40, 50),
            sym("early", SymbolKind::Function, 0, 5),
            sym("middle", SymbolKind::Function, 20, 30),
        ]);
        let nearest = resolve(&outline, Position::new(10, 0));

        assert_eq!(name(&nearest.previous), Some("early"));
        assert_eq!(name(&nearest.next), Some("middle"));
    }

    #[test]
    fn test_first_child_by_position() {
        let outline = normalize(vec![sym("A", SymbolKind::Class, 0, 100).with_children(vec![
            sym("m2", SymbolKind::Method, 30, 40),
            sym("m1", SymbolKind::Method, 10, 20),
        ])]);
        let nearest = resolve(&outline, Position::new(0, 1));
        assert_eq!(name(&nearest.child), Some("m1"));
    }

    #[test]
    fn test_forward_declaration_never_current() {
        let outline = normalize(vec![
            sym("Foo", SymbolKind::Struct, 5, 5).with_detail("declaration"),
            sym("Foo", SymbolKind::Struct, 10, 50),
        ]);

        for line in [10, 11, 30, 50] {
            let nearest = resolve(&outline, Position::new(line, 0));
            let current = nearest.current.expect("definition resolves");
            assert_eq!(current.symbol.range.start.line, 10);
            assert!(nearest.previous.is_none(), "declaration is not a sibling");
        }

        let on_decl = resolve(&outline, Position::new(5, 0));
        assert!(on_decl.current.is_none());
        assert_eq!(
            on_decl.next.map(|n| n.symbol.range.start.line),
            Some(10)
        );
    }

    #[test]
    fn test_declaration_children_remain_reachable() {
        let outline = normalize(vec![
            sym("Foo", SymbolKind::Struct, 0, 20)
                .with_detail("declaration")
                .with_children(vec![
                    sym("a", SymbolKind::Field, 2, 3),
                    sym("b", SymbolKind::Field, 5, 6),
                ]),
            sym("g", SymbolKind::Function, 30, 40),
        ]);

        let nearest = resolve(&outline, Position::new(2, 1));
        assert_eq!(name(&nearest.current), Some("a"));
        assert_eq!(name(&nearest.parent), None);
        assert_eq!(name(&nearest.next), Some("b"));

        let on_g = resolve(&outline, Position::new(30, 0));
        assert_eq!(name(&on_g.previous), Some("b"));
    }

    #[test]
    fn test_hoisted_symbol_resolves_inside_container() {
        let outline = normalize(vec![
            sym("Y", SymbolKind::Class, 0, 100),
            sym("X", SymbolKind::Function, 30, 40),
        ]);
        let nearest = resolve(&outline, Position::new(35, 0));

        assert_eq!(name(&nearest.current), Some("X"));
        assert_eq!(name(&nearest.parent), Some("Y"));
    }

    #[test]
    fn test_later_containing_sibling_wins() {
        // Partial overlap: both contain line 8.
        let outline = normalize(vec![
            sym("a", SymbolKind::Function, 0, 10),
            sym("b", SymbolKind::Function, 5, 15),
        ]);
        let nearest = resolve(&outline, Position::new(8, 0));
        assert_eq!(name(&nearest.current), Some("b"));
        assert_eq!(name(&nearest.previous), Some("a"));
    }

    #[test]
    fn test_nested_descent_tracks_innermost_parent() {
        let outline = normalize(vec![sym("ns", SymbolKind::Namespace, 0, 200).with_children(
            vec![sym("A", SymbolKind::Class, 10, 100).with_children(vec![
                sym("m1", SymbolKind::Method, 20, 30),
                sym("m2", SymbolKind::Method, 40, 50),
            ])],
        )]);
        let nearest = resolve(&outline, Position::new(45, 0));

        assert_eq!(name(&nearest.current), Some("m2"));
        assert_eq!(name(&nearest.parent), Some("A"));
        assert_eq!(name(&nearest.previous), Some("m1"));
        assert_eq!(
            nearest.current.map(|c| c.path.indices().to_vec()),
            Some(vec![0, 0, 1])
        );
    }
}
