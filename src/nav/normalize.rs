//! Containment repair for provider outlines
//!
//! Some servers hoist symbols to the root sequence even though they sit
//! inside another symbol's range (clangd does this for friend functions and
//! friend classes). Every such root is moved under its deepest strict
//! container so the resolver can treat the outline as a real tree.

use crate::models::symbol::Symbol;

use super::outline::Outline;

/// Build an [`Outline`] from the raw root sequence returned by a provider.
///
/// Equal ranges never nest. Partially overlapping ranges stay siblings.
pub fn normalize(raw: Vec<Symbol>) -> Outline {
    let depths: Vec<usize> = raw
        .iter()
        .enumerate()
        .map(|(i, symbol)| {
            raw.iter()
                .enumerate()
                .filter(|(j, other)| *j != i && other.range.strictly_contains(&symbol.range))
                .count()
        })
        .collect();

    let mut roots = Vec::with_capacity(raw.len());
    let mut hoisted = Vec::new();
    for (symbol, depth) in raw.into_iter().zip(depths) {
        if depth == 0 {
            roots.push(symbol);
        } else {
            hoisted.push((depth, symbol));
        }
    }

    // Outer symbols first so a hoisted container is in place before its contents.
    hoisted.sort_by_key(|(depth, _)| *depth);

    if !hoisted.is_empty() {
        tracing::debug!("Re-parenting {} hoisted root symbols", hoisted.len());
    }

    for (_, symbol) in hoisted {
        attach(&mut roots, symbol);
    }

    Outline::from_tree(roots)
}

/// Append `symbol` under the deepest symbol in `siblings` that strictly contains it
fn attach(siblings: &mut Vec<Symbol>, symbol: Symbol) {
    match siblings
        .iter()
        .position(|candidate| candidate.range.strictly_contains(&symbol.range))
    {
        Some(index) => attach(&mut siblings[index].children, symbol),
        None => siblings.push(symbol),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lsp::{Position, Range};
    use crate::models::symbol::SymbolKind;

    fn lines(start: u32, end: u32) -> Range {
        Range::new(Position::new(start, 0), Position::new(end, 1))
    }

    fn names(symbols: &[Symbol]) -> Vec<&str> {
        symbols.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_hoisted_root_moves_into_container() {
        let outline = normalize(vec![
            Symbol::new("Y", SymbolKind::Class, lines(0, 100)),
            Symbol::new("X", SymbolKind::Function, lines(30, 40)),
            Symbol::new("Z", SymbolKind::Function, lines(120, 130)),
        ]);

        assert_eq!(names(outline.roots()), vec!["Y", "Z"]);
        assert_eq!(names(&outline.roots()[0].children), vec!["X"]);
    }

    #[test]
    fn test_container_listed_after_contents() {
        let outline = normalize(vec![
            Symbol::new("X", SymbolKind::Function, lines(30, 40)),
            Symbol::new("Y", SymbolKind::Class, lines(0, 100)),
        ]);

        assert_eq!(names(outline.roots()), vec!["Y"]);
        assert_eq!(names(&outline.roots()[0].children), vec!["X"]);
    }

    #[test]
    fn test_attaches_to_deepest_existing_child() {
        let outline = normalize(vec![
            Symbol::new("A", SymbolKind::Class, lines(0, 100)).with_children(vec![
                Symbol::new("C", SymbolKind::Struct, lines(10, 50)),
                Symbol::new("m", SymbolKind::Method, lines(60, 70)),
            ]),
            Symbol::new("friend", SymbolKind::Function, lines(20, 22)),
        ]);

        assert_eq!(names(outline.roots()), vec!["A"]);
        let a = &outline.roots()[0];
        assert_eq!(names(&a.children), vec!["C", "m"]);
        assert_eq!(names(&a.children[0].children), vec!["friend"]);
    }

    #[test]
    fn test_hoisted_chain_nests_fully() {
        // Both B and c are hoisted; c must end up under B, not directly under A.
        let outline = normalize(vec![
            Symbol::new("c", SymbolKind::Function, lines(12, 14)),
            Symbol::new("A", SymbolKind::Namespace, lines(0, 100)),
            Symbol::new("B", SymbolKind::Class, lines(10, 20)),
        ]);

        assert_eq!(names(outline.roots()), vec!["A"]);
        let a = &outline.roots()[0];
        assert_eq!(names(&a.children), vec!["B"]);
        assert_eq!(names(&a.children[0].children), vec!["c"]);
    }

    #[test]
    fn test_equal_ranges_are_not_nested() {
        let outline = normalize(vec![
            Symbol::new("Foo", SymbolKind::Struct, lines(5, 9)),
            Symbol::new("Foo", SymbolKind::Class, lines(5, 9)),
        ]);
        assert_eq!(outline.roots().len(), 2);
        assert!(outline.roots().iter().all(|s| s.children.is_empty()));
    }

    #[test]
    fn test_partial_overlap_left_as_siblings() {
        let outline = normalize(vec![
            Symbol::new("a", SymbolKind::Function, lines(0, 10)),
            Symbol::new("b", SymbolKind::Function, lines(5, 15)),
        ]);
        assert_eq!(names(outline.roots()), vec!["a", "b"]);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize(vec![
            Symbol::new("X", SymbolKind::Function, lines(30, 40)),
            Symbol::new("Y", SymbolKind::Class, lines(0, 100)).with_children(vec![
                Symbol::new("m", SymbolKind::Method, lines(10, 20)),
            ]),
            Symbol::new("Z", SymbolKind::Function, lines(120, 130)),
            Symbol::new("q", SymbolKind::Variable, lines(125, 125)),
        ]);
        let twice = normalize(once.roots().to_vec());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_flattened_outline_renormalizes_to_same_tree() {
        let once = normalize(vec![
            Symbol::new("A", SymbolKind::Class, lines(0, 100)).with_children(vec![
                Symbol::new("m1", SymbolKind::Method, lines(10, 20)),
                Symbol::new("m2", SymbolKind::Method, lines(30, 40)).with_children(vec![
                    Symbol::new("v", SymbolKind::Variable, lines(31, 31)),
                ]),
            ]),
            Symbol::new("f2", SymbolKind::Function, lines(120, 130)),
        ]);
        let again = normalize(once.flatten());
        assert_eq!(once, again);
    }

    #[test]
    fn test_empty_input() {
        assert!(normalize(Vec::new()).is_empty());
    }
}
