//! Normalized document outline and addressing into it

use serde::Serialize;

use crate::models::symbol::Symbol;

/// Index path from the root sequence down to one symbol
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct SymbolPath(Vec<usize>);

impl SymbolPath {
    pub fn root(index: usize) -> Self {
        Self(vec![index])
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = Vec::with_capacity(self.0.len() + 1);
        indices.extend_from_slice(&self.0);
        indices.push(index);
        Self(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn parent(&self) -> Option<Self> {
        match self.0.len() {
            0 | 1 => None,
            n => Some(Self(self.0[..n - 1].to_vec())),
        }
    }
}

/// Read-only view of a symbol inside an [`Outline`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located<'a> {
    pub path: SymbolPath,
    pub symbol: &'a Symbol,
}

impl<'a> Located<'a> {
    pub fn new(path: SymbolPath, symbol: &'a Symbol) -> Self {
        Self { path, symbol }
    }
}

/// Root-level symbols of one document after containment repair
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Outline {
    symbols: Vec<Symbol>,
}

impl Outline {
    /// Wrap symbols that are already a proper containment tree
    pub(crate) fn from_tree(symbols: Vec<Symbol>) -> Self {
        Self { symbols }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn roots(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Total number of symbols in the tree
    pub fn len(&self) -> usize {
        self.symbols.iter().map(Symbol::subtree_len).sum()
    }

    pub fn get(&self, path: &SymbolPath) -> Option<&Symbol> {
        let (first, rest) = path.indices().split_first()?;
        let mut symbol = self.symbols.get(*first)?;
        for index in rest {
            symbol = symbol.children.get(*index)?;
        }
        Some(symbol)
    }

    pub fn locate(&self, path: &SymbolPath) -> Option<Located<'_>> {
        self.get(path).map(|symbol| Located::new(path.clone(), symbol))
    }

    /// Pre-order list of every symbol with children stripped
    pub fn flatten(&self) -> Vec<Symbol> {
        fn walk(symbols: &[Symbol], out: &mut Vec<Symbol>) {
            for symbol in symbols {
                out.push(symbol.detached());
                walk(&symbol.children, out);
            }
        }

        let mut out = Vec::with_capacity(self.len());
        walk(&self.symbols, &mut out);
        out
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

    fn sample() -> Outline {
        Outline::from_tree(vec![
            Symbol::new("A", SymbolKind::Class, lines(0, 100)).with_children(vec![
                Symbol::new("m1", SymbolKind::Method, lines(10, 20)),
                Symbol::new("m2", SymbolKind::Method, lines(30, 40)).with_children(vec![
                    Symbol::new("x", SymbolKind::Variable, lines(31, 31)),
                ]),
            ]),
            Symbol::new("f2", SymbolKind::Function, lines(120, 130)),
        ])
    }

    #[test]
    fn test_get_by_path() {
        let outline = sample();
        assert_eq!(outline.get(&SymbolPath::root(1)).unwrap().name, "f2");
        let x = SymbolPath::root(0).child(1).child(0);
        assert_eq!(outline.get(&x).unwrap().name, "x");
        assert_eq!(x.depth(), 3);
        assert_eq!(x.parent(), Some(SymbolPath::root(0).child(1)));
        assert!(outline.get(&SymbolPath::root(0).child(5)).is_none());
        assert!(outline.get(&SymbolPath::default()).is_none());
    }

    #[test]
    fn test_len_counts_descendants() {
        assert_eq!(sample().len(), 5);
        assert!(Outline::empty().is_empty());
        assert_eq!(Outline::empty().len(), 0);
    }

    #[test]
    fn test_flatten_is_preorder_without_children() {
        let names: Vec<_> = sample().flatten().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["A", "m1", "m2", "x", "f2"]);
        assert!(sample().flatten().iter().all(|s| s.children.is_empty()));
    }

    #[test]
    fn test_path_serializes_as_index_list() {
        let path = SymbolPath::root(2).child(0);
        assert_eq!(serde_json::to_string(&path).unwrap(), "[2,0]");
    }
}
