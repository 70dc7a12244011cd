//! Navigability filter
//!
//! Forward declarations and typedefs pollute outlines with duplicates of the
//! symbols they name. They are skipped as navigation targets, but whatever
//! they contain is promoted into their sibling list.

use crate::models::symbol::Symbol;

use super::outline::{Located, SymbolPath};

const TYPEDEF_MARKER: &str = "typedef";
const DECLARATION_MARKER: &str = "declaration";

/// Whether a symbol may be returned as a navigation target
pub fn is_navigable(symbol: &Symbol) -> bool {
    if symbol.detail.contains(TYPEDEF_MARKER) {
        return false;
    }
    !(symbol.kind.is_declarable_type() && symbol.detail.contains(DECLARATION_MARKER))
}

/// Navigable members of `symbols`, looking through excluded symbols.
///
/// `parent` is the path of the symbol owning `symbols`, or `None` for the root sequence.
pub fn navigable<'a>(symbols: &'a [Symbol], parent: Option<&SymbolPath>) -> Vec<Located<'a>> {
    let mut out = Vec::with_capacity(symbols.len());
    collect(symbols, parent, &mut out);
    out
}

fn collect<'a>(symbols: &'a [Symbol], parent: Option<&SymbolPath>, out: &mut Vec<Located<'a>>) {
    for (index, symbol) in symbols.iter().enumerate() {
        let path = match parent {
            Some(p) => p.child(index),
            None => SymbolPath::root(index),
        };
        if is_navigable(symbol) {
            out.push(Located::new(path, symbol));
        } else {
            collect(&symbol.children, Some(&path), out);
        }
    }
}
