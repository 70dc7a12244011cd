//! Conversion of `documentSymbol` / `foldingRange` responses

use serde_json::Value;

use crate::error::LspError;
use crate::infra::lsp::protocol::{DocumentSymbol, LspFoldingRange, SymbolInformation};
use crate::models::lsp::{FoldingRange, FoldingRangeKind, Position, Range};
use crate::models::symbol::{Symbol, SymbolKind};

/// Parse a `textDocument/documentSymbol` result
///
/// Accepts the hierarchical `DocumentSymbol[]` form and the flat
/// `SymbolInformation[]` form. Flat symbols are left for the normalizer to
/// nest. `null` yields `None`.
pub fn parse_document_symbols(result: Value) -> Result<Option<Vec<Symbol>>, LspError> {
    let items = match result {
        Value::Null => return Ok(None),
        Value::Array(items) => items,
        other => {
            return Err(LspError::Protocol(format!(
                "documentSymbol result is not an array: {}",
                other
            )));
        }
    };

    let is_flat = items.first().is_some_and(|first| first.get("location").is_some());

    let symbols = if is_flat {
        let flat: Vec<SymbolInformation> = serde_json::from_value(Value::Array(items))
            .map_err(|e| LspError::Protocol(format!("Invalid SymbolInformation: {}", e)))?;
        flat.into_iter().map(convert_symbol_information).collect()
    } else {
        let tree: Vec<DocumentSymbol> = serde_json::from_value(Value::Array(items))
            .map_err(|e| LspError::Protocol(format!("Invalid DocumentSymbol: {}", e)))?;
        tree.into_iter().map(convert_document_symbol).collect()
    };

    Ok(Some(symbols))
}

fn convert_document_symbol(symbol: DocumentSymbol) -> Symbol {
    let children = symbol
        .children
        .unwrap_or_default()
        .into_iter()
        .map(convert_document_symbol)
        .collect();

    Symbol::new(
        symbol.name,
        SymbolKind::from_lsp(symbol.kind),
        symbol.range,
    )
    .with_detail(symbol.detail.unwrap_or_default())
    .with_selection_range(symbol.selection_range)
    .with_children(children)
}

/// Flat symbols carry no name range; the first line of the range stands in
/// for it so the resolver can still descend into nested symbols.
/// `containerName` is a name, not an annotation, so `detail` stays empty.
fn convert_symbol_information(symbol: SymbolInformation) -> Symbol {
    let range = symbol.location.range;
    let header_end = Position::new(range.start.line, u32::MAX).min(range.end);
    Symbol::new(symbol.name, SymbolKind::from_lsp(symbol.kind), range)
        .with_selection_range(Range::new(range.start, header_end))
}

pub fn parse_folding_ranges(ranges: Vec<LspFoldingRange>) -> Vec<FoldingRange> {
    ranges
        .into_iter()
        .map(|r| {
            FoldingRange::new(
                r.start_line,
                r.end_line,
                FoldingRangeKind::from_lsp(r.kind.as_deref()),
            )
        })
        .collect()
}
