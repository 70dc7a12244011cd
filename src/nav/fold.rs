//! Definition folding
//!
//! Picks the folding ranges that cover function bodies (and optionally type
//! bodies) so an editor can collapse a file down to its signatures.

use serde::{Deserialize, Serialize};

use super::filter::navigable;
use super::outline::Outline;
use crate::models::lsp::{FoldingRange, FoldingRangeKind, Range, Selection};
use crate::models::symbol::{Symbol, SymbolKind};

/// Minimum number of lines a comment block spans before it is folded
const MIN_COMMENT_FOLD_SPAN: u32 = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldOptions {
    /// Fold classes, enums, interfaces, objects and structs
    pub fold_types: bool,
    /// Also fold definitions and comments that intersect a selection
    pub fold_current: bool,
    /// Fold String symbols (Markdown headings)
    pub fold_strings: bool,
}

impl FoldOptions {
    fn folds_kind(&self, kind: SymbolKind) -> bool {
        if kind.is_type_definition() {
            self.fold_types
        } else if kind.is_callable_body() {
            true
        } else if kind == SymbolKind::String {
            self.fold_strings
        } else {
            false
        }
    }
}

/// Start lines of the folding ranges to collapse, de-duplicated in first-seen order
pub fn plan_folds(
    outline: &Outline,
    folding_ranges: &[FoldingRange],
    selections: &[Selection],
    options: FoldOptions,
) -> Vec<u32> {
    let touches_selection =
        |range: &Range| selections.iter().any(|s| range.intersects(&s.range()));

    let mut symbols = Vec::new();
    gather(outline.roots(), &options, &touches_selection, &mut symbols);

    let mut lines = Vec::new();
    let mut push = |line: u32| {
        if !lines.contains(&line) {
            lines.push(line);
        }
    };

    // A symbol without a matching folding range (e.g. inside a disabled
    // preprocessor block) is skipped.
    for symbol in &symbols {
        for folding in folding_ranges {
            let body = Range::from_coords(folding.start_line, u32::MAX, folding.end_line, 0);
            if symbol.range.contains_range(&body) {
                push(folding.start_line);
            }
        }
    }

    for folding in folding_ranges {
        if folding.kind != FoldingRangeKind::Comment
            || folding.end_line.saturating_sub(folding.start_line) < MIN_COMMENT_FOLD_SPAN
        {
            continue;
        }
        let text = Range::from_coords(
            folding.start_line,
            0,
            folding.end_line.saturating_sub(1),
            u32::MAX,
        );
        if options.fold_current || !touches_selection(&text) {
            push(folding.start_line);
        }
    }

    tracing::debug!(
        "Folding {} of {} ranges ({} definitions)",
        lines.len(),
        folding_ranges.len(),
        symbols.len()
    );
    lines
}

fn gather<'a>(
    symbols: &'a [Symbol],
    options: &FoldOptions,
    touches_selection: &impl Fn(&Range) -> bool,
    out: &mut Vec<&'a Symbol>,
) {
    for located in navigable(symbols, None) {
        let symbol = located.symbol;
        let fold = options.folds_kind(symbol.kind)
            && !symbol.range.is_single_line()
            && (options.fold_current || !touches_selection(&symbol.range));
        if fold {
            out.push(symbol);
        }
        gather(&symbol.children, options, touches_selection, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lsp::Position;
    use crate::nav::normalize::normalize;

    fn lines(start: u32, end: u32) -> Range {
        Range::new(Position::new(start, 0), Position::new(end, 1))
    }

    fn sample() -> Outline {
        normalize(vec![
            Symbol::new("Widget", SymbolKind::Class, lines(0, 30)).with_children(vec![
                Symbol::new("draw", SymbolKind::Method, lines(2, 8)),
                Symbol::new("size", SymbolKind::Field, lines(10, 10)),
                Symbol::new("resize", SymbolKind::Method, lines(12, 20)),
            ]),
            Symbol::new("helper", SymbolKind::Function, lines(40, 50)),
            Symbol::new("one_liner", SymbolKind::Function, lines(55, 55)),
        ])
    }

    fn ranges() -> Vec<FoldingRange> {
        vec![
            FoldingRange::new(0, 29, FoldingRangeKind::Region),
            FoldingRange::new(2, 7, FoldingRangeKind::Other),
            FoldingRange::new(12, 19, FoldingRangeKind::Other),
            FoldingRange::new(33, 37, FoldingRangeKind::Comment),
            FoldingRange::new(40, 49, FoldingRangeKind::Other),
            FoldingRange::new(52, 53, FoldingRangeKind::Comment),
        ]
    }

    #[test]
    fn test_folds_functions_and_long_comments() {
        let options = FoldOptions {
            fold_current: true,
            ..Default::default()
        };
        let folded = plan_folds(&sample(), &ranges(), &[], options);
        assert_eq!(folded, vec![2, 12, 40, 33]);
    }

    #[test]
    fn test_fold_types_includes_class_body() {
        let options = FoldOptions {
            fold_types: true,
            fold_current: true,
            ..Default::default()
        };
        let folded = plan_folds(&sample(), &ranges(), &[], options);
        // The class range also contains the method bodies; each line appears once.
        assert_eq!(folded, vec![0, 2, 12, 40, 33]);
    }

    #[test]
    fn test_selected_definition_stays_open() {
        let options = FoldOptions::default();
        let cursor = Selection::caret(Position::new(14, 3));
        let folded = plan_folds(&sample(), &ranges(), &[cursor], options);
        assert_eq!(folded, vec![2, 40, 33]);
    }

    #[test]
    fn test_selected_comment_stays_open() {
        let options = FoldOptions::default();
        let cursor = Selection::caret(Position::new(34, 0));
        let folded = plan_folds(&sample(), &ranges(), &[cursor], options);
        assert!(!folded.contains(&33));
    }

    #[test]
    fn test_symbol_without_folding_range_is_skipped() {
        let options = FoldOptions {
            fold_current: true,
            ..Default::default()
        };
        let only_comments = vec![FoldingRange::new(33, 37, FoldingRangeKind::Comment)];
        assert_eq!(plan_folds(&sample(), &only_comments, &[], options), vec![33]);
    }

    #[test]
    fn test_markdown_headings_fold_only_with_strings() {
        let outline = normalize(vec![
            Symbol::new("# Intro", SymbolKind::String, lines(0, 9)),
            Symbol::new("# Usage", SymbolKind::String, lines(10, 20)),
        ]);
        let folding = vec![
            FoldingRange::new(0, 9, FoldingRangeKind::Region),
            FoldingRange::new(10, 20, FoldingRangeKind::Region),
        ];

        let plain = FoldOptions {
            fold_current: true,
            ..Default::default()
        };
        assert!(plan_folds(&outline, &folding, &[], plain).is_empty());

        let strings = FoldOptions {
            fold_strings: true,
            fold_current: true,
            ..Default::default()
        };
        assert_eq!(plan_folds(&outline, &folding, &[], strings), vec![0, 10]);
    }

    #[test]
    fn test_empty_outline_still_folds_comments() {
        let options = FoldOptions {
            fold_current: true,
            ..Default::default()
        };
        assert_eq!(plan_folds(&Outline::empty(), &ranges(), &[], options), vec![33]);
    }
}
