//! LSP Common Types
//!
//! Single source of truth for positions, ranges, selections and folding ranges.
//! Import this module when LSP geometry is needed.

use std::path::Path;

use serde::{Deserialize, Serialize};

// ============================================================================
// Core LSP Types
// ============================================================================

/// Position within a document (0-indexed, LSP standard)
///
/// Ordered by line, then character.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }

    /// Convert 1-indexed CLI input to 0-indexed LSP position
    pub fn from_cli(line: u32, column: u32) -> Self {
        Self {
            line: line.saturating_sub(1),
            character: column.saturating_sub(1),
        }
    }

    /// Convert 0-indexed LSP position to 1-indexed display position
    pub fn to_display(&self) -> (u32, u32) {
        (self.line + 1, self.character + 1)
    }
}

/// Range within a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Build a range from raw coordinates, swapping the ends if they are reversed
    pub fn from_coords(start_line: u32, start_char: u32, end_line: u32, end_char: u32) -> Self {
        let a = Position::new(start_line, start_char);
        let b = Position::new(end_line, end_char);
        if a <= b { Self::new(a, b) } else { Self::new(b, a) }
    }

    /// Convert a single position to a range
    pub fn point(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    pub fn is_single_line(&self) -> bool {
        self.start.line == self.end.line
    }

    /// Inclusive on both ends
    pub fn contains(&self, pos: Position) -> bool {
        self.start <= pos && pos <= self.end
    }

    /// Inclusive containment: equal ranges contain each other
    pub fn contains_range(&self, other: &Range) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Containment with equal ranges excluded
    pub fn strictly_contains(&self, other: &Range) -> bool {
        self != other && self.contains_range(other)
    }

    /// True when the ranges overlap or touch
    pub fn intersects(&self, other: &Range) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// A cursor selection. `anchor` stays put, `active` is where the caret is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Selection {
    pub anchor: Position,
    pub active: Position,
}

impl Selection {
    pub fn new(anchor: Position, active: Position) -> Self {
        Self { anchor, active }
    }

    pub fn caret(pos: Position) -> Self {
        Self::new(pos, pos)
    }

    pub fn start(&self) -> Position {
        self.anchor.min(self.active)
    }

    pub fn end(&self) -> Position {
        self.anchor.max(self.active)
    }

    pub fn range(&self) -> Range {
        Range::new(self.start(), self.end())
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.active
    }
}

// ============================================================================
// Folding Range Types
// ============================================================================

/// Folding range for code folding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoldingRange {
    /// Start line (0-indexed)
    pub start_line: u32,
    /// End line (0-indexed)
    pub end_line: u32,
    /// Folding range kind
    pub kind: FoldingRangeKind,
}

impl FoldingRange {
    pub fn new(start_line: u32, end_line: u32, kind: FoldingRangeKind) -> Self {
        Self {
            start_line,
            end_line,
            kind,
        }
    }
}

/// Folding range kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FoldingRangeKind {
    /// A comment block
    Comment,
    /// An import section
    Imports,
    /// A region (e.g., #region in C#)
    Region,
    /// Other (default)
    #[default]
    #[serde(other)]
    Other,
}

impl FoldingRangeKind {
    pub fn from_lsp(kind: Option<&str>) -> Self {
        match kind {
            Some("comment") => Self::Comment,
            Some("imports") => Self::Imports,
            Some("region") => Self::Region,
            _ => Self::Other,
        }
    }
}

// ============================================================================
// URI Utilities
// ============================================================================

/// Convert file path to RFC 3986 compliant file:// URI
pub fn path_to_uri(path: &Path) -> String {
    let abs_path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().unwrap_or_default().join(path)
    };

    let path_str = abs_path.to_string_lossy();
    let encoded: String = path_str
        .chars()
        .map(|c| match c {
            '/' | '.' | '-' | '_' | '~' => c.to_string(),
            c if c.is_ascii_alphanumeric() => c.to_string(),
            c => {
                let mut buf = [0u8; 4];
                c.encode_utf8(&mut buf)
                    .bytes()
                    .map(|b| format!("%{:02X}", b))
                    .collect()
            }
        })
        .collect();

    format!("file://{encoded}")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn range(sl: u32, sc: u32, el: u32, ec: u32) -> Range {
        Range::new(Position::new(sl, sc), Position::new(el, ec))
    }

    #[test]
    fn test_position_from_cli() {
        let pos = Position::from_cli(10, 5);
        assert_eq!(pos.line, 9);
        assert_eq!(pos.character, 4);
        assert_eq!(pos.to_display(), (10, 5));
    }

    #[test]
    fn test_position_ordering_is_line_major() {
        assert!(Position::new(1, 50) < Position::new(2, 0));
        assert!(Position::new(2, 3) < Position::new(2, 4));
        assert_eq!(
            Position::new(4, 1).max(Position::new(3, 9)),
            Position::new(4, 1)
        );
    }

    #[test]
    fn test_range_contains_is_inclusive() {
        let r = range(10, 0, 20, 1);
        assert!(r.contains(Position::new(10, 0)));
        assert!(r.contains(Position::new(20, 1)));
        assert!(r.contains(Position::new(15, 99)));
        assert!(!r.contains(Position::new(20, 2)));
        assert!(!r.contains(Position::new(9, 100)));
    }

    #[test]
    fn test_strict_containment_excludes_equal() {
        let outer = range(0, 0, 100, 0);
        let inner = range(30, 0, 40, 0);
        assert!(outer.strictly_contains(&inner));
        assert!(!inner.strictly_contains(&outer));
        assert!(outer.contains_range(&outer));
        assert!(!outer.strictly_contains(&outer));
    }

    #[test]
    fn test_partial_overlap_is_not_containment() {
        let a = range(0, 0, 10, 0);
        let b = range(5, 0, 15, 0);
        assert!(!a.contains_range(&b));
        assert!(!b.contains_range(&a));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&range(11, 0, 12, 0)));
        assert!(a.intersects(&range(10, 0, 12, 0)));
    }

    #[test]
    fn test_from_coords_swaps_reversed_ends() {
        let r = Range::from_coords(5, u32::MAX, 5, 0);
        assert_eq!(r.start, Position::new(5, 0));
        assert_eq!(r.end, Position::new(5, u32::MAX));
    }

    #[test]
    fn test_selection_start_is_lesser_end() {
        let sel = Selection::new(Position::new(8, 0), Position::new(3, 2));
        assert_eq!(sel.start(), Position::new(3, 2));
        assert_eq!(sel.end(), Position::new(8, 0));
        assert!(!sel.is_empty());
        assert!(Selection::caret(Position::new(1, 1)).is_empty());
    }

    #[test]
    fn test_folding_kind_from_lsp() {
        assert_eq!(
            FoldingRangeKind::from_lsp(Some("comment")),
            FoldingRangeKind::Comment
        );
        assert_eq!(FoldingRangeKind::from_lsp(None), FoldingRangeKind::Other);
    }

    #[test]
    fn test_uri_simple() {
        let path = Path::new("/tmp/project/src/main.rs");
        let uri = path_to_uri(path);
        assert_eq!(uri, "file:///tmp/project/src/main.rs");
    }

    #[test]
    fn test_uri_with_spaces() {
        let uri = path_to_uri(Path::new("/tmp/my project/a b.cpp"));
        assert_eq!(uri, "file:///tmp/my%20project/a%20b.cpp");
    }
}
